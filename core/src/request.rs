//! Per-call request parameters and their merge with the account credentials.

use crate::config::Credentials;
use crate::http::FormParams;
use crate::types::{LatestQuery, NewPost, Operation, TriggerPost};

pub const API_KEY_PARAM: &str = "api_key";
pub const APP_KEY_PARAM: &str = "user_app_key";

/// One operation plus the parameters specific to this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRequest {
    pub operation: Operation,
    pub parameters: FormParams,
}

impl OperationRequest {
    fn new<const N: usize>(operation: Operation, parameters: [(&str, String); N]) -> Self {
        Self {
            operation,
            parameters: parameters
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }

    pub fn validate() -> Self {
        Self::new(Operation::Validate, [])
    }

    pub fn services() -> Self {
        Self::new(Operation::Services, [])
    }

    pub fn triggers() -> Self {
        Self::new(Operation::Triggers, [])
    }

    pub fn latest(query: &LatestQuery) -> Self {
        Self::new(
            Operation::Latest,
            [
                ("limit", query.limit.to_string()),
                ("order", query.order.as_str().to_string()),
            ],
        )
    }

    pub fn post(post: &NewPost) -> Self {
        Self::new(
            Operation::Post,
            [
                ("body", post.body.clone()),
                ("title", post.title.clone()),
                ("post_method", post.method.as_str().to_string()),
                ("service", post.service.clone()),
                ("debug", debug_flag(post.debug)),
            ],
        )
    }

    pub fn tpost(post: &TriggerPost) -> Self {
        Self::new(
            Operation::TPost,
            [
                ("body", post.body.clone()),
                ("title", post.title.clone()),
                ("trigger", post.trigger.clone()),
                ("debug", debug_flag(post.debug)),
            ],
        )
    }

    /// Final form fields: call parameters plus `api_key` and `user_app_key`.
    /// A call parameter keeps its value if it shares a key with a credential.
    pub fn into_form(self, credentials: &Credentials) -> FormParams {
        let mut form = self.parameters;
        form.entry(API_KEY_PARAM.to_string())
            .or_insert_with(|| credentials.api_key().to_string());
        form.entry(APP_KEY_PARAM.to_string())
            .or_insert_with(|| credentials.app_key().to_string());
        form
    }
}

fn debug_flag(debug: bool) -> String {
    if debug { "1" } else { "0" }.to_string()
}
