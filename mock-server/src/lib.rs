//! In-memory stand-in for the Ping.fm API.
//!
//! Serves the six `user.*` form-POST endpoints under `/v1/` with the same
//! `<rsp>` XML envelope as the real service. One account is configured at
//! start-up; posted messages are kept in memory until the process exits.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Form, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const DEFAULT_API_KEY: &str = "test-api-key";
pub const DEFAULT_APP_KEY: &str = "test-app-key";

#[derive(Clone, Debug)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Post methods the service accepts.
    pub methods: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Trigger {
    pub id: String,
    pub method: String,
    /// Ids of the services the trigger posts to.
    pub services: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct StoredMessage {
    pub id: Uuid,
    pub method: String,
    pub posted_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    pub services: Vec<(String, String)>,
}

#[derive(Clone, Debug)]
pub struct Account {
    pub api_key: String,
    pub app_key: String,
    pub services: Vec<Service>,
    pub triggers: Vec<Trigger>,
    pub messages: Vec<StoredMessage>,
}

impl Account {
    /// An account with three services and two triggers, and no messages.
    pub fn demo(api_key: &str, app_key: &str) -> Self {
        let service = |id: &str, name: &str, methods: &[&str]| Service {
            id: id.to_string(),
            name: name.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
        };
        let trigger = |id: &str, method: &str, services: &[&str]| Trigger {
            id: id.to_string(),
            method: method.to_string(),
            services: services.iter().map(|s| s.to_string()).collect(),
        };
        Self {
            api_key: api_key.to_string(),
            app_key: app_key.to_string(),
            services: vec![
                service("twitter", "Twitter", &["microblog", "status"]),
                service("facebook", "Facebook", &["status"]),
                service("blogger", "Blogger", &["blog"]),
            ],
            triggers: vec![
                trigger("tw", "microblog", &["twitter"]),
                trigger("everywhere", "status", &["twitter", "facebook"]),
            ],
            messages: Vec::new(),
        }
    }

    fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }
}

pub type Db = Arc<RwLock<Account>>;

/// Form fields of every endpoint; each handler reads the ones it needs.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Params {
    pub api_key: String,
    pub user_app_key: String,
    pub limit: Option<String>,
    pub order: Option<String>,
    pub body: String,
    pub title: String,
    pub post_method: Option<String>,
    pub service: String,
    pub trigger: String,
    pub debug: String,
}

pub fn app() -> Router {
    app_with(Account::demo(DEFAULT_API_KEY, DEFAULT_APP_KEY))
}

pub fn app_with(account: Account) -> Router {
    let db: Db = Arc::new(RwLock::new(account));
    Router::new()
        .route("/v1/user.validate", post(validate))
        .route("/v1/user.services", post(services))
        .route("/v1/user.triggers", post(triggers))
        .route("/v1/user.latest", post(latest))
        .route("/v1/user.post", post(post_message))
        .route("/v1/user.tpost", post(tpost))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, account: Account) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(account)).await
}

/// A `<rsp>` document served as `text/xml`.
pub struct Rsp(String);

impl Rsp {
    fn ok(payload: impl AsRef<str>) -> Self {
        Rsp(format!(
            "<?xml version=\"1.0\"?>\n<rsp status=\"OK\">{}</rsp>",
            payload.as_ref()
        ))
    }

    fn fail(message: &str) -> Self {
        Rsp(format!(
            "<?xml version=\"1.0\"?>\n<rsp status=\"FAIL\"><message>{}</message></rsp>",
            escape(message)
        ))
    }
}

impl IntoResponse for Rsp {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, "text/xml; charset=utf-8")], self.0).into_response()
    }
}

fn authorize(account: &Account, params: &Params) -> Result<(), Rsp> {
    if params.api_key != account.api_key {
        return Err(Rsp::fail("Invalid API key."));
    }
    if params.user_app_key != account.app_key {
        return Err(Rsp::fail("Invalid user application key."));
    }
    Ok(())
}

async fn validate(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let account = db.read().await;
    match authorize(&account, &params) {
        Ok(()) => Rsp::ok(""),
        Err(rsp) => rsp,
    }
}

async fn services(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let account = db.read().await;
    if let Err(rsp) = authorize(&account, &params) {
        return rsp;
    }
    let services: String = account
        .services
        .iter()
        .map(|s| {
            format!(
                "<service id=\"{}\" name=\"{}\"><methods>{}</methods></service>",
                escape(&s.id),
                escape(&s.name),
                escape(&s.methods.join(","))
            )
        })
        .collect();
    Rsp::ok(format!("<services>{services}</services>"))
}

async fn triggers(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let account = db.read().await;
    if let Err(rsp) = authorize(&account, &params) {
        return rsp;
    }
    let triggers: String = account
        .triggers
        .iter()
        .map(|t| {
            let refs: Vec<_> = t
                .services
                .iter()
                .filter_map(|id| account.service(id))
                .map(|s| (s.id.clone(), s.name.clone()))
                .collect();
            format!(
                "<trigger id=\"{}\" method=\"{}\">{}</trigger>",
                escape(&t.id),
                escape(&t.method),
                service_refs(&refs)
            )
        })
        .collect();
    Rsp::ok(format!("<triggers>{triggers}</triggers>"))
}

async fn latest(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let account = db.read().await;
    if let Err(rsp) = authorize(&account, &params) {
        return rsp;
    }
    let limit = match params.limit.as_deref().map(str::parse::<usize>) {
        None => 25,
        Some(Ok(limit)) if limit > 0 => limit,
        Some(_) => return Rsp::fail("Limit must be a positive integer."),
    };
    let descending = match params.order.as_deref() {
        None | Some("DESC") => true,
        Some("ASC") => false,
        Some(_) => return Rsp::fail("Order must be ASC or DESC."),
    };

    let ordered: Box<dyn Iterator<Item = &StoredMessage>> = if descending {
        Box::new(account.messages.iter().rev())
    } else {
        Box::new(account.messages.iter())
    };
    let messages: String = ordered.take(limit).map(message_xml).collect();
    Rsp::ok(format!("<messages>{messages}</messages>"))
}

async fn post_message(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let mut account = db.write().await;
    if let Err(rsp) = authorize(&account, &params) {
        return rsp;
    }
    if params.body.is_empty() {
        return Rsp::fail("Message body is required.");
    }
    let method = params.post_method.as_deref().unwrap_or("default");
    if !matches!(method, "default" | "blog" | "microblog" | "status") {
        return Rsp::fail("Invalid post method.");
    }
    if method == "blog" && params.title.is_empty() {
        return Rsp::fail("Title is required for blog posts.");
    }

    let accepts = |s: &Service| method == "default" || s.methods.iter().any(|m| m == method);
    let targets: Vec<(String, String)> = if params.service.is_empty() {
        account
            .services
            .iter()
            .filter(|&s| accepts(s))
            .map(|s| (s.id.clone(), s.name.clone()))
            .collect()
    } else {
        match account.service(&params.service) {
            None => return Rsp::fail("Service not found."),
            Some(s) if !accepts(s) => {
                return Rsp::fail("Service does not support this post method.")
            }
            Some(s) => vec![(s.id.clone(), s.name.clone())],
        }
    };
    if targets.is_empty() {
        return Rsp::fail("No services accept this post method.");
    }

    if params.debug != "1" {
        store(&mut account, method, &params, targets);
    }
    Rsp::ok("")
}

async fn tpost(State(db): State<Db>, Form(params): Form<Params>) -> Rsp {
    let mut account = db.write().await;
    if let Err(rsp) = authorize(&account, &params) {
        return rsp;
    }
    if params.body.is_empty() {
        return Rsp::fail("Message body is required.");
    }
    let Some(trigger) = account.triggers.iter().find(|t| t.id == params.trigger).cloned() else {
        return Rsp::fail("Trigger not found.");
    };
    if trigger.method == "blog" && params.title.is_empty() {
        return Rsp::fail("Title is required for blog posts.");
    }

    let targets: Vec<(String, String)> = trigger
        .services
        .iter()
        .filter_map(|id| account.service(id))
        .map(|s| (s.id.clone(), s.name.clone()))
        .collect();
    if params.debug != "1" {
        store(&mut account, &trigger.method, &params, targets);
    }
    Rsp::ok("")
}

fn store(account: &mut Account, method: &str, params: &Params, services: Vec<(String, String)>) {
    let message = StoredMessage {
        id: Uuid::new_v4(),
        method: method.to_string(),
        posted_at: Utc::now(),
        title: params.title.clone(),
        body: params.body.clone(),
        services,
    };
    info!(id = %message.id, method, services = message.services.len(), "stored message");
    account.messages.push(message);
}

fn message_xml(message: &StoredMessage) -> String {
    let title = if message.title.is_empty() {
        String::new()
    } else {
        format!("<title>{}</title>", escape(&message.title))
    };
    // The content wrapper is named after the post method.
    format!(
        "<message id=\"{id}\" method=\"{method}\"><date rfc=\"{rfc}\" unix=\"{unix}\"/>{services}<{method}>{title}<body>{body}</body></{method}></message>",
        id = message.id,
        method = escape(&message.method),
        rfc = message.posted_at.to_rfc2822(),
        unix = message.posted_at.timestamp(),
        services = service_refs(&message.services),
        body = escape(&message.body),
    )
}

fn service_refs(services: &[(String, String)]) -> String {
    let refs: String = services
        .iter()
        .map(|(id, name)| format!("<service id=\"{}\" name=\"{}\"/>", escape(id), escape(name)))
        .collect();
    format!("<services>{refs}</services>")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&apos;");
    }

    #[test]
    fn fail_envelope_escapes_message() {
        let Rsp(body) = Rsp::fail("a < b");
        assert!(body.ends_with("<rsp status=\"FAIL\"><message>a &lt; b</message></rsp>"));
    }

    #[test]
    fn message_without_title_has_no_title_element() {
        let message = StoredMessage {
            id: Uuid::nil(),
            method: "status".to_string(),
            posted_at: DateTime::from_timestamp(1_208_285_778, 0).unwrap(),
            title: String::new(),
            body: "busy".to_string(),
            services: vec![("twitter".to_string(), "Twitter".to_string())],
        };
        let xml = message_xml(&message);
        assert!(!xml.contains("<title>"));
        assert!(xml.contains("unix=\"1208285778\""));
        assert!(xml.contains("<status><body>busy</body></status>"));
        assert!(xml.contains("<service id=\"twitter\" name=\"Twitter\"/>"));
    }

    #[test]
    fn demo_account_triggers_reference_known_services() {
        let account = Account::demo("k", "a");
        for trigger in &account.triggers {
            for id in &trigger.services {
                assert!(account.service(id).is_some(), "unknown service {id}");
            }
        }
    }
}
