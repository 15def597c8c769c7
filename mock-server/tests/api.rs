use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, DEFAULT_API_KEY, DEFAULT_APP_KEY};
use tower::ServiceExt;

fn form_request(path: &str, fields: &[(&str, &str)]) -> Request<String> {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");
    Request::builder()
        .method("POST")
        .uri(path)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body)
        .unwrap()
}

fn authed(path: &str, extra: &[(&str, &str)]) -> Request<String> {
    let mut fields = vec![("api_key", DEFAULT_API_KEY), ("user_app_key", DEFAULT_APP_KEY)];
    fields.extend_from_slice(extra);
    form_request(path, &fields)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn status_of(xml: &str) -> String {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.root_element().attribute("status").unwrap().to_string()
}

fn fail_message(xml: &str) -> String {
    let doc = roxmltree::Document::parse(xml).unwrap();
    doc.descendants()
        .find(|n| n.has_tag_name("message"))
        .and_then(|n| n.text())
        .unwrap()
        .to_string()
}

// --- validate ---

#[tokio::test]
async fn validate_accepts_configured_keys() {
    let resp = app().oneshot(authed("/v1/user.validate", &[])).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[http::header::CONTENT_TYPE],
        "text/xml; charset=utf-8"
    );
    assert_eq!(status_of(&body_text(resp).await), "OK");
}

#[tokio::test]
async fn validate_rejects_wrong_api_key() {
    let resp = app()
        .oneshot(form_request(
            "/v1/user.validate",
            &[("api_key", "nope"), ("user_app_key", DEFAULT_APP_KEY)],
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let xml = body_text(resp).await;
    assert_eq!(status_of(&xml), "FAIL");
    assert_eq!(fail_message(&xml), "Invalid API key.");
}

#[tokio::test]
async fn validate_rejects_missing_app_key() {
    let resp = app()
        .oneshot(form_request("/v1/user.validate", &[("api_key", DEFAULT_API_KEY)]))
        .await
        .unwrap();

    let xml = body_text(resp).await;
    assert_eq!(fail_message(&xml), "Invalid user application key.");
}

// --- listings ---

#[tokio::test]
async fn services_lists_demo_services_in_order() {
    let resp = app().oneshot(authed("/v1/user.services", &[])).await.unwrap();
    let xml = body_text(resp).await;
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let ids: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("service"))
        .map(|n| n.attribute("id").unwrap())
        .collect();
    assert_eq!(ids, ["twitter", "facebook", "blogger"]);

    let methods = doc
        .descendants()
        .find(|n| n.has_tag_name("methods"))
        .and_then(|n| n.text())
        .unwrap();
    assert_eq!(methods, "microblog,status");
}

#[tokio::test]
async fn triggers_nest_their_services() {
    let resp = app().oneshot(authed("/v1/user.triggers", &[])).await.unwrap();
    let xml = body_text(resp).await;
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let everywhere = doc
        .descendants()
        .find(|n| n.has_tag_name("trigger") && n.attribute("id") == Some("everywhere"))
        .unwrap();
    let names: Vec<_> = everywhere
        .descendants()
        .filter(|n| n.has_tag_name("service"))
        .map(|n| n.attribute("name").unwrap())
        .collect();
    assert_eq!(names, ["Twitter", "Facebook"]);
}

#[tokio::test]
async fn latest_rejects_bad_limit_and_order() {
    let resp = app()
        .oneshot(authed("/v1/user.latest", &[("limit", "zero"), ("order", "DESC")]))
        .await
        .unwrap();
    assert_eq!(fail_message(&body_text(resp).await), "Limit must be a positive integer.");

    let resp = app()
        .oneshot(authed("/v1/user.latest", &[("limit", "5"), ("order", "UP")]))
        .await
        .unwrap();
    assert_eq!(fail_message(&body_text(resp).await), "Order must be ASC or DESC.");
}

// --- posting ---

#[tokio::test]
async fn post_requires_body() {
    let resp = app().oneshot(authed("/v1/user.post", &[])).await.unwrap();
    assert_eq!(fail_message(&body_text(resp).await), "Message body is required.");
}

#[tokio::test]
async fn blog_post_requires_title() {
    let resp = app()
        .oneshot(authed("/v1/user.post", &[("body", "text"), ("post_method", "blog")]))
        .await
        .unwrap();
    assert_eq!(
        fail_message(&body_text(resp).await),
        "Title is required for blog posts."
    );
}

#[tokio::test]
async fn post_to_unknown_service_fails() {
    let resp = app()
        .oneshot(authed("/v1/user.post", &[("body", "hi"), ("service", "myspace")]))
        .await
        .unwrap();
    assert_eq!(fail_message(&body_text(resp).await), "Service not found.");
}

#[tokio::test]
async fn tpost_to_unknown_trigger_fails() {
    let resp = app()
        .oneshot(authed("/v1/user.tpost", &[("body", "hi"), ("trigger", "nope")]))
        .await
        .unwrap();
    assert_eq!(fail_message(&body_text(resp).await), "Trigger not found.");
}

// --- post then list ---

#[tokio::test]
async fn posted_messages_show_up_in_latest() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "/v1/user.post",
            &[("body", "first"), ("post_method", "status"), ("debug", "0")],
        ))
        .await
        .unwrap();
    assert_eq!(status_of(&body_text(resp).await), "OK");

    // debug posts are validated but not stored
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("/v1/user.post", &[("body", "dry run"), ("debug", "1")]))
        .await
        .unwrap();
    assert_eq!(status_of(&body_text(resp).await), "OK");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed(
            "/v1/user.tpost",
            &[("body", "second"), ("trigger", "tw"), ("title", "T")],
        ))
        .await
        .unwrap();
    assert_eq!(status_of(&body_text(resp).await), "OK");

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("/v1/user.latest", &[("limit", "25"), ("order", "DESC")]))
        .await
        .unwrap();
    let xml = body_text(resp).await;
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let messages: Vec<_> = doc
        .descendants()
        .filter(|n| n.has_tag_name("message"))
        .collect();
    assert_eq!(messages.len(), 2);

    // newest first; the trigger post uses the trigger's method as wrapper
    assert_eq!(messages[0].attribute("method"), Some("microblog"));
    let wrapper = messages[0]
        .children()
        .find(|n| n.has_tag_name("microblog"))
        .unwrap();
    let title = wrapper.children().find(|n| n.has_tag_name("title")).unwrap();
    assert_eq!(title.text(), Some("T"));

    assert_eq!(messages[1].attribute("method"), Some("status"));
    let date = messages[1]
        .children()
        .find(|n| n.has_tag_name("date"))
        .unwrap();
    assert!(date.attribute("rfc").is_some());
    assert!(date.attribute("unix").unwrap().parse::<i64>().is_ok());
    let services: Vec<_> = messages[1]
        .descendants()
        .filter(|n| n.has_tag_name("service"))
        .map(|n| n.attribute("id").unwrap())
        .collect();
    assert_eq!(services, ["twitter", "facebook"]);
}
