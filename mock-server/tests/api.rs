use std::collections::BTreeMap;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use mock_server::{app, User};
use tower::ServiceExt;

/// Status, headers and collected body of one call.
struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Reply {
    fn json<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body).unwrap()
    }
}

async fn send(router: Router, request: Request<Body>) -> Reply {
    let (parts, body) = router.oneshot(request).await.unwrap().into_parts();
    Reply {
        status: parts.status,
        headers: parts.headers,
        body: body.collect().await.unwrap().to_bytes(),
    }
}

fn request(method: Method, uri: &str) -> axum::http::request::Builder {
    Request::builder().method(method).uri(uri)
}

fn empty(builder: axum::http::request::Builder) -> Request<Body> {
    builder.body(Body::empty()).unwrap()
}

fn json(builder: axum::http::request::Builder, body: &'static str) -> Request<Body> {
    builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn hello_defaults_to_world() {
    let reply = send(app(), empty(request(Method::GET, "/hello"))).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "hello, world!");
}

#[tokio::test]
async fn hello_greets_username_header() {
    let reply = send(
        app(),
        empty(request(Method::GET, "/hello").header("X-UserName", "bob")),
    )
    .await;

    assert_eq!(reply.body, "hello, bob!");
}

#[tokio::test]
async fn echo_returns_body_and_content_type() {
    let reply = send(app(), json(request(Method::POST, "/echo"), r#"{"a":1}"#)).await;

    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/json");
    assert_eq!(reply.body, r#"{"a":1}"#);
}

#[tokio::test]
async fn echo_defaults_to_octet_stream() {
    let reply = send(
        app(),
        request(Method::POST, "/echo").body(Body::from("raw")).unwrap(),
    )
    .await;

    assert_eq!(reply.headers[header::CONTENT_TYPE], "application/octet-stream");
    assert_eq!(reply.body, "raw");
}

#[tokio::test]
async fn query_groups_repeated_keys() {
    let reply = send(
        app(),
        empty(request(Method::GET, "/query?status=open&status=closed&q=a+b")),
    )
    .await;

    let query: BTreeMap<String, Vec<String>> = reply.json();
    assert_eq!(query["status"], ["open", "closed"]);
    assert_eq!(query["q"], ["a b"]);
}

#[tokio::test]
async fn query_without_string_is_empty() {
    let reply = send(app(), empty(request(Method::GET, "/query"))).await;
    assert!(reply.json::<BTreeMap<String, Vec<String>>>().is_empty());
}

#[tokio::test]
async fn headers_are_reported_lowercase() {
    let reply = send(
        app(),
        empty(request(Method::GET, "/headers").header("X-Trace", "abc")),
    )
    .await;

    let headers: BTreeMap<String, Vec<String>> = reply.json();
    assert_eq!(headers["x-trace"], ["abc"]);
}

#[tokio::test]
async fn create_user_returns_201() {
    let reply = send(
        app(),
        json(request(Method::POST, "/users"), r#"{"name":"alice"}"#),
    )
    .await;

    assert_eq!(reply.status, StatusCode::CREATED);
    let user: User = reply.json();
    assert_eq!(user.name, "alice");
    assert!(user.email.is_none());
}

#[tokio::test]
async fn create_user_without_name_is_rejected() {
    let reply = send(
        app(),
        json(request(Method::POST, "/users"), r#"{"email":"x@y.z"}"#),
    )
    .await;

    assert_eq!(reply.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn unknown_user_is_404() {
    let reply = send(
        app(),
        empty(request(Method::GET, "/users/00000000-0000-0000-0000-000000000000")),
    )
    .await;

    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_user_id_is_400() {
    let reply = send(app(), empty(request(Method::GET, "/users/not-a-uuid"))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn created_user_can_be_fetched() {
    // One router, cloned per call, so both requests share the store.
    let router = app();

    let created: User = send(
        router.clone(),
        json(
            request(Method::POST, "/users"),
            r#"{"name":"bob","email":"bob@example.com"}"#,
        ),
    )
    .await
    .json();

    let reply = send(
        router,
        empty(request(Method::GET, &format!("/users/{}", created.id))),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json::<User>(), created);
}
