//! Demo application used to exercise the test client end to end.
//!
//! # Routes
//! - `GET /hello` greets the `X-UserName` header, or `world`.
//! - `POST /echo` returns the request body and content type unchanged.
//! - `GET /query` returns the decoded query string as `{key: [values]}`.
//! - `GET /headers` returns the request headers as `{name: [values]}`.
//! - `POST /users`, `GET /users/{id}`: in-memory user store, used to
//!   exercise JSON request bodies and decode targets.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

type Users = Arc<RwLock<HashMap<Uuid, User>>>;

pub fn app() -> Router {
    let users: Users = Arc::default();
    Router::new()
        .route("/hello", get(hello))
        .route("/echo", post(echo))
        .route("/query", get(query))
        .route("/headers", get(headers))
        .route("/users", post(create_user))
        .route("/users/{id}", get(find_user))
        .with_state(users)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn hello(headers: HeaderMap) -> String {
    let name = headers
        .get("x-username")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("world");
    format!("hello, {name}!")
}

async fn echo(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body)
}

async fn query(Query(pairs): Query<Vec<(String, String)>>) -> Json<BTreeMap<String, Vec<String>>> {
    Json(group(pairs))
}

async fn headers(headers: HeaderMap) -> Json<BTreeMap<String, Vec<String>>> {
    let pairs = headers.iter().map(|(name, value)| {
        (
            name.as_str().to_string(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )
    });
    Json(group(pairs))
}

fn group(pairs: impl IntoIterator<Item = (String, String)>) -> BTreeMap<String, Vec<String>> {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
}

async fn create_user(
    State(users): State<Users>,
    Json(input): Json<CreateUser>,
) -> impl IntoResponse {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
    };
    tracing::info!(id = %user.id, name = %user.name, "created user");
    users.write().await.insert(user.id, user.clone());
    (StatusCode::CREATED, Json(user))
}

async fn find_user(State(users): State<Users>, Path(id): Path<Uuid>) -> Response {
    match users.read().await.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
