#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use buildtrack_api::auth::jwt::{generate_access_token, JwtConfig};
use buildtrack_api::auth::password::hash_password;
use buildtrack_api::config::ServerConfig;
use buildtrack_api::router::build_app_router;
use buildtrack_api::state::AppState;
use buildtrack_api::storage::FileStore;
use buildtrack_db::models::user::{CreateUser, User};
use buildtrack_db::repositories::{RoleRepo, UserRepo};

/// Password given to every seeded user.
pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// JWT settings shared by the app under test and the token helpers.
pub fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret-at-least-32-bytes".to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults and the given storage root.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        storage_root,
        max_body_bytes: 25 * 1024 * 1024,
        jwt: test_jwt(),
    }
}

/// The application under test plus the temporary directory its uploads land in.
pub struct TestApp {
    router: Router,
    pub storage: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Absolute location of a stored relative path.
    pub fn stored(&self, relative: &str) -> PathBuf {
        self.storage.path().join(relative)
    }

    /// Number of files currently stored under `directory`.
    pub fn file_count(&self, directory: &str) -> usize {
        std::fs::read_dir(self.storage.path().join(directory))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Build the full application router, with the production middleware stack,
/// over the given pool and a fresh storage directory.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let storage = tempfile::tempdir().expect("tempdir should be created");
    let config = test_config(storage.path().to_path_buf());

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        files: Arc::new(FileStore::new(storage.path())),
    };

    TestApp {
        router: build_app_router(state, &config),
        storage,
    }
}

// ---------------------------------------------------------------------------
// Seeding
// ---------------------------------------------------------------------------

/// Create a user with the named role and return it with a valid access token.
pub async fn seed_user(pool: &PgPool, name: &str, role: &str) -> (User, String) {
    let role_row = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("role should be seeded by migrations");
    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role_id: role_row.id,
        },
    )
    .await
    .unwrap();
    let token = generate_access_token(user.id, role, &test_jwt()).unwrap();
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router().oneshot(request).await.unwrap()
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: &TestApp, uri: &str) -> Response {
    send(app, json_request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, json_request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: Value) -> Response {
    send(app, json_request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, json_request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send(app, json_request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn patch_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response {
    send(app, json_request(Method::PATCH, uri, Some(token), Some(body))).await
}

/// Send `body` verbatim with the given content type.
pub async fn send_raw(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    content_type: &str,
    body: &str,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn delete_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    send(app, json_request(Method::DELETE, uri, Some(token), None)).await
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "buildtrack-test-boundary";

/// One part of a multipart form.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn send_multipart(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    send(app, request).await
}

pub async fn post_multipart_auth(
    app: &TestApp,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Response {
    send_multipart(app, Method::POST, uri, token, parts).await
}

pub async fn put_multipart_auth(
    app: &TestApp,
    uri: &str,
    token: &str,
    parts: &[Part<'_>],
) -> Response {
    send_multipart(app, Method::PUT, uri, token, parts).await
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}
