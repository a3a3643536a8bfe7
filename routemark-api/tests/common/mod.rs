/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Scratch routes trees on disk
/// - Configuration pointing at a routes tree
/// - JWT token generation
/// - Request helpers against the assembled router

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use routemark_api::config::Config;
use routemark_core::DiscoveryConfig;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

/// Secret shared by the test configuration and the minted tokens
pub const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

/// Scratch routes tree
pub struct RoutesTree {
    dir: TempDir,
}

impl RoutesTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Writes a module, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> &Self {
        let path = self.root().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    /// Test configuration discovering this tree
    pub fn config(&self) -> Config {
        let mut config = test_config();
        config.routes = DiscoveryConfig::new(self.root());
        config
    }
}

/// Bundled routes tree of this crate
pub const BUNDLED_ROUTES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/src/routes");

/// Default configuration discovering the bundled routes, with the test secret
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.routes = DiscoveryConfig::new(BUNDLED_ROUTES_DIR);
    config.auth.secret = Some(SECRET.to_string());
    config
}

/// Mints a token for `sub` valid for one hour
pub fn token_for(sub: &str) -> String {
    let claims = json!({
        "sub": sub,
        "iat": Utc::now().timestamp(),
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    });

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Sends a request and returns the status with the JSON body (`Null` if empty)
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&body).into()))
    };

    (status, json)
}
