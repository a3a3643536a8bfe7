/// Integration tests for the Routemark API server
///
/// These tests verify discovery end-to-end through the axum router:
/// - Bundled routes tree served with its shared schemas
/// - Route options applied as layers (body limit, timeout, config, auth)
/// - Manifest endpoint contents
/// - Startup failures for misconfigured trees

mod common;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, RequestExt};
use common::{get, get_with_bearer, post_json, send, test_config, token_for, RoutesTree};
use routemark_api::app::build_app;
use routemark_api::handler::{handler, HandlerCatalog, RouteConfig};
use routemark_api::routes;
use routemark_core::RouteError;
use serde_json::{json, Value};
use std::time::Duration;

async fn echo_body(req: Request) -> Response {
    match req.extract::<Json<Value>, _>().await {
        Ok(Json(body)) => Json(body).into_response(),
        Err(rejection) => rejection.into_response(),
    }
}

async fn echo_config(req: Request) -> Json<Value> {
    let config = req
        .extensions()
        .get::<RouteConfig>()
        .map(|config| Value::Object(config.as_map().clone()))
        .unwrap_or(Value::Null);
    Json(config)
}

async fn slow(_req: Request) -> &'static str {
    tokio::time::sleep(Duration::from_millis(500)).await;
    "too late"
}

#[tokio::test]
async fn test_bundled_routes_are_served() {
    let app = build_app(&test_config(), routes::catalog()).await.unwrap();

    let mounted: Vec<String> = app.report.routes.iter().map(|r| r.key.to_string()).collect();
    assert_eq!(
        mounted,
        vec!["GET /health", "POST /hello", "GET /users/:id", "GET /whoami"]
    );
    assert_eq!(app.report.shared_schemas, vec!["User", "UserList"]);
    assert!(app.report.missing_schema.iter().any(|f| f.ends_with("health.rs")));

    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app.router, get("/users/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ada Lovelace");

    let (status, body) = send(&app.router, get("/users/42")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, body) = send(&app.router, post_json("/hello", &json!({ "name": "Ada" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Hello Ada");
}

#[tokio::test]
async fn test_auth_route_requires_token() {
    let app = build_app(&test_config(), routes::catalog()).await.unwrap();

    let (status, body) = send(&app.router, get("/whoami")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = send(&app.router, get_with_bearer("/whoami", "not-a-token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app.router, get_with_bearer("/whoami", &token_for("user-7"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user-7");
}

#[tokio::test]
async fn test_auth_accepts_token_cookie() {
    let app = build_app(&test_config(), routes::catalog()).await.unwrap();

    let request = axum::http::Request::builder()
        .method("GET")
        .uri("/whoami")
        .header(header::COOKIE, format!("theme=dark; token={}", token_for("user-8")))
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "user-8");
}

#[tokio::test]
async fn test_auth_route_without_secret_fails_startup() {
    let mut config = test_config();
    config.auth.secret = None;

    let err = build_app(&config, routes::catalog()).await.err().unwrap();
    let route_error = err.downcast_ref::<RouteError>().unwrap();
    assert!(matches!(route_error, RouteError::Mount { key, .. } if key.to_string() == "GET /whoami"));
}

#[tokio::test]
async fn test_truthy_config_auth_requires_token() {
    let tree = RoutesTree::new();
    tree.write("admin.rs", "// GET /admin\n")
        .write("admin.schema.json", r#"{ "config": { "auth": 1 } }"#)
        .write("panel.rs", "// GET /panel\n")
        .write("panel.schema.json", r#"{ "config": { "auth": "yes" } }"#);

    let catalog = HandlerCatalog::new()
        .handler("admin.rs", handler(echo_config))
        .handler("panel.rs", handler(echo_config));
    let app = build_app(&tree.config(), catalog).await.unwrap();

    for path in ["/admin", "/panel"] {
        let (status, body) = send(&app.router, get(path)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path} served without a token");
        assert_eq!(body["error"], "unauthorized");
    }

    let (status, body) = send(&app.router, get_with_bearer("/admin", &token_for("user-9"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "auth": 1 }));
}

#[tokio::test]
async fn test_manifest_lists_routes_and_schemas() {
    let app = build_app(&test_config(), routes::catalog()).await.unwrap();

    let (status, body) = send(&app.router, get("/documentation/json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "API");

    let routes = body["routes"].as_array().unwrap();
    assert_eq!(routes.len(), 4);

    let whoami = routes.iter().find(|r| r["path"] == "/whoami").unwrap();
    assert_eq!(whoami["method"], "get");
    assert_eq!(whoami["options"]["config"]["auth"], true);
    assert!(whoami["schema"].get("auth").is_none());
    assert!(whoami["security"].is_array());

    let hello = routes.iter().find(|r| r["path"] == "/hello").unwrap();
    assert_eq!(hello["options"]["bodyLimit"], 1024);
    assert_eq!(hello["schema"]["summary"], "Say hello");

    let schemas: Vec<&str> = body["schemas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(schemas, vec!["User", "UserList"]);
}

#[tokio::test]
async fn test_manifest_can_be_disabled() {
    let mut config = test_config();
    config.docs.enabled = false;

    let app = build_app(&config, routes::catalog()).await.unwrap();
    let (status, _) = send(&app.router, get("/documentation/json")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_on_discovered_routes() {
    let app = build_app(&test_config(), routes::catalog()).await.unwrap();

    let response = tower::ServiceExt::oneshot(app.router.clone(), get("/health"))
        .await
        .unwrap();
    let headers = response.headers();

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("Cross-Origin-Resource-Policy").unwrap(), "cross-origin");
    assert!(headers.get("Content-Security-Policy").is_none());
}

#[tokio::test]
async fn test_body_limit_option_applied() {
    let tree = RoutesTree::new();
    tree.write("echo.rs", "// POST /echo\n")
        .write("echo.schema.json", r#"{ "bodyLimit": 32 }"#);

    let catalog = HandlerCatalog::new().handler("echo.rs", handler(echo_body));
    let app = build_app(&tree.config(), catalog).await.unwrap();

    let (status, body) = send(&app.router, post_json("/echo", &json!({ "a": 1 }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["a"], 1);

    let big = json!({ "padding": "x".repeat(256) });
    let (status, _) = send(&app.router, post_json("/echo", &big)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_timeout_option_applied() {
    let tree = RoutesTree::new();
    tree.write("slow.rs", "// GET /slow\n")
        .write("slow.schema.json", r#"{ "timeout": 20 }"#);

    let catalog = HandlerCatalog::new().handler("slow.rs", handler(slow));
    let app = build_app(&tree.config(), catalog).await.unwrap();

    let (status, _) = send(&app.router, get("/slow")).await;
    assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
}

#[tokio::test]
async fn test_config_option_reaches_handler() {
    let tree = RoutesTree::new();
    tree.write("admin/stats.rs", "// GET /admin/stats/\n").write(
        "admin/stats.schema.json",
        r#"{ "config": { "role": "admin", "auth": true }, "auth": false }"#,
    );

    let catalog = HandlerCatalog::new().handler("admin/stats.rs", handler(echo_config));
    let app = build_app(&tree.config(), catalog).await.unwrap();

    // auth shorthand overrides config.auth, so no token is needed
    let (status, body) = send(&app.router, get("/admin/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "role": "admin", "auth": false }));
}

#[tokio::test]
async fn test_shared_schema_reference_resolves() {
    let tree = RoutesTree::new();
    tree.write("shared/team.schema.json", r#"{ "$id": "Team", "type": "object" }"#)
        .write("teams/get.rs", "// GET /teams/:id\n")
        .write(
            "teams/get.schema.json",
            r#"{ "response": { "200": { "$ref": "Team#" } } }"#,
        );

    let catalog = HandlerCatalog::new().handler("teams/get.rs", handler(echo_config));
    let app = build_app(&tree.config(), catalog).await.unwrap();

    assert_eq!(app.report.shared_schemas, vec!["Team"]);
    assert_eq!(app.manifest.schemas.len(), 1);
}

#[tokio::test]
async fn test_unknown_schema_reference_fails_startup() {
    let tree = RoutesTree::new();
    tree.write("teams/get.rs", "// GET /teams/:id\n").write(
        "teams/get.schema.json",
        r#"{ "response": { "200": { "$ref": "Team#" } } }"#,
    );

    let catalog = HandlerCatalog::new().handler("teams/get.rs", handler(echo_config));
    let err = build_app(&tree.config(), catalog).await.err().unwrap();

    let message = format!("{:#}", err);
    assert!(message.contains("GET /teams/:id"));
    assert!(message.contains("Team"));
}

#[tokio::test]
async fn test_duplicate_route_fails_startup() {
    let tree = RoutesTree::new();
    tree.write("a.rs", "// GET /status\n").write("b.rs", "// get /status/\n");

    let catalog = HandlerCatalog::new()
        .handler("a.rs", handler(echo_config))
        .handler("b.rs", handler(echo_config));
    let err = build_app(&tree.config(), catalog).await.err().unwrap();

    let message = err.to_string();
    assert!(message.contains("Duplicate route \"GET /status\""));
    assert!(message.contains("a.rs"));
    assert!(message.contains("b.rs"));
}
