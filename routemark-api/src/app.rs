/// Application assembly
///
/// Runs route discovery against the configured routes tree, then wraps the
/// resulting router with the server-wide middleware and the manifest
/// endpoint.
///
/// # Example
///
/// ```no_run
/// use routemark_api::{app::build_app, config::Config, routes};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// let app = build_app(&config, routes::catalog()).await?;
///
/// let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
/// axum::serve(listener, app.router).await?;
/// # Ok(())
/// # }
/// ```

use crate::{
    auth::AuthSettings,
    config::{ApiConfig, Config, DocsConfig},
    handler::HandlerCatalog,
    middleware::security::SecurityHeadersLayer,
    registrar::{AxumRegistrar, RouteManifest},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use routemark_core::{descriptor, DiscoveryReport, RouteDiscovery};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

/// A ready-to-serve application
pub struct App {
    /// Router with every discovered route and middleware applied
    pub router: Router,

    /// What discovery found
    pub report: DiscoveryReport,

    /// Mounted routes and shared schemas
    pub manifest: Arc<RouteManifest>,
}

/// Discovers the routes tree and builds the complete router
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Per-route layers (config extension, body limit, timeout, auth)
/// 2. Logging (tower-http TraceLayer)
/// 3. CORS (tower-http CorsLayer)
/// 4. Security headers
///
/// # Errors
///
/// Returns the discovery error when the routes tree is misconfigured:
/// duplicate routes, non-callable handlers, unreadable or malformed
/// modules, or routes the registrar refuses.
pub async fn build_app(config: &Config, catalog: HandlerCatalog) -> anyhow::Result<App> {
    let auth = config
        .auth
        .secret
        .as_deref()
        .map(|secret| Arc::new(AuthSettings::new(secret)));

    let mut registrar = AxumRegistrar::new(auth);
    let mut discovery = RouteDiscovery::new(config.routes.clone(), catalog);
    let report = discovery.run(&mut registrar).await?;

    let (mut router, manifest) = registrar.into_parts();
    let manifest = Arc::new(manifest);

    if config.docs.enabled {
        router = mount_docs(router, &config.docs, manifest.clone());
    }

    let router = router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&config.api))
        .layer(SecurityHeadersLayer::new(config.api.is_production()));

    Ok(App {
        router,
        report,
        manifest,
    })
}

fn mount_docs(router: Router, docs: &DocsConfig, manifest: Arc<RouteManifest>) -> Router {
    let path = descriptor::normalize_path(&docs.path);

    if manifest.contains(descriptor::Method::Get, &path) {
        warn!(path = %path, "Documentation path taken by a discovered route, manifest not served");
        return router;
    }

    let document = Arc::new(manifest_document(docs, &manifest));
    info!(path = %path, "Serving route manifest");

    router.route(
        &path,
        get(move || {
            let document = document.clone();
            async move { Json(document.as_ref().clone()) }
        }),
    )
}

fn manifest_document(docs: &DocsConfig, manifest: &RouteManifest) -> Value {
    json!({
        "info": { "title": docs.title, "version": docs.version },
        "securitySchemes": {
            "bearerAuth": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" },
            "cookieAuth": { "type": "apiKey", "in": "cookie", "name": crate::auth::TOKEN_COOKIE }
        },
        "routes": manifest.routes,
        "schemas": manifest.schemas,
    })
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
    if api.allows_any_origin() {
        if api.is_production() {
            warn!("CORS: allowing all origins (*) in production");
        }
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
