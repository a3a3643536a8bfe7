/// Type-erased route handlers
///
/// Handler modules are compiled into the binary, so the module loader needs
/// one concrete handler type. `RouteHandler` wraps any async function taking
/// the raw request; handlers pull what they need with axum's `RequestExt`.
///
/// # Example
///
/// ```
/// use axum::{extract::Request, Json};
/// use routemark_api::handler::{handler, HandlerCatalog};
/// use serde_json::{json, Value};
///
/// async fn status(_req: Request) -> Json<Value> {
///     Json(json!({ "status": "ok" }))
/// }
///
/// let catalog = HandlerCatalog::new().handler("status.rs", handler(status));
/// assert_eq!(catalog.len(), 1);
/// ```

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use futures::future::BoxFuture;
use routemark_core::loader::CatalogLoader;
use routemark_core::options::is_truthy;
use serde_json::{Map, Value};
use std::future::Future;
use std::sync::Arc;

/// A callable default export of a handler module
pub type RouteHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Catalog of compiled handlers keyed by module id (`users/get.rs`)
pub type HandlerCatalog = CatalogLoader<RouteHandler>;

/// Erases an async handler function into a `RouteHandler`
pub fn handler<F, Fut, R>(f: F) -> RouteHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> {
        let fut = f(req);
        Box::pin(async move { fut.await.into_response() })
    })
}

/// Per-route `config` option, attached to every request of the route
///
/// # Example
///
/// ```
/// use axum::extract::Request;
/// use routemark_api::handler::RouteConfig;
///
/// async fn handler(req: Request) -> String {
///     let admin = req
///         .extensions()
///         .get::<RouteConfig>()
///         .and_then(|config| config.get("role"))
///         .is_some();
///     format!("admin: {}", admin)
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteConfig(Map<String, Value>);

impl RouteConfig {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the route requires authentication (`auth` is truthy)
    pub fn auth(&self) -> bool {
        self.0.get("auth").is_some_and(is_truthy)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}
