/// Axum registrar
///
/// Implements the discovery `Registrar` contract on top of an axum `Router`.
/// Shared schemas go to a `SchemaRegistry`; each route becomes a
/// `MethodRouter` with its options applied as layers:
///
/// | Option        | Effect                                              |
/// |---------------|-----------------------------------------------------|
/// | `config`      | `RouteConfig` request extension                     |
/// | `config.auth` | JWT gate (`auth::require_auth`) when truthy         |
/// | `bodyLimit`   | `DefaultBodyLimit::max(bytes)`                      |
/// | `timeout`     | `TimeoutLayer` (milliseconds, answers 408)          |
///
/// Every other option is kept in the route manifest only.
///
/// # Example
///
/// ```no_run
/// use routemark_api::registrar::AxumRegistrar;
/// use routemark_api::routes;
/// use routemark_core::{DiscoveryConfig, RouteDiscovery};
///
/// # async fn example() -> anyhow::Result<()> {
/// let mut registrar = AxumRegistrar::new(None);
/// let mut discovery = RouteDiscovery::new(DiscoveryConfig::default(), routes::catalog());
/// discovery.run(&mut registrar).await?;
///
/// let (router, manifest) = registrar.into_parts();
/// println!("{} routes", manifest.routes.len());
/// # Ok(())
/// # }
/// ```

use anyhow::{anyhow, Context};
use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware,
    routing::{on, MethodFilter, MethodRouter},
    Extension, Router,
};
use routemark_core::{
    descriptor::Method,
    options::{RouteOptions, ValidationSchema, CONFIG_KEY},
    registrar::{Registrar, RouteEntry},
    schema::SharedSchema,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::timeout::TimeoutLayer;
use tracing::debug;

use crate::auth::{self, AuthSettings};
use crate::handler::{RouteConfig, RouteHandler};
use crate::schema_registry::SchemaRegistry;

/// Options the registrar turns into layers
const APPLIED_OPTIONS: [&str; 3] = [CONFIG_KEY, "bodyLimit", "timeout"];

/// A mounted route as listed in the documentation manifest
#[derive(Debug, Clone, Serialize)]
pub struct ManifestRoute {
    pub method: Method,
    pub path: String,
    pub options: RouteOptions,
    pub schema: ValidationSchema,
    pub source: PathBuf,

    /// Accepted credentials, present on authenticated routes only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<Value>,
}

/// Everything discovery registered, in registration order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RouteManifest {
    pub routes: Vec<ManifestRoute>,
    pub schemas: Vec<SharedSchema>,
}

impl RouteManifest {
    /// Whether a route is already mounted for `method` and `path`
    pub fn contains(&self, method: Method, path: &str) -> bool {
        self.routes
            .iter()
            .any(|route| route.method == method && route.path == path)
    }
}

/// Registrar building an axum `Router`
pub struct AxumRegistrar {
    router: Router,
    registry: SchemaRegistry,
    routes: Vec<ManifestRoute>,
    auth: Option<Arc<AuthSettings>>,
}

impl AxumRegistrar {
    /// Creates an empty registrar
    ///
    /// # Arguments
    ///
    /// * `auth` - Token verification settings; routes with `config.auth`
    ///   cannot be mounted without them
    pub fn new(auth: Option<Arc<AuthSettings>>) -> Self {
        Self {
            router: Router::new(),
            registry: SchemaRegistry::new(),
            routes: Vec::new(),
            auth,
        }
    }

    /// Consumes the registrar, returning the router and the manifest
    pub fn into_parts(self) -> (Router, RouteManifest) {
        let manifest = RouteManifest {
            routes: self.routes,
            schemas: self.registry.schemas().to_vec(),
        };
        (self.router, manifest)
    }

    fn method_router(&self, route: &RouteEntry<RouteHandler>) -> anyhow::Result<MethodRouter> {
        let key = route.key();
        let handler = route.handler.clone();

        let mut method_router: MethodRouter = on(
            method_filter(route.descriptor.method),
            move |req: Request| {
                let handler = handler.clone();
                async move { handler(req).await }
            },
        );

        let config = RouteConfig::new(route.options.config().cloned().unwrap_or_default());
        method_router = method_router.layer(Extension(config));

        if let Some(limit) = route.options.body_limit() {
            method_router = method_router.layer(DefaultBodyLimit::max(limit));
        }

        if let Some(timeout) = route.options.timeout() {
            method_router = method_router.layer(TimeoutLayer::new(timeout));
        }

        for option in route.options.keys() {
            if !APPLIED_OPTIONS.contains(&option.as_str()) {
                debug!(route = %key, option = %option, "Route option recorded but not applied");
            }
        }

        if route.options.requires_auth() {
            let settings = self
                .auth
                .clone()
                .ok_or_else(|| anyhow!("route requires authentication but no JWT secret is configured"))?;
            method_router =
                method_router.layer(middleware::from_fn_with_state(settings, auth::require_auth));
        }

        Ok(method_router)
    }
}

impl Registrar<RouteHandler> for AxumRegistrar {
    fn register_shared_schema(&mut self, schema: SharedSchema) -> anyhow::Result<()> {
        self.registry.add(schema)?;
        Ok(())
    }

    fn mount_route(&mut self, route: RouteEntry<RouteHandler>) -> anyhow::Result<()> {
        self.registry
            .check_refs(&route.schema.to_value())
            .context("route schema references an unknown shared schema")?;

        let method_router = self.method_router(&route)?;
        let path = route.descriptor.path.clone();

        // axum panics on paths matchit cannot insert (conflicting captures,
        // misplaced wildcards); surface those as mount errors instead.
        let router = std::mem::replace(&mut self.router, Router::new());
        self.router = catch_unwind(AssertUnwindSafe(|| router.route(&path, method_router)))
            .map_err(|panic| anyhow!("router rejected path \"{}\": {}", path, panic_message(&*panic)))?;

        let security = route
            .options
            .requires_auth()
            .then(|| json!([{ "bearerAuth": [] }, { "cookieAuth": [] }]));

        self.routes.push(ManifestRoute {
            method: route.descriptor.method,
            path,
            options: route.options,
            schema: route.schema,
            source: route.source_file,
            security,
        });

        Ok(())
    }
}

fn method_filter(method: Method) -> MethodFilter {
    match method {
        Method::Get => MethodFilter::GET,
        Method::Post => MethodFilter::POST,
        Method::Put => MethodFilter::PUT,
        Method::Patch => MethodFilter::PATCH,
        Method::Delete => MethodFilter::DELETE,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }

    payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_else(|| "invalid route".to_string())
}
