/// Registrar contract
///
/// The registrar is the HTTP framework underneath: discovery hands it every
/// shared schema and every resolved route, and knows nothing else about it.
///
/// # Guarantees Given to Implementations
///
/// - Every shared schema is registered before the first route is mounted
/// - `mount_route` is called at most once per `METHOD PATH` key
/// - The handler in a `RouteEntry` is always a callable export
///
/// # Example
///
/// ```
/// use routemark_core::registrar::{MemoryRegistrar, Registrar};
/// use routemark_core::schema::SharedSchema;
/// use serde_json::json;
///
/// let mut registrar = MemoryRegistrar::<()>::new();
/// let schema = SharedSchema::from_value(json!({ "$id": "User" })).unwrap();
/// registrar.register_shared_schema(schema).unwrap();
/// assert_eq!(registrar.schemas.len(), 1);
/// ```

use std::path::PathBuf;

use crate::descriptor::{RouteDescriptor, RouteKey};
use crate::options::{RouteOptions, ValidationSchema};
use crate::schema::SharedSchema;

/// A fully resolved route, ready to mount
#[derive(Debug, Clone)]
pub struct RouteEntry<H> {
    /// Declared method and normalized path
    pub descriptor: RouteDescriptor,

    /// Transport-level options
    pub options: RouteOptions,

    /// Validation schema
    pub schema: ValidationSchema,

    /// Callable default export of the handler module
    pub handler: H,

    /// Handler module the route was declared in
    pub source_file: PathBuf,
}

impl<H> RouteEntry<H> {
    /// Dedup key of this route
    pub fn key(&self) -> RouteKey {
        self.descriptor.key()
    }
}

/// Operations consumed from the HTTP framework
pub trait Registrar<H> {
    /// Makes a schema referenceable by its `$id` from route schemas
    fn register_shared_schema(&mut self, schema: SharedSchema) -> anyhow::Result<()>;

    /// Mounts one route
    fn mount_route(&mut self, route: RouteEntry<H>) -> anyhow::Result<()>;
}

/// Order-preserving record of what a registrar received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    SharedSchema(String),
    Route(RouteKey),
}

/// Registrar that only records, useful for dry runs and tests
#[derive(Debug)]
pub struct MemoryRegistrar<H> {
    /// Every call, in order
    pub events: Vec<Registration>,

    /// Registered shared schemas
    pub schemas: Vec<SharedSchema>,

    /// Mounted routes
    pub routes: Vec<RouteEntry<H>>,
}

impl<H> MemoryRegistrar<H> {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            schemas: Vec::new(),
            routes: Vec::new(),
        }
    }

    /// Mounted route for a key
    pub fn route(&self, key: &RouteKey) -> Option<&RouteEntry<H>> {
        self.routes.iter().find(|route| &route.key() == key)
    }
}

impl<H> Default for MemoryRegistrar<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Registrar<H> for MemoryRegistrar<H> {
    fn register_shared_schema(&mut self, schema: SharedSchema) -> anyhow::Result<()> {
        if self.schemas.iter().any(|known| known.id == schema.id) {
            anyhow::bail!("schema with id \"{}\" already declared", schema.id);
        }

        self.events.push(Registration::SharedSchema(schema.id.clone()));
        self.schemas.push(schema);
        Ok(())
    }

    fn mount_route(&mut self, route: RouteEntry<H>) -> anyhow::Result<()> {
        self.events.push(Registration::Route(route.key()));
        self.routes.push(route);
        Ok(())
    }
}
