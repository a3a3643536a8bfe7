//! # Routemark Core
//!
//! Route discovery and registration engine. Handler modules declare their
//! own route with a magic comment instead of a central route table:
//!
//! ```text
//! // POST /teams/create
//! ```
//!
//! The engine walks a routes tree, extracts each module's declaration,
//! pairs handlers with their optional `.schema.json` sibling, rejects
//! colliding declarations and hands the resolved routes to a `Registrar`.
//!
//! ## Module Organization
//!
//! - `convention`: handler/schema file naming rules
//! - `walker`: routes tree enumeration
//! - `descriptor`: magic comment parsing (pure)
//! - `loader`: module loading seam and the catalog-backed loader
//! - `schema`: schema module exports and shared schemas
//! - `options`: route options / validation schema split
//! - `table`: duplicate route detection
//! - `registrar`: contract with the HTTP framework
//! - `pipeline`: the two-pass discovery run
//! - `config`: discovery settings
//! - `error`: fatal error taxonomy

pub mod config;
pub mod convention;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod options;
pub mod pipeline;
pub mod registrar;
pub mod schema;
pub mod table;
pub mod walker;

pub use config::DiscoveryConfig;
pub use descriptor::{parse_route_declaration, Declaration, Method, RouteDescriptor, RouteKey};
pub use error::{RouteError, RouteResult};
pub use loader::{CatalogLoader, Export, ModuleLoader};
pub use pipeline::{DiscoveryReport, PipelineState, RouteDiscovery};
pub use registrar::{Registrar, RouteEntry};

/// Current version of the routemark core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
