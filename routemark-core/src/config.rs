/// Discovery configuration
///
/// Where to look for route modules and how they are named. Server-level
/// settings (bind address, CORS...) live with the server, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::convention::ModuleConvention;

/// Default routes root, relative to the working directory
pub const DEFAULT_ROUTES_DIR: &str = "src/routes";

/// Route discovery settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Root of the routes tree
    #[serde(default = "default_routes_dir")]
    pub routes_dir: PathBuf,

    /// File naming rules
    #[serde(default)]
    pub convention: ModuleConvention,
}

fn default_routes_dir() -> PathBuf {
    PathBuf::from(DEFAULT_ROUTES_DIR)
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            routes_dir: default_routes_dir(),
            convention: ModuleConvention::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Configuration for a given routes root with the default convention
    pub fn new(routes_dir: impl Into<PathBuf>) -> Self {
        Self {
            routes_dir: routes_dir.into(),
            convention: ModuleConvention::default(),
        }
    }

    /// Replaces the naming convention
    pub fn with_convention(mut self, convention: ModuleConvention) -> Self {
        self.convention = convention;
        self
    }
}
