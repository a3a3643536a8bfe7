/// Common helpers for discovery integration tests
///
/// Builds scratch routes trees on disk and a catalog loader whose handlers
/// are plain string labels, so tests can check which handler got mounted.

use routemark_core::loader::CatalogLoader;
use routemark_core::DiscoveryConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Handler stand-in used by the tests
pub type Label = &'static str;

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

    /// Absolute path of a module in the tree
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Writes a module, creating parent directories
    pub fn write(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    pub fn config(&self) -> DiscoveryConfig {
        DiscoveryConfig::new(self.root())
    }
}

/// Catalog with one labelled handler per module id
pub fn catalog(modules: &[Label]) -> CatalogLoader<Label> {
    modules
        .iter()
        .fold(CatalogLoader::new(), |loader, module| loader.handler(*module, *module))
}
