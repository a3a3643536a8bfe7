/// Route table builder
///
/// Remembers which file claimed each `METHOD PATH` key. A second claim on
/// the same key is a configuration error naming both files; it is never
/// resolved by "last write wins" since that would make the API surface
/// depend on traversal order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::descriptor::RouteKey;
use crate::error::{RouteError, RouteResult};

/// Dedup map from route key to the file that declared it
#[derive(Debug, Default)]
pub struct RouteTable {
    seen: HashMap<RouteKey, PathBuf>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `file` as the owner of `key`
    ///
    /// # Errors
    ///
    /// Returns `RouteError::DuplicateRoute` if the key is already claimed.
    /// The table is left unchanged in that case.
    pub fn claim(&mut self, key: RouteKey, file: &Path) -> RouteResult<()> {
        if let Some(first) = self.seen.get(&key) {
            return Err(RouteError::DuplicateRoute {
                key,
                first: first.clone(),
                second: file.to_path_buf(),
            });
        }

        self.seen.insert(key, file.to_path_buf());
        Ok(())
    }

    /// File that claimed a key
    pub fn source_of(&self, key: &RouteKey) -> Option<&Path> {
        self.seen.get(key).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
