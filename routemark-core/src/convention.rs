/// File naming conventions for handler and schema modules
///
/// ```text
/// routes/
/// ├── hello.rs                 # handler module (// POST /hello)
/// ├── hello.schema.json        # schema module belonging to hello.rs
/// └── shared/
///     └── user.schema.json     # orphan schema module: shared schemas
/// ```
///
/// A file is a schema module iff its name ends with `.<marker>.<schema ext>`.
/// A schema module belongs to a handler module iff replacing that suffix
/// with `.<handler ext>` yields the handler's exact file name in the same
/// directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What role a file plays in the routes tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleKind {
    /// May declare a route
    Handler,

    /// Validation/options data, or a shared schema when orphaned
    Schema,
}

/// Naming rules for the routes tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleConvention {
    /// Extension of handler modules (without the dot)
    pub handler_extension: String,

    /// Extension of schema modules (without the dot)
    pub schema_extension: String,

    /// Marker placed before the schema extension
    pub schema_marker: String,

    /// Directory names never descended into (dot-directories are always skipped)
    pub ignored_dirs: Vec<String>,
}

impl Default for ModuleConvention {
    fn default() -> Self {
        Self {
            handler_extension: "rs".to_string(),
            schema_extension: "json".to_string(),
            schema_marker: "schema".to_string(),
            ignored_dirs: vec!["target".to_string(), "node_modules".to_string()],
        }
    }
}

impl ModuleConvention {
    /// Classifies a file by name
    ///
    /// The schema suffix is checked first so that a shared extension
    /// (e.g. `hello.schema.js` next to `hello.js`) still classifies as schema.
    pub fn kind(&self, path: &Path) -> Option<ModuleKind> {
        let name = path.file_name()?.to_str()?;

        if name.len() > self.schema_suffix().len() && name.ends_with(&self.schema_suffix()) {
            return Some(ModuleKind::Schema);
        }

        let handler_suffix = format!(".{}", self.handler_extension);
        if name.len() > handler_suffix.len() && name.ends_with(&handler_suffix) {
            return Some(ModuleKind::Handler);
        }

        None
    }

    /// Whether a directory entry with this name is skipped
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        name.starts_with('.') || self.ignored_dirs.iter().any(|ignored| ignored == name)
    }

    /// Sibling schema module path for a handler module
    pub fn schema_path_for(&self, handler: &Path) -> PathBuf {
        let stem = handler
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        handler.with_file_name(format!("{}{}", stem, self.schema_suffix()))
    }

    /// Handler module path a schema module would belong to
    pub fn handler_path_for(&self, schema: &Path) -> Option<PathBuf> {
        let name = schema.file_name()?.to_str()?;
        let stem = name.strip_suffix(&self.schema_suffix())?;

        Some(schema.with_file_name(format!("{}.{}", stem, self.handler_extension)))
    }

    fn schema_suffix(&self) -> String {
        format!(".{}.{}", self.schema_marker, self.schema_extension)
    }
}
