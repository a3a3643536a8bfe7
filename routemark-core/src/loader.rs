/// Module loading seam
///
/// Discovery never evaluates code itself. Parsing the route comment is a
/// pure text operation; turning a module into something callable is the job
/// of a `ModuleLoader`.
///
/// # Export Model
///
/// A handler module's default export is either a handler or a plain value.
/// A schema module is a JSON document: the document is its default export
/// and, when it is an object, its top-level members are its named exports.
///
/// # Example
///
/// ```no_run
/// use routemark_core::loader::CatalogLoader;
///
/// type Handler = fn() -> &'static str;
///
/// fn hello() -> &'static str {
///     "hello"
/// }
///
/// let loader = CatalogLoader::<Handler>::new()
///     .handler("hello.rs", hello as Handler)
///     .handler("users/get.rs", hello as Handler);
/// assert_eq!(loader.len(), 2);
/// ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{RouteError, RouteResult};

/// A module file read during discovery
#[derive(Debug, Clone)]
pub struct ModuleFile {
    /// Absolute path
    pub path: PathBuf,

    /// Path relative to the routes root, `/`-separated (e.g. `users/get.rs`)
    pub module_id: String,

    /// Raw file text
    pub contents: String,
}

impl ModuleFile {
    /// Creates a module file, deriving its id from the routes root
    pub fn new(root: &Path, path: PathBuf, contents: String) -> Self {
        let module_id = module_id(root, &path);
        Self {
            path,
            module_id,
            contents,
        }
    }
}

/// `/`-separated path of `path` relative to `root`
pub fn module_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Default export of a handler module
#[derive(Debug, Clone)]
pub enum Export<H> {
    /// A callable request handler
    Handler(H),

    /// Anything that is not callable
    Value(Value),
}

/// Exports of a schema module
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaModule {
    /// The document itself
    pub default: Option<Value>,

    /// Top-level members of an object document, in document order
    pub named: Vec<(String, Value)>,
}

impl SchemaModule {
    /// Builds the export view of a parsed JSON document
    pub fn from_document(document: Value) -> Self {
        let named = match &document {
            Value::Object(members) => members
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect(),
            _ => Vec::new(),
        };

        Self {
            default: Some(document),
            named,
        }
    }
}

/// Turns module files into exports
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Handler type produced for callable default exports
    type Handler: Send;

    /// Loads the default export of a handler module
    ///
    /// Returns `Ok(None)` when the module has no default export.
    async fn load_handler(&self, module: &ModuleFile) -> RouteResult<Option<Export<Self::Handler>>>;

    /// Loads a schema module
    async fn load_schema(&self, path: &Path) -> RouteResult<SchemaModule>;
}

/// Loader backed by an in-process handler catalog
///
/// Handlers are compiled into the binary and registered under their module
/// id; schema modules are read from disk as JSON.
#[derive(Debug, Clone)]
pub struct CatalogLoader<H> {
    exports: HashMap<String, Export<H>>,
}

impl<H> CatalogLoader<H> {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self {
            exports: HashMap::new(),
        }
    }

    /// Registers a handler for a module id
    pub fn handler(mut self, module_id: impl Into<String>, handler: H) -> Self {
        self.insert(module_id, Export::Handler(handler));
        self
    }

    /// Registers a non-callable default export for a module id
    pub fn value(mut self, module_id: impl Into<String>, value: Value) -> Self {
        self.insert(module_id, Export::Value(value));
        self
    }

    /// Inserts or replaces the export of a module id
    pub fn insert(&mut self, module_id: impl Into<String>, export: Export<H>) {
        self.exports.insert(module_id.into(), export);
    }

    /// Number of catalogued modules
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl<H> Default for CatalogLoader<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<H> ModuleLoader for CatalogLoader<H>
where
    H: Clone + Send + Sync + 'static,
{
    type Handler = H;

    async fn load_handler(&self, module: &ModuleFile) -> RouteResult<Option<Export<H>>> {
        Ok(self.exports.get(&module.module_id).cloned())
    }

    async fn load_schema(&self, path: &Path) -> RouteResult<SchemaModule> {
        read_schema_document(path).await.map(SchemaModule::from_document)
    }
}

/// Reads and parses a JSON schema module
pub async fn read_schema_document(path: &Path) -> RouteResult<Value> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| RouteError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&text).map_err(|source| RouteError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}
