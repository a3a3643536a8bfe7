/// Route discovery pipeline
///
/// Runs once at startup and is not re-entrant:
///
/// ```text
/// Idle → Scanning → SchemaPass → RoutePass → Done
///                        │            │
///                        └────────────┴──→ Failed
/// ```
///
/// # Passes
///
/// 1. **Scanning**: walk the routes tree
/// 2. **SchemaPass**: every orphan schema module (no sibling handler) has its
///    `$id`-carrying exports registered as shared schemas
/// 3. **RoutePass**: every handler module with exactly one route comment is
///    claimed in the route table, loaded, paired with its schema module,
///    split into options and schema, and mounted
///
/// Shared schemas must exist before any route that references them is
/// mounted, so the schema pass always completes first.
///
/// # Loading
///
/// Each module load is awaited before the next file is looked at. There is
/// no parallel loading: the first file seen for a route key is always the
/// one reported as "1." in a duplicate error.
///
/// # Failure
///
/// Configuration errors stop the pipeline where they occur; nothing after
/// the failing file is mounted. A failed or completed pipeline cannot run
/// again.
///
/// # Example
///
/// ```no_run
/// use routemark_core::config::DiscoveryConfig;
/// use routemark_core::loader::CatalogLoader;
/// use routemark_core::pipeline::RouteDiscovery;
/// use routemark_core::registrar::MemoryRegistrar;
///
/// # async fn example() -> Result<(), routemark_core::error::RouteError> {
/// let loader = CatalogLoader::<fn()>::new();
/// let mut registrar = MemoryRegistrar::new();
///
/// let mut discovery = RouteDiscovery::new(DiscoveryConfig::new("src/routes"), loader);
/// let report = discovery.run(&mut registrar).await?;
/// println!("{} routes mounted", report.routes.len());
/// # Ok(())
/// # }
/// ```

use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::DiscoveryConfig;
use crate::convention::ModuleKind;
use crate::descriptor::{parse_route_declaration, Declaration, RouteKey};
use crate::error::{RouteError, RouteResult};
use crate::loader::{Export, ModuleFile, ModuleLoader};
use crate::options::split_schema_export;
use crate::registrar::{Registrar, RouteEntry};
use crate::schema::{raw_export, shared_schemas, RawSchemaExport};
use crate::table::RouteTable;
use crate::walker;

/// Pipeline lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Scanning,
    SchemaPass,
    RoutePass,
    Done,
    Failed,
}

/// A route handed to the registrar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountedRoute {
    pub key: RouteKey,
    pub file: PathBuf,
}

/// Summary of a completed discovery run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoveryReport {
    /// Mounted routes, in mount order
    pub routes: Vec<MountedRoute>,

    /// Ids of registered shared schemas, in registration order
    pub shared_schemas: Vec<String>,

    /// Modules excluded for declaring more than one route
    pub ambiguous: Vec<PathBuf>,

    /// Handler modules mounted without a schema module
    pub missing_schema: Vec<PathBuf>,
}

/// One-shot discovery and registration engine
pub struct RouteDiscovery<L> {
    config: DiscoveryConfig,
    loader: L,
    table: RouteTable,
    state: PipelineState,
}

impl<L: ModuleLoader> RouteDiscovery<L> {
    /// Creates an idle pipeline with a fresh route table
    pub fn new(config: DiscoveryConfig, loader: L) -> Self {
        Self {
            config,
            loader,
            table: RouteTable::new(),
            state: PipelineState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Route keys claimed so far
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Discovers every module and hands the results to `registrar`
    ///
    /// # Errors
    ///
    /// - `RouteError::DuplicateRoute` when two modules declare the same key
    /// - `RouteError::NotCallable` when a handler module has no callable export
    /// - `RouteError::Unreadable` / `RouteError::Malformed` for broken files
    /// - `RouteError::SharedSchema` / `RouteError::Mount` when the registrar refuses
    /// - `RouteError::NotIdle` when the pipeline already ran
    pub async fn run<R>(&mut self, registrar: &mut R) -> RouteResult<DiscoveryReport>
    where
        R: Registrar<L::Handler>,
    {
        if self.state != PipelineState::Idle {
            return Err(RouteError::NotIdle(self.state));
        }

        let result = self.execute(registrar).await;

        match &result {
            Ok(report) => {
                self.transition(PipelineState::Done);
                info!(
                    routes = report.routes.len(),
                    shared_schemas = report.shared_schemas.len(),
                    ambiguous = report.ambiguous.len(),
                    missing_schema = report.missing_schema.len(),
                    "Route discovery complete"
                );
            }
            Err(err) => {
                self.transition(PipelineState::Failed);
                error!(error = %err, "Route discovery failed");
            }
        }

        result
    }

    async fn execute<R>(&mut self, registrar: &mut R) -> RouteResult<DiscoveryReport>
    where
        R: Registrar<L::Handler>,
    {
        self.transition(PipelineState::Scanning);
        let root = walker::resolve_root(&self.config.routes_dir)?;
        let files = walker::walk(&root, &self.config.convention)?;
        debug!(root = %root.display(), files = files.len(), "Routes tree scanned");

        let mut report = DiscoveryReport::default();

        self.transition(PipelineState::SchemaPass);
        self.register_shared_schemas(&files, registrar, &mut report)
            .await?;

        self.transition(PipelineState::RoutePass);
        self.register_routes(&root, &files, registrar, &mut report)
            .await?;

        Ok(report)
    }

    async fn register_shared_schemas<R>(
        &self,
        files: &[PathBuf],
        registrar: &mut R,
        report: &mut DiscoveryReport,
    ) -> RouteResult<()>
    where
        R: Registrar<L::Handler>,
    {
        let convention = &self.config.convention;

        for file in files {
            if convention.kind(file) != Some(ModuleKind::Schema) {
                continue;
            }

            let Some(handler) = convention.handler_path_for(file) else {
                continue;
            };
            if path_exists(&handler).await? {
                continue;
            }

            let module = self.loader.load_schema(file).await?;
            for schema in shared_schemas(module) {
                let id = schema.id.clone();
                registrar
                    .register_shared_schema(schema)
                    .map_err(|source| RouteError::SharedSchema {
                        id: id.clone(),
                        file: file.clone(),
                        source,
                    })?;

                debug!(id = %id, file = %file.display(), "Shared schema registered");
                report.shared_schemas.push(id);
            }
        }

        Ok(())
    }

    async fn register_routes<R>(
        &mut self,
        root: &Path,
        files: &[PathBuf],
        registrar: &mut R,
        report: &mut DiscoveryReport,
    ) -> RouteResult<()>
    where
        R: Registrar<L::Handler>,
    {
        for file in files {
            if self.config.convention.kind(file) != Some(ModuleKind::Handler) {
                continue;
            }

            let contents = tokio::fs::read_to_string(file)
                .await
                .map_err(|source| RouteError::Unreadable {
                    path: file.clone(),
                    source,
                })?;
            let module = ModuleFile::new(root, file.clone(), contents);

            let descriptor = match parse_route_declaration(&module.contents) {
                Declaration::None => continue,
                Declaration::Ambiguous { count } => {
                    warn!(
                        file = %file.display(),
                        count,
                        "Ignored module: only one route comment is allowed per file"
                    );
                    report.ambiguous.push(file.clone());
                    continue;
                }
                Declaration::Route(descriptor) => descriptor,
            };

            let key = descriptor.key();
            self.table.claim(key.clone(), file)?;

            let handler = match self.loader.load_handler(&module).await? {
                Some(Export::Handler(handler)) => handler,
                Some(Export::Value(_)) | None => {
                    return Err(RouteError::NotCallable {
                        key,
                        file: file.clone(),
                    });
                }
            };

            let schema_path = self.config.convention.schema_path_for(file);
            let raw = if path_exists(&schema_path).await? {
                raw_export(self.loader.load_schema(&schema_path).await?.default)
            } else {
                warn!(route = %key, file = %file.display(), "Route schema missing");
                report.missing_schema.push(file.clone());
                RawSchemaExport::new()
            };

            let (options, schema) = split_schema_export(raw);
            let entry = RouteEntry {
                descriptor,
                options,
                schema,
                handler,
                source_file: file.clone(),
            };

            registrar
                .mount_route(entry)
                .map_err(|source| RouteError::Mount {
                    key: key.clone(),
                    file: file.clone(),
                    source,
                })?;

            info!(route = %key, file = %file.display(), "Route mounted");
            report.routes.push(MountedRoute {
                key,
                file: file.clone(),
            });
        }

        Ok(())
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Route discovery state change");
        self.state = next;
    }
}

async fn path_exists(path: &Path) -> RouteResult<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| RouteError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}
