/// Error taxonomy for route discovery
///
/// Only configuration errors surface here. Advisory conditions (ambiguous
/// route comments, missing schema modules) are logged and recorded in the
/// discovery report; guarded degradations (non-object schema exports, a
/// missing routes directory) never produce an error at all.
///
/// Every variant carries enough context to fix the declaration without
/// re-running discovery: the route key and the file(s) involved.

use std::path::PathBuf;

use crate::descriptor::RouteKey;
use crate::pipeline::PipelineState;

/// Route discovery result type alias
pub type RouteResult<T> = Result<T, RouteError>;

/// Fatal route discovery errors
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Two handler modules declare the same method and path
    #[error("Duplicate route \"{key}\" detected:\n1. {}\n2. {}", first.display(), second.display())]
    DuplicateRoute {
        key: RouteKey,
        first: PathBuf,
        second: PathBuf,
    },

    /// A handler module declares a route but exports no callable handler
    #[error("Route \"{key}\" in \"{}\" must export a default handler function", file.display())]
    NotCallable { key: RouteKey, file: PathBuf },

    /// A module file or directory could not be read
    #[error("Failed to read \"{}\": {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A schema module is not a valid document
    #[error("Failed to parse schema module \"{}\": {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The registrar refused a shared schema
    #[error("Failed to register shared schema \"{id}\" from \"{}\": {source}", file.display())]
    SharedSchema {
        id: String,
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The registrar refused a route
    #[error("Failed to mount route \"{key}\" from \"{}\": {source}", file.display())]
    Mount {
        key: RouteKey,
        file: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Discovery was started on a pipeline that already ran
    #[error("Route discovery cannot start from state {0:?}")]
    NotIdle(PipelineState),
}
