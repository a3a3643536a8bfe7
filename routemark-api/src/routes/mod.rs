//! Bundled handler modules
//!
//! Every file in this directory is both a compiled module and a module seen
//! by route discovery. A file declares its route on a line of its own, the
//! verb followed by the path after two slashes, and may sit next to a
//! `.schema.json` file carrying its route options and validation schema.
//!
//! Discovery looks handlers up by module id (path relative to this
//! directory), so each handler is registered in [`catalog`] under its file
//! name.

pub mod health;
pub mod hello;
pub mod users;
pub mod whoami;

use crate::handler::{handler, HandlerCatalog};

/// Handlers of the bundled routes tree, keyed by module id
pub fn catalog() -> HandlerCatalog {
    HandlerCatalog::new()
        .handler("health.rs", handler(health::handler))
        .handler("hello.rs", handler(hello::handler))
        .handler("users/get.rs", handler(users::get::handler))
        .handler("whoami.rs", handler(whoami::handler))
}
