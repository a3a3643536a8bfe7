//! # Routemark API Server Library
//!
//! Serves a routes tree discovered by `routemark-core` with axum.
//!
//! ## Modules
//!
//! - `app`: Discovery run and router assembly
//! - `auth`: JWT gate for authenticated routes
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `handler`: Type-erased route handlers and the handler catalog
//! - `middleware`: Server-wide middleware
//! - `registrar`: Discovery registrar backed by an axum `Router`
//! - `routes`: Bundled handler modules
//! - `schema_registry`: Shared schemas and `$ref` checking

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod registrar;
pub mod routes;
pub mod schema_registry;
