/// Middleware modules for the API server
///
/// Server-wide layers only; per-route layers are built by the registrar.

pub mod security;
