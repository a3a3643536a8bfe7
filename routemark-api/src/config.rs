/// Configuration management for the API server
///
/// Settings are layered with the `config` crate, later sources winning:
///
/// 1. Built-in defaults
/// 2. `routemark.toml` in the working directory (optional)
/// 3. Environment variables prefixed with `ROUTEMARK__`, sections separated
///    by `__` (a `.env` file is loaded first when present)
///
/// # Environment Variables
///
/// - `ROUTEMARK__API__PORT`: Port to bind to (default: 3000)
/// - `ROUTEMARK__API__PUBLIC`: Bind on all interfaces instead of loopback (default: false)
/// - `ROUTEMARK__API__CORS_ORIGINS`: Comma-separated origins, `*` for any (default: *)
/// - `ROUTEMARK__API__ENVIRONMENT`: `development` or `production` (default: development)
/// - `ROUTEMARK__ROUTES__ROUTES_DIR`: Routes tree to discover, relative to
///   the working directory (default: src/routes)
/// - `ROUTEMARK__AUTH__SECRET`: Secret for verifying HS256 tokens
/// - `ROUTEMARK__DOCS__ENABLED`: Serve the route manifest (default: true)
/// - `ROUTEMARK__DOCS__PATH`: Manifest path (default: /documentation/json)
/// - `RUST_LOG`: Log filter (default: routemark_api=debug,routemark_core=info,tower_http=debug)
///
/// # Example
///
/// ```no_run
/// use routemark_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::load()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use ::config::{Environment, File};
use routemark_core::config::DiscoveryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional settings file, looked up in the working directory
pub const CONFIG_FILE: &str = "routemark.toml";

const ENV_PREFIX: &str = "ROUTEMARK";
const ENV_SEPARATOR: &str = "__";

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Route discovery configuration
    #[serde(default)]
    pub routes: DiscoveryConfig,

    /// Token verification configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Route manifest endpoint configuration
    #[serde(default)]
    pub docs: DocsConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Port to bind to
    pub port: u16,

    /// Listen on all interfaces instead of loopback only
    pub public: bool,

    /// Allowed CORS origins, `*` allows any
    pub cors_origins: Vec<String>,

    /// Deployment environment (`development` or `production`)
    pub environment: String,
}

/// Token verification configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Secret for HS256 tokens
    ///
    /// Required as soon as one discovered route sets `auth`.
    /// Generate with: `openssl rand -hex 32`
    pub secret: Option<String>,
}

/// Route manifest endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    /// Serve the manifest at all
    pub enabled: bool,

    /// Path the manifest is served at
    pub path: String,

    /// API title reported in the manifest
    pub title: String,

    /// API version reported in the manifest
    pub version: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            routes: DiscoveryConfig::default(),
            auth: AuthConfig::default(),
            docs: DocsConfig::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            public: false,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
        }
    }
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/documentation/json".to_string(),
            title: "API".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

impl ApiConfig {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|origin| origin == "*")
    }
}

impl Config {
    /// Loads `.env`, `routemark.toml` and `ROUTEMARK__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or a value has the
    /// wrong type.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_sources(Path::new(CONFIG_FILE), true)
    }

    /// Builds the configuration from an optional file and the environment
    ///
    /// # Arguments
    ///
    /// * `file` - Settings file, skipped when it does not exist
    /// * `with_env` - Whether `ROUTEMARK__*` variables are applied on top
    pub fn from_sources(file: &Path, with_env: bool) -> anyhow::Result<Self> {
        let mut builder = ::config::Config::builder().add_source(File::from(file).required(false));

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .list_separator(",")
                    .with_list_parse_key("api.cors_origins")
                    .try_parsing(true),
            );
        }

        let config = builder.build()?.try_deserialize::<Self>()?;
        Ok(config)
    }

    /// Returns the server bind address
    ///
    /// Loopback unless the server is configured as public.
    pub fn bind_address(&self) -> String {
        let host = if self.api.public { "0.0.0.0" } else { "127.0.0.1" };
        format!("{}:{}", host, self.api.port)
    }
}
