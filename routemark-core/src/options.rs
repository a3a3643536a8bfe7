/// Route options / validation schema split
///
/// A raw schema export mixes two things: transport-level route options
/// (hooks, limits, timeouts...) and the validation schema proper. Keys on
/// the allow-list go to `RouteOptions`, everything else goes to
/// `ValidationSchema`. No key ends up on both sides and none is dropped.
///
/// On top of the partition one shorthand is translated: a top-level `auth`
/// field is removed and written to `config.auth` as a strict boolean. It is
/// applied after the partition, so it overrides an `auth` the author set
/// inside `config` directly.
///
/// # Example
///
/// ```
/// use routemark_core::options::split_schema_export;
/// use serde_json::json;
///
/// let raw = json!({
///     "auth": 1,
///     "bodyLimit": 1024,
///     "body": { "type": "object" }
/// });
///
/// let (options, schema) = split_schema_export(raw.as_object().unwrap().clone());
/// assert_eq!(options.auth(), Some(true));
/// assert_eq!(options.body_limit(), Some(1024));
/// assert!(schema.contains_key("body"));
/// assert!(!schema.contains_key("auth"));
/// ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

use crate::schema::RawSchemaExport;

/// Keys recognised as route options
pub const ROUTE_OPTION_KEYS: [&str; 14] = [
    "config",
    "preHandler",
    "onRequest",
    "preValidation",
    "preSerialization",
    "errorHandler",
    "logLevel",
    "bodyLimit",
    "attachValidation",
    "exposeHeadRoute",
    "constraints",
    "timeout",
    "websocket",
    "prefixTrailingSlash",
];

/// Shorthand key translated into `config.auth`
pub const AUTH_KEY: &str = "auth";

/// Route option key holding free-form per-route configuration
pub const CONFIG_KEY: &str = "config";

/// Whether a key belongs to the route options side
pub fn is_route_option(key: &str) -> bool {
    ROUTE_OPTION_KEYS.contains(&key)
}

/// Transport-level registration parameters of one route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteOptions(Map<String, Value>);

impl RouteOptions {
    /// Raw option value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether an option is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Option keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `config` option, when it is an object
    pub fn config(&self) -> Option<&Map<String, Value>> {
        self.0.get(CONFIG_KEY)?.as_object()
    }

    /// `config.auth`, when it is a boolean
    pub fn auth(&self) -> Option<bool> {
        self.config()?.get(AUTH_KEY)?.as_bool()
    }

    /// Whether `config.auth` is set to any truthy value
    ///
    /// Only the shorthand is normalised to a boolean; an `auth` written
    /// inside `config` directly is kept as the author wrote it.
    pub fn requires_auth(&self) -> bool {
        self.config()
            .and_then(|config| config.get(AUTH_KEY))
            .is_some_and(is_truthy)
    }

    /// `bodyLimit` in bytes
    pub fn body_limit(&self) -> Option<usize> {
        self.0
            .get("bodyLimit")?
            .as_u64()
            .and_then(|limit| usize::try_from(limit).ok())
    }

    /// `timeout`, given in milliseconds
    pub fn timeout(&self) -> Option<Duration> {
        self.0.get("timeout")?.as_u64().map(Duration::from_millis)
    }

    /// Writes `config.auth` from the `auth` shorthand
    ///
    /// The value is coerced to a boolean by truthiness. A `config` that is
    /// not an object is replaced.
    pub fn apply_auth_shorthand(&mut self, auth: &Value) {
        let config = self
            .0
            .entry(CONFIG_KEY)
            .or_insert_with(|| Value::Object(Map::new()));

        if !config.is_object() {
            *config = Value::Object(Map::new());
        }

        if let Value::Object(fields) = config {
            fields.insert(AUTH_KEY.to_string(), Value::Bool(is_truthy(auth)));
        }
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Validation schema of one route, passed through untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationSchema(Map<String, Value>);

impl ValidationSchema {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The schema as a JSON object value
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

/// Partitions a raw export by allow-list membership only
pub fn partition(raw: RawSchemaExport) -> (RouteOptions, ValidationSchema) {
    let mut options = Map::new();
    let mut schema = Map::new();

    for (key, value) in raw {
        if is_route_option(&key) {
            options.insert(key, value);
        } else {
            schema.insert(key, value);
        }
    }

    (RouteOptions(options), ValidationSchema(schema))
}

/// Splits a raw export and applies the `auth` shorthand
pub fn split_schema_export(mut raw: RawSchemaExport) -> (RouteOptions, ValidationSchema) {
    let auth = raw.remove(AUTH_KEY);
    let (mut options, schema) = partition(raw);

    if let Some(auth) = auth {
        options.apply_auth_shorthand(&auth);
    }

    (options, schema)
}

/// Loose truthiness: `false`, `null`, `0`, `NaN` and `""` are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
