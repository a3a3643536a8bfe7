/// Route declaration parsing
///
/// A handler module declares its route with a magic comment:
///
/// ```text
/// // POST /teams/create
/// ```
///
/// The whole file is scanned. Exactly one matching line makes the file a
/// handler; zero matches means the file is not a handler; two or more means
/// the file is ambiguous and is excluded (the caller warns).
///
/// # Grammar
///
/// - The line starts with `//` in the first column, followed by optional
///   whitespace
/// - The verb is one of GET, POST, PUT, PATCH, DELETE (any case)
/// - At least one whitespace character separates the verb from the path
/// - The path is the trimmed remainder and must not be empty
///
/// Doc comments (`///`, `//!`) never match since the verb has to follow
/// the slashes directly.
///
/// # Example
///
/// ```
/// use routemark_core::descriptor::{parse_route_declaration, Declaration, Method};
///
/// let declaration = parse_route_declaration("// get //users/\nfn handler() {}\n");
/// let route = declaration.route().unwrap();
/// assert_eq!(route.method, Method::Get);
/// assert_eq!(route.path, "/users");
/// ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP verbs a handler module may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// All declarable verbs
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Patch,
        Method::Delete,
    ];

    /// Parses a verb token, ignoring case
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(token))
    }

    /// Lower-case verb, as emitted in route descriptors
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
            Method::Put => "put",
            Method::Patch => "patch",
            Method::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Patch => write!(f, "PATCH"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Method and normalized path declared by one handler module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Declared verb
    pub method: Method,

    /// Absolute URL path with exactly one leading slash
    pub path: String,
}

impl RouteDescriptor {
    /// Creates a descriptor, normalizing the raw path
    pub fn new(method: Method, raw_path: &str) -> Self {
        Self {
            method,
            path: normalize_path(raw_path),
        }
    }

    /// Dedup key for this descriptor
    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.method, self.path.clone())
    }
}

/// `METHOD PATH` key used to detect colliding declarations
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RouteKey {
    pub method: Method,
    pub path: String,
}

impl RouteKey {
    /// Creates a key from an already-normalized path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Outcome of scanning one module's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// No route comment: the module is not a handler
    None,

    /// Exactly one route comment
    Route(RouteDescriptor),

    /// More than one route comment: the module is excluded
    Ambiguous { count: usize },
}

impl Declaration {
    /// The declared route, if the declaration is unambiguous
    pub fn route(self) -> Option<RouteDescriptor> {
        match self {
            Declaration::Route(descriptor) => Some(descriptor),
            Declaration::None | Declaration::Ambiguous { .. } => None,
        }
    }
}

/// Scans module text for route comments
///
/// Pure function: no I/O, no logging. The caller decides how to report an
/// ambiguous declaration.
pub fn parse_route_declaration(text: &str) -> Declaration {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut found = None;
    let mut count = 0;

    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(descriptor) = match_line(line) {
            count += 1;
            if found.is_none() {
                found = Some(descriptor);
            }
        }
    }

    match (count, found) {
        (1, Some(descriptor)) => Declaration::Route(descriptor),
        (0, _) | (_, None) => Declaration::None,
        (count, Some(_)) => Declaration::Ambiguous { count },
    }
}

/// Normalizes a declared path
///
/// Surrounding whitespace is trimmed, every leading and trailing slash is
/// stripped, and exactly one leading slash is prepended. `//a`, `///a` and
/// `/a/` all become `/a`; a path made only of slashes becomes `/`.
pub fn normalize_path(raw: &str) -> String {
    let trimmed = raw.trim().trim_start_matches('/').trim_end_matches('/');
    format!("/{}", trimmed)
}

fn match_line(line: &str) -> Option<RouteDescriptor> {
    let rest = line.strip_prefix("//")?.trim_start();

    let verb_end = rest.find(char::is_whitespace)?;
    let (verb, remainder) = rest.split_at(verb_end);
    let method = Method::from_token(verb)?;

    let path = remainder.trim();
    if path.is_empty() {
        return None;
    }

    Some(RouteDescriptor::new(method, path))
}
