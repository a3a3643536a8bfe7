/// JWT authentication gate for routes with `config.auth = true`
///
/// Tokens are HS256-signed and read from the `Authorization: Bearer <token>`
/// header, falling back to the `token` cookie. The verified claims are
/// attached to the request as `AuthUser`.
///
/// `OPTIONS` requests always pass so CORS preflights never need credentials.
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use routemark_api::auth::AuthUser;
///
/// async fn whoami(Extension(user): Extension<AuthUser>) -> String {
///     format!("Hello {}", user.user_id.as_deref().unwrap_or("stranger"))
/// }
/// ```

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::ApiError;

/// Cookie consulted when no Authorization header is sent
pub const TOKEN_COOKIE: &str = "token";

/// Claims checked, in order, for the user id
const USER_ID_CLAIMS: [&str; 4] = ["sub", "userId", "userid", "id"];

/// Error type for token verification
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Neither a bearer token nor a token cookie was sent
    #[error("Missing credentials")]
    MissingCredentials,

    /// Token has expired
    #[error("Token expired")]
    Expired,

    /// Signature, format or claims are invalid
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// Verified identity attached to authenticated requests
#[derive(Debug, Clone, Serialize)]
pub struct AuthUser {
    /// First present claim among `sub`, `userId`, `userid`, `id`
    pub user_id: Option<String>,

    /// Every claim of the verified token
    pub claims: Map<String, Value>,
}

impl AuthUser {
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        let user_id = USER_ID_CLAIMS
            .iter()
            .find_map(|name| claims.get(*name))
            .and_then(|value| match value {
                Value::String(id) => Some(id.clone()),
                Value::Number(id) => Some(id.to_string()),
                _ => None,
            });

        Self { user_id, claims }
    }
}

/// Key material for verifying tokens
#[derive(Clone)]
pub struct AuthSettings {
    key: DecodingKey,
    validation: Validation,
}

impl AuthSettings {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies a token and returns the identity it carries
    pub fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            },
        )?;

        Ok(AuthUser::from_claims(data.claims))
    }
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings").finish_non_exhaustive()
    }
}

/// Finds the request token: bearer header first, then the token cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|token| !token.is_empty())
}

/// Middleware rejecting requests without a valid token
///
/// # Errors
///
/// Returns 401 Unauthorized if the token is missing, expired or invalid.
pub async fn require_auth(
    State(settings): State<Arc<AuthSettings>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let token = extract_token(req.headers()).ok_or(AuthError::MissingCredentials)?;
    let user = settings.verify(&token)?;

    tracing::debug!(user_id = ?user.user_id, path = %req.uri().path(), "Request authenticated");
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
