// GET /whoami

//! Returns the identity carried by the caller's token

use axum::{extract::Request, Json};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};

pub async fn handler(req: Request) -> ApiResult<Json<AuthUser>> {
    req.extensions()
        .get::<AuthUser>()
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("Missing credentials".to_string()))
}
