// POST /hello

//! Greeting endpoint
//!
//! # Request
//!
//! ```json
//! { "name": "Ada" }
//! ```
//!
//! # Response
//!
//! ```json
//! { "message": "Hello Ada" }
//! ```

use axum::{extract::Request, Json, RequestExt};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Deserialize)]
pub struct HelloRequest {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

pub async fn handler(req: Request) -> ApiResult<Json<HelloResponse>> {
    let Json(body) = req
        .extract::<Json<HelloRequest>, _>()
        .await
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }

    Ok(Json(HelloResponse {
        message: format!("Hello {}", name),
    }))
}
