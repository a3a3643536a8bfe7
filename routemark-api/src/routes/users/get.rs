// GET /users/:id

//! Looks up a user from the built-in directory

use axum::{
    extract::{Path, Request},
    Json, RequestExt,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

const DIRECTORY: [(&str, &str); 2] = [("1", "Ada Lovelace"), ("2", "Grace Hopper")];

pub async fn handler(mut req: Request) -> ApiResult<Json<User>> {
    let Path(id) = req
        .extract_parts::<Path<String>>()
        .await
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

    DIRECTORY
        .iter()
        .find(|(user_id, _)| *user_id == id)
        .map(|(user_id, name)| {
            Json(User {
                id: user_id.to_string(),
                name: name.to_string(),
            })
        })
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
}
