//! Directory intake handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use greencert_core::EntityKind;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::error::ApiError;

#[derive(Debug, Serialize)]
pub struct RegisterEntityResponse {
    pub id: Uuid,
    pub entity: String,
}

fn entity_kind(collection: &str) -> Result<EntityKind, ApiError> {
    match collection {
        "products" => Ok(EntityKind::Product),
        "producers" => Ok(EntityKind::Producer),
        "certifiers" => Ok(EntityKind::Certifier),
        other => Err(ApiError::BadRequest(format!(
            "Unknown directory collection: {}",
            other
        ))),
    }
}

/// Register a product, producer or certifier record
///
/// POST /v1/directory/{collection}
pub async fn register_entity(
    State(state): State<Arc<AppState>>,
    Path(collection): Path<String>,
    Json(record): Json<Value>,
) -> Result<(StatusCode, Json<RegisterEntityResponse>), ApiError> {
    let kind = entity_kind(&collection)?;
    let id = state.directory.register(kind, record)?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterEntityResponse {
            id,
            entity: kind.to_string(),
        }),
    ))
}
