//! Request handlers for the resource routes.
//!
//! Every handler resolves the `{resource}` path segment against the catalog
//! and forwards to the matching collection.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::debug;

use super::error::{ApiError, ApiResult};
use crate::catalog::Catalog;
use crate::record::{Fields, Record};
use crate::store::RecordCollection;

fn collection(catalog: &Catalog, resource: &str) -> ApiResult<Arc<dyn RecordCollection>> {
    catalog
        .by_name(resource)
        .ok_or_else(|| ApiError::UnknownResource(resource.to_string()))
}

/// `GET /{resource}`
pub async fn list_records(
    State(catalog): State<Arc<Catalog>>,
    Path(resource): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    let records = collection(&catalog, &resource)?.list().await?;
    Ok(Json(records))
}

/// `POST /{resource}`
pub async fn create_record(
    State(catalog): State<Arc<Catalog>>,
    Path(resource): Path<String>,
    Json(fields): Json<Fields>,
) -> ApiResult<impl IntoResponse> {
    debug!(resource = %resource, "Processing create request");
    let record = collection(&catalog, &resource)?.create(&fields).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /{resource}/{id}`
pub async fn get_record(
    State(catalog): State<Arc<Catalog>>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let record = collection(&catalog, &resource)?.get(&id).await?;
    Ok(Json(record))
}

/// `PUT /{resource}/{id}`
pub async fn update_record(
    State(catalog): State<Arc<Catalog>>,
    Path((resource, id)): Path<(String, String)>,
    Json(fields): Json<Fields>,
) -> ApiResult<Json<Record>> {
    debug!(resource = %resource, id = %id, "Processing update request");
    let record = collection(&catalog, &resource)?
        .update(&id, &fields)
        .await?;
    Ok(Json(record))
}

/// `DELETE /{resource}/{id}`
pub async fn delete_record(
    State(catalog): State<Arc<Catalog>>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    debug!(resource = %resource, id = %id, "Processing delete request");
    collection(&catalog, &resource)?.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /`
pub async fn liveness() -> &'static str {
    "apae-records is running"
}
