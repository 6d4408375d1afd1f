//! One set of CRUD handlers shared by every [`Resource`].
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use mongodb::bson;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    error::AppError,
    models::{validation_message, Resource, Stored},
    routes::common::{data_response, data_response_with_status, path_object_id, ApiResult},
    state::AppState,
};

/// Insert acknowledgment, keyed the way clients of the old service read it.
#[derive(Debug, Serialize)]
pub struct InsertAck {
    #[serde(rename = "InsertedID")]
    pub inserted_id: String,
}

/// Unwrap the JSON body and run the required-field rules on it.
fn validated<R: Resource>(body: Result<Json<R>, JsonRejection>) -> Result<R, AppError> {
    let Json(record) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;
    record
        .validate()
        .map_err(|e| AppError::BadRequest(validation_message(&e)))?;
    Ok(record)
}

fn decode<R: Resource>(doc: bson::Document) -> Result<Stored<R>, AppError> {
    Stored::from_document(doc)
        .map_err(|e| AppError::Internal(format!("failed to decode {}: {e}", R::NAME)))
}

async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Result<Json<R>, JsonRejection>,
) -> ApiResult {
    let record = validated(body)?;
    let doc = bson::to_document(&record).map_err(|e| AppError::Internal(e.to_string()))?;

    let id = state.store.insert_one(R::COLLECTION, doc).await?;
    info!("{}: inserted {id}", R::COLLECTION);

    Ok(data_response_with_status(
        StatusCode::CREATED,
        InsertAck {
            inserted_id: id.to_hex(),
        },
    ))
}

async fn get_one<R: Resource>(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> ApiResult {
    let oid = path_object_id(path)?;

    let Some(doc) = state.store.find_one(R::COLLECTION, oid).await? else {
        return Err(AppError::NotFound(format!(
            "{} with specified ID not found!",
            R::NAME
        )));
    };

    Ok(data_response(decode::<R>(doc)?))
}

async fn get_all<R: Resource>(State(state): State<AppState>) -> ApiResult {
    let docs = state.store.find_all(R::COLLECTION).await?;

    // one bad document fails the whole listing
    let records = docs
        .into_iter()
        .map(decode::<R>)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("{}: returning {} records", R::COLLECTION, records.len());

    Ok(data_response(records))
}

async fn update<R: Resource>(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<R>, JsonRejection>,
) -> ApiResult {
    let oid = path_object_id(path)?;
    let record = validated(body)?;
    let set = record
        .update_document()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let updated = state
        .store
        .find_one_and_update(R::COLLECTION, oid, set)
        .await?;

    // no match still answers 200, with an empty record
    let stored = match updated {
        Some(doc) => decode::<R>(doc)?,
        None => {
            debug!("{}: update matched nothing for {oid}", R::COLLECTION);
            Stored::empty()
        }
    };

    Ok(data_response(stored))
}

async fn delete<R: Resource>(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> ApiResult {
    let oid = path_object_id(path)?;

    let deleted = state.store.delete_one(R::COLLECTION, oid).await?;
    if deleted < 1 {
        return Err(AppError::NotFound(format!(
            "{} with specified ID not found!",
            R::NAME
        )));
    }
    info!("{}: deleted {oid}", R::COLLECTION);

    Ok(data_response(format!("{} successfully deleted!", R::NAME)))
}

/// `POST /item`, `GET|PUT|DELETE /item/{id}` and `GET /list` for `R`.
pub fn resource_router<R: Resource>() -> Router<AppState> {
    Router::new()
        .route(R::ITEM_PATH, post(create::<R>))
        .route(
            &format!("{}/{{id}}", R::ITEM_PATH),
            get(get_one::<R>).put(update::<R>).delete(delete::<R>),
        )
        .route(R::LIST_PATH, get(get_all::<R>))
}
