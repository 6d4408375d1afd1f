use axum::{
    extract::{rejection::PathRejection, Path},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde_json::json;

use crate::error::AppError;

pub type ApiResult = Result<Response, AppError>;

/// Wrap a payload in the envelope every endpoint answers with:
/// `{"status": .., "message": .., "data": {"data": ..}}`.
pub fn envelope<T: Serialize>(status: StatusCode, message: &str, payload: T) -> Response {
    let body = json!({
        "status": status.as_u16(),
        "message": message,
        "data": { "data": payload },
    });
    (status, Json(body)).into_response()
}

pub fn data_response<T: Serialize>(payload: T) -> Response {
    envelope(StatusCode::OK, "success", payload)
}

pub fn data_response_with_status<T: Serialize>(status: StatusCode, payload: T) -> Response {
    envelope(status, "success", payload)
}

/// Ids are 24-char hex ObjectIds; anything else is rejected up front.
pub fn parse_object_id(id: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest(format!("invalid id: {id:?}")))
}

/// Pull the `{id}` segment out of the path and parse it.
pub fn path_object_id(path: Result<Path<String>, PathRejection>) -> Result<ObjectId, AppError> {
    let Path(id) = path.map_err(|e| AppError::BadRequest(e.body_text()))?;
    parse_object_id(&id)
}

pub async fn not_found() -> AppError {
    AppError::NotFound("route not found".to_string())
}

pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::MethodNotAllowed(format!("method {method} not allowed on this route"))
}
