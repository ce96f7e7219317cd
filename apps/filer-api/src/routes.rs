use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;
use filer_service::{
	ClassifyRequest, ClassifyResponse, Error as ServiceError, NoteMatchRequest, NoteMatchResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/classify", post(classify))
		.route("/v1/notes/match", post(match_note))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn classify(
	State(state): State<AppState>,
	Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
	let response = state.service.classify(payload).await?;

	Ok(Json(response))
}

async fn match_note(
	State(state): State<AppState>,
	Json(payload): Json<NoteMatchRequest>,
) -> Result<Json<NoteMatchResponse>, ApiError> {
	let response = state.service.match_note(payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match &err {
			ServiceError::InvalidRequest { .. } =>
				Self::new(StatusCode::BAD_REQUEST, "invalid_request", err.to_string()),
			ServiceError::Store { .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"store_unavailable",
				err.to_string(),
			),
			ServiceError::NoteSource { .. } => Self::new(
				StatusCode::INTERNAL_SERVER_ERROR,
				"note_source_unavailable",
				err.to_string(),
			),
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
