use std::{fs, path::PathBuf, sync::Arc};

use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use filer_api::{routes, state::AppState, store::RegistryStore};
use filer_service::FilerService;
use filer_testkit::{ScriptedGenerator, test_config};

fn write_registry(name: &str) -> PathBuf {
	let registry = serde_json::json!({
		"clients": [
			{
				"id": "acme",
				"name": "Acme Corp",
				"domains": ["acme.com"],
				"keywords": ["acme"],
				"status": "active",
			}
		],
		"projects": [
			{
				"id": "platform",
				"client_id": "acme",
				"name": "Data Platform",
				"keywords": ["data platform"],
				"status": "active",
			}
		],
		"rules": [],
		"notes": [
			{
				"file_id": "doc-1",
				"name": "Weekly Sync - Acme Data Platform",
				"url": "https://docs.google.com/document/d/doc-1",
				"attendee_emails": ["alice@egen.com", "john@acme.com"],
				"organizer": "alice@egen.com",
			}
		],
	});
	let path = std::env::temp_dir().join(format!("filer-registry-{name}-{}.json", std::process::id()));

	fs::write(&path, registry.to_string()).expect("failed to write registry fixture");

	path
}

fn app(name: &str) -> axum::Router {
	let mut config = test_config();

	config.registry.path = write_registry(name);

	let store = Arc::new(RegistryStore::load(&config.registry.path).expect("registry must load"));
	let service = FilerService::with_generator(
		config,
		store.clone(),
		store,
		Arc::new(ScriptedGenerator::unavailable("model offline")),
	);

	routes::router(AppState { service: Arc::new(service) })
}

async fn response_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX).await.expect("body read");

	serde_json::from_slice(&bytes).expect("body must be JSON")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("request build")
}

#[tokio::test]
async fn health_returns_ok() {
	let response = app("health")
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.unwrap();

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn blank_title_is_rejected_with_a_json_error() {
	let payload = serde_json::json!({ "meeting": { "title": "   " } });
	let response = app("blank-title").oneshot(post_json("/v1/classify", &payload)).await.unwrap();

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = response_json(response).await;

	assert_eq!(json["error_code"], "invalid_request");
	assert!(json["message"].as_str().unwrap_or("").contains("title"));
}

#[tokio::test]
async fn classify_round_trips_the_wire_shape() {
	let payload = serde_json::json!({
		"meeting": {
			"title": "Weekly Sync - Acme Data Platform",
			"organizer": "alice@egen.com",
			"attendees": [
				{ "email": "alice@egen.com" },
				{ "email": "bob@egen.com" },
				{ "email": "john@acme.com" },
			],
		},
	});
	let response = app("classify").oneshot(post_json("/v1/classify", &payload)).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["classification"]["type"], "client");
	assert_eq!(json["classification"]["client"]["name"], "Acme Corp");
	assert_eq!(json["classification"]["project"]["name"], "Data Platform");
	assert_eq!(json["classification_method"], "rule_based");
	assert_eq!(json["auto_apply"], true);
	assert_eq!(
		json["suggested_actions"]["folder_path"],
		"Meeting Notes/Clients/Acme Corp/Data Platform"
	);
}

#[tokio::test]
async fn note_match_prefers_the_description_link() {
	let payload = serde_json::json!({
		"meeting": {
			"title": "Weekly Sync",
			"description": "Notes live at https://docs.google.com/document/d/abc-123/edit",
			"attendees": [{ "email": "alice@egen.com" }],
		},
	});
	let response =
		app("note-match-link").oneshot(post_json("/v1/notes/match", &payload)).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["found"], true);
	assert_eq!(json["source"], "calendar_link");
	assert_eq!(json["driveFileId"], "abc-123");
	assert_eq!(json["matchScore"], 1.0);
}

#[tokio::test]
async fn note_match_finds_the_stored_candidate() {
	let payload = serde_json::json!({
		"meeting": {
			"title": "Weekly Sync - Acme Data Platform",
			"organizer": "alice@egen.com",
			"attendees": [
				{ "email": "alice@egen.com" },
				{ "email": "john@acme.com" },
			],
		},
	});
	let response =
		app("note-match-stored").oneshot(post_json("/v1/notes/match", &payload)).await.unwrap();

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["found"], true);
	assert_eq!(json["source"], "firestore");
	assert_eq!(json["driveFileName"], "Weekly Sync - Acme Data Platform");
}
