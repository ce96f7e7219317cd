use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
	pub service: Service,
	pub org: Org,
	pub providers: Providers,
	pub registry: Registry,
	#[serde(default)]
	pub matching: Matching,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

/// Organization identity. The internal domain separates internal attendees
/// from external ones everywhere in the engine; the note name patterns feed
/// the drive-folder naming-convention bonus.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Org {
	pub domain: String,
	#[serde(default = "default_note_name_patterns")]
	pub note_name_patterns: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Providers {
	pub llm: LlmProviderConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Registry {
	pub path: PathBuf,
}

/// Note-match acceptance tuning. Defaults carry the shipped behavior; they
/// exist as config so an operator can tighten matching without a rebuild.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Matching {
	#[serde(default = "default_stored_accept_threshold")]
	pub stored_accept_threshold: f32,
	#[serde(default = "default_folder_accept_threshold")]
	pub folder_accept_threshold: f32,
	#[serde(default = "default_candidate_floor")]
	pub candidate_floor: f32,
}

impl Default for Matching {
	fn default() -> Self {
		Self {
			stored_accept_threshold: default_stored_accept_threshold(),
			folder_accept_threshold: default_folder_accept_threshold(),
			candidate_floor: default_candidate_floor(),
		}
	}
}

fn default_note_name_patterns() -> Vec<String> {
	vec![
		r"(?i)notes by gemini".to_string(),
		r"(?i)^meeting notes\b".to_string(),
		r"(?i)- notes$".to_string(),
	]
}

fn default_stored_accept_threshold() -> f32 {
	0.5
}

fn default_folder_accept_threshold() -> f32 {
	0.4
}

fn default_candidate_floor() -> f32 {
	0.3
}
