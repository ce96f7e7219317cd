use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::Value;

/// Sends a chat-completion request and returns the raw text of the first
/// choice. Retries a couple of times when the reply carries no usable text.
pub async fn generate(cfg: &filer_config::LlmProviderConfig, messages: &[Value]) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = auth_headers(cfg)?;

	for _ in 0..3 {
		let body = serde_json::json!({
			"model": cfg.model,
			"temperature": cfg.temperature,
			"messages": messages,
		});
		let res = client.post(&url).headers(headers.clone()).json(&body).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		if let Some(content) = reply_content(&json) {
			return Ok(content.to_string());
		}
	}

	Err(eyre::eyre!("Model reply is missing text content."))
}

fn auth_headers(cfg: &filer_config::LlmProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {}", cfg.api_key).parse()?);

	for (key, value) in &cfg.default_headers {
		let Some(raw) = value.as_str() else {
			return Err(eyre::eyre!("Default header values must be strings."));
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

fn reply_content(json: &Value) -> Option<&str> {
	json.get("choices")
		.and_then(|choices| choices.as_array())
		.and_then(|choices| choices.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
}

/// Models frequently wrap JSON replies in a markdown code fence; strip one
/// fence (with or without a language tag) if present.
pub fn strip_code_fences(raw: &str) -> &str {
	let trimmed = raw.trim();
	let Some(rest) = trimmed.strip_prefix("```") else { return trimmed };
	let rest = rest.strip_prefix("json").or_else(|| rest.strip_prefix("JSON")).unwrap_or(rest);
	let rest = rest.strip_suffix("```").unwrap_or(rest);

	rest.trim()
}

/// Parses a model reply into a JSON object, tolerating code-fence wrapping.
pub fn extract_json(raw: &str) -> Result<Value> {
	let text = strip_code_fences(raw);
	let parsed: Value =
		serde_json::from_str(text).map_err(|_| eyre::eyre!("Reply is not valid JSON."))?;

	if !parsed.is_object() {
		return Err(eyre::eyre!("Reply is not a JSON object."));
	}

	Ok(parsed)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "content": "{\"type\": \"client\"}" } }
			]
		});

		assert_eq!(reply_content(&json), Some("{\"type\": \"client\"}"));
	}

	#[test]
	fn strips_json_fence() {
		assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
		assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
		assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
	}

	#[test]
	fn extract_json_requires_an_object() {
		assert!(extract_json("```json\n{\"type\": \"client\", \"confidence\": 0.9}\n```").is_ok());
		assert!(extract_json("[1, 2]").is_err());
		assert!(extract_json("not json at all").is_err());
	}
}
