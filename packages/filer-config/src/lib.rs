mod error;
mod types;

pub use error::{Error, Result};
pub use types::{Config, LlmProviderConfig, Matching, Org, Providers, Registry, Service};

use std::{fs, path::Path};

use regex::Regex;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.org.domain.trim().is_empty() {
		return Err(Error::Validation { message: "org.domain must be non-empty.".to_string() });
	}
	if cfg.org.domain.contains('@') {
		return Err(Error::Validation {
			message: "org.domain must be a bare domain, not an email address.".to_string(),
		});
	}

	for pattern in &cfg.org.note_name_patterns {
		if Regex::new(pattern).is_err() {
			return Err(Error::Validation {
				message: format!("org.note_name_patterns entry {pattern:?} is not a valid regex."),
			});
		}
	}

	let llm = &cfg.providers.llm;

	if llm.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.llm.api_key must be non-empty.".to_string(),
		});
	}
	if llm.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.llm.api_base must be non-empty.".to_string(),
		});
	}
	if llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !llm.temperature.is_finite() || !(0.0..=2.0).contains(&llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, value) in [
		("matching.stored_accept_threshold", cfg.matching.stored_accept_threshold),
		("matching.folder_accept_threshold", cfg.matching.folder_accept_threshold),
		("matching.candidate_floor", cfg.matching.candidate_floor),
	] {
		if !value.is_finite() || !(0.0..=1.0).contains(&value) {
			return Err(Error::Validation {
				message: format!("{label} must be in the range 0.0-1.0."),
			});
		}
	}

	if cfg.matching.candidate_floor > cfg.matching.stored_accept_threshold
		|| cfg.matching.candidate_floor > cfg.matching.folder_accept_threshold
	{
		return Err(Error::Validation {
			message: "matching.candidate_floor must not exceed the acceptance thresholds."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.org.domain = cfg.org.domain.trim().to_ascii_lowercase();
	cfg.org.note_name_patterns.retain(|pattern| !pattern.trim().is_empty());
}
