use std::{collections::HashMap, fs, path::Path, sync::Mutex};

use color_eyre::eyre;
use serde::Deserialize;

use filer_domain::{ClassificationRule, Client, Condition, Project};
use filer_service::{BoxFuture, NoteCandidate, NoteSource, ReferenceStore, Result};

/// The registry document the API serves reference data from: clients,
/// projects, rules, and the stored-note index, in one JSON file loaded at
/// startup.
#[derive(Debug, Default, Deserialize)]
pub struct RegistryFile {
	#[serde(default)]
	pub clients: Vec<Client>,
	#[serde(default)]
	pub projects: Vec<Project>,
	#[serde(default)]
	pub rules: Vec<ClassificationRule>,
	#[serde(default)]
	pub notes: Vec<NoteCandidate>,
	#[serde(default)]
	pub default_folders: HashMap<String, String>,
}

#[derive(Clone, Copy, Debug, Default)]
struct RuleUsage {
	applied: u64,
	corrected: u64,
}

/// File-backed reference store. Reads are served from the snapshot taken at
/// startup; rule-usage counters live in process memory, so concurrent
/// processes undercount slightly rather than contend.
pub struct RegistryStore {
	registry: RegistryFile,
	usage: Mutex<HashMap<String, RuleUsage>>,
}

impl RegistryStore {
	pub fn load(path: &Path) -> color_eyre::Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| eyre::eyre!("Failed to read registry file at {path:?}: {err}."))?;
		let registry: RegistryFile = serde_json::from_str(&raw)
			.map_err(|err| eyre::eyre!("Failed to parse registry file at {path:?}: {err}."))?;

		validate_rules(&registry.rules)?;

		Ok(Self { registry, usage: Mutex::new(HashMap::new()) })
	}

	pub fn times_applied(&self, rule_id: &str) -> u64 {
		self.usage
			.lock()
			.unwrap_or_else(|err| err.into_inner())
			.get(rule_id)
			.map(|usage| usage.applied)
			.unwrap_or(0)
	}
}

/// Malformed rules are rejected when the registry is loaded, not silently
/// skipped when they are evaluated.
fn validate_rules(rules: &[ClassificationRule]) -> color_eyre::Result<()> {
	for rule in rules {
		for condition in &rule.group.conditions {
			Condition::new(condition.field, condition.operator, condition.value.clone()).map_err(
				|err| eyre::eyre!("Rule {:?} carries an invalid condition: {err}", rule.id),
			)?;
		}
	}

	Ok(())
}

impl ReferenceStore for RegistryStore {
	fn active_clients(&self) -> BoxFuture<'_, Result<Vec<Client>>> {
		let clients: Vec<Client> =
			self.registry.clients.iter().filter(|client| client.is_active()).cloned().collect();

		Box::pin(async move { Ok(clients) })
	}

	fn active_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>> {
		let projects: Vec<Project> = self
			.registry
			.projects
			.iter()
			.filter(|project| project.is_active())
			.cloned()
			.collect();

		Box::pin(async move { Ok(projects) })
	}

	fn active_rules(&self) -> BoxFuture<'_, Result<Vec<ClassificationRule>>> {
		let mut rules: Vec<ClassificationRule> =
			self.registry.rules.iter().filter(|rule| rule.is_active()).cloned().collect();

		rules.sort_by_key(|rule| std::cmp::Reverse(rule.priority));

		Box::pin(async move { Ok(rules) })
	}

	fn increment_rule_stats<'a>(
		&'a self,
		rule_id: &'a str,
		applied: bool,
		corrected: bool,
	) -> BoxFuture<'a, Result<()>> {
		let mut usage = self.usage.lock().unwrap_or_else(|err| err.into_inner());
		let entry = usage.entry(rule_id.to_string()).or_default();

		if applied {
			entry.applied += 1;
		}
		if corrected {
			entry.corrected += 1;
		}

		tracing::debug!(%rule_id, applied = entry.applied, "Recorded rule usage.");

		Box::pin(async { Ok(()) })
	}
}

impl NoteSource for RegistryStore {
	fn stored_candidates(&self) -> BoxFuture<'_, Result<Vec<NoteCandidate>>> {
		let notes = self.registry.notes.clone();

		Box::pin(async move { Ok(notes) })
	}

	fn folder_candidates<'a>(
		&'a self,
		folder_id: &'a str,
	) -> BoxFuture<'a, Result<Vec<NoteCandidate>>> {
		let listing: Vec<NoteCandidate> = self
			.registry
			.notes
			.iter()
			.filter(|note| note.folder_id.as_deref() == Some(folder_id))
			.cloned()
			.collect();

		Box::pin(async move { Ok(listing) })
	}

	fn default_folder_for<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<String>>> {
		let folder = self.registry.default_folders.get(&email.to_lowercase()).cloned();

		Box::pin(async move { Ok(folder) })
	}
}
