//! In-memory collaborators and fixture builders for exercising the
//! classification and note-match services without external stores or a live
//! model endpoint.

use std::{
	collections::{HashMap, VecDeque},
	sync::Mutex,
};

use color_eyre::eyre;
use serde_json::{Map, Value};

use filer_config::{Config, LlmProviderConfig, Matching, Org, Providers, Registry, Service};
use filer_domain::{
	Attendee, ClassificationRule, Client, Condition, ConditionField, ConditionGroup,
	ConditionOperator, ConditionValue, EntityStatus, GroupCombinator, Meeting, Project, RuleAction,
	RuleStats, RuleStatus,
};
use filer_service::{BoxFuture, Error, GenerateProvider, NoteCandidate, NoteSource, ReferenceStore};

/// Reference data served straight from memory. Rules are handed out sorted by
/// priority descending, matching the store contract.
#[derive(Default)]
pub struct MemoryStore {
	pub clients: Vec<Client>,
	pub projects: Vec<Project>,
	pub rules: Vec<ClassificationRule>,
	pub fail_reads: bool,
	applied: Mutex<HashMap<String, u64>>,
}

impl MemoryStore {
	pub fn new(
		clients: Vec<Client>,
		projects: Vec<Project>,
		rules: Vec<ClassificationRule>,
	) -> Self {
		Self { clients, projects, rules, fail_reads: false, applied: Mutex::new(HashMap::new()) }
	}

	pub fn applied_count(&self, rule_id: &str) -> u64 {
		self.applied.lock().unwrap_or_else(|err| err.into_inner()).get(rule_id).copied().unwrap_or(0)
	}

	fn guard<T>(&self, value: T) -> Result<T, Error> {
		if self.fail_reads {
			return Err(Error::Store { message: "reference store unavailable".to_string() });
		}

		Ok(value)
	}
}

impl ReferenceStore for MemoryStore {
	fn active_clients(&self) -> BoxFuture<'_, Result<Vec<Client>, Error>> {
		let result = self.guard(
			self.clients.iter().filter(|client| client.is_active()).cloned().collect(),
		);

		Box::pin(async move { result })
	}

	fn active_projects(&self) -> BoxFuture<'_, Result<Vec<Project>, Error>> {
		let result = self.guard(
			self.projects.iter().filter(|project| project.is_active()).cloned().collect(),
		);

		Box::pin(async move { result })
	}

	fn active_rules(&self) -> BoxFuture<'_, Result<Vec<ClassificationRule>, Error>> {
		let result = self.guard({
			let mut rules: Vec<ClassificationRule> =
				self.rules.iter().filter(|rule| rule.is_active()).cloned().collect();

			rules.sort_by_key(|rule| std::cmp::Reverse(rule.priority));

			rules
		});

		Box::pin(async move { result })
	}

	fn increment_rule_stats<'a>(
		&'a self,
		rule_id: &'a str,
		applied: bool,
		_corrected: bool,
	) -> BoxFuture<'a, Result<(), Error>> {
		if applied {
			*self
				.applied
				.lock()
				.unwrap_or_else(|err| err.into_inner())
				.entry(rule_id.to_string())
				.or_insert(0) += 1;
		}

		Box::pin(async { Ok(()) })
	}
}

/// Stored-note index and folder listings served from memory.
#[derive(Default)]
pub struct MemoryNotes {
	pub stored: Vec<NoteCandidate>,
	pub folders: HashMap<String, Vec<NoteCandidate>>,
	pub default_folders: HashMap<String, String>,
}

impl NoteSource for MemoryNotes {
	fn stored_candidates(&self) -> BoxFuture<'_, Result<Vec<NoteCandidate>, Error>> {
		let stored = self.stored.clone();

		Box::pin(async move { Ok(stored) })
	}

	fn folder_candidates<'a>(
		&'a self,
		folder_id: &'a str,
	) -> BoxFuture<'a, Result<Vec<NoteCandidate>, Error>> {
		let listing = self.folders.get(folder_id).cloned().unwrap_or_default();

		Box::pin(async move { Ok(listing) })
	}

	fn default_folder_for<'a>(
		&'a self,
		email: &'a str,
	) -> BoxFuture<'a, Result<Option<String>, Error>> {
		let folder = self.default_folders.get(&email.to_lowercase()).cloned();

		Box::pin(async move { Ok(folder) })
	}
}

/// A generator that replays scripted replies in order. An exhausted script
/// fails, which is also the easiest way to force the rule-based fallback.
#[derive(Default)]
pub struct ScriptedGenerator {
	replies: Mutex<VecDeque<Result<String, String>>>,
}

impl ScriptedGenerator {
	pub fn replying(replies: Vec<Result<String, String>>) -> Self {
		Self { replies: Mutex::new(replies.into_iter().collect()) }
	}

	/// A generator whose every call fails, forcing the fallback path.
	pub fn unavailable(reason: &str) -> Self {
		Self::replying(vec![Err(reason.to_string())])
	}
}

impl GenerateProvider for ScriptedGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		let next = self.replies.lock().unwrap_or_else(|err| err.into_inner()).pop_front();

		Box::pin(async move {
			match next {
				Some(Ok(reply)) => Ok(reply),
				Some(Err(reason)) => Err(eyre::eyre!(reason)),
				None => Err(eyre::eyre!("scripted generator is exhausted")),
			}
		})
	}
}

pub fn test_config() -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		org: Org {
			domain: "egen.com".to_string(),
			note_name_patterns: vec![
				r"(?i)notes by gemini".to_string(),
				r"(?i)^meeting notes\b".to_string(),
			],
		},
		providers: Providers {
			llm: LlmProviderConfig {
				provider_id: "gemini".to_string(),
				api_base: "http://localhost".to_string(),
				api_key: "key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "gemini-pro".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		registry: Registry { path: "registry.json".into() },
		matching: Matching::default(),
	}
}

pub fn meeting(title: &str, attendees: &[&str]) -> Meeting {
	Meeting {
		title: title.to_string(),
		description: None,
		organizer: attendees.first().map(|email| email.to_string()),
		attendees: attendees
			.iter()
			.map(|email| Attendee { email: email.to_string(), name: None })
			.collect(),
		start_time: None,
		end_time: None,
	}
}

pub fn client(id: &str, name: &str, domains: &[&str], keywords: &[&str]) -> Client {
	Client {
		id: id.to_string(),
		name: name.to_string(),
		domains: domains.iter().map(|domain| domain.to_string()).collect(),
		keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
		status: EntityStatus::Active,
	}
}

pub fn project(id: &str, client_id: &str, name: &str, keywords: &[&str]) -> Project {
	Project {
		id: id.to_string(),
		client_id: client_id.to_string(),
		name: name.to_string(),
		keywords: keywords.iter().map(|keyword| keyword.to_string()).collect(),
		status: EntityStatus::Active,
	}
}

pub fn title_contains_rule(id: &str, priority: i64, term: &str) -> ClassificationRule {
	ClassificationRule {
		id: id.to_string(),
		name: id.to_string(),
		priority,
		group: ConditionGroup {
			combinator: GroupCombinator::And,
			conditions: vec![
				Condition::new(
					ConditionField::Title,
					ConditionOperator::Contains,
					ConditionValue::One(term.to_string()),
				)
				.expect("fixture condition must be valid"),
			],
		},
		action: RuleAction::default(),
		confidence_boost: 0.0,
		status: RuleStatus::Active,
		stats: RuleStats::default(),
	}
}
