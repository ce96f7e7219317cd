use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{FilerService, Result, ai, validate_meeting};
use filer_domain::{
	ClassificationMethod, ClassificationRule, ClassificationType, Client, Meeting, Project,
	folder::suggested_folder_path,
	matcher::{self, ClientMatch},
	rule::select_rule_matching,
	scoring::{self, ScoreSignals},
	team::detect_internal_team,
};

pub const DEFAULT_SHARE_PERMISSION: &str = "writer";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifyRequest {
	pub meeting: Meeting,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub note_file_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
	pub id: String,
	pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Classification {
	pub r#type: ClassificationType,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client: Option<EntityRef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub project: Option<EntityRef>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub internal_team: Option<String>,
	pub confidence: f32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub matched_rule_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub ai_reasoning: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShareTarget {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub role: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestedActions {
	pub folder_path: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub folder_id: Option<String>,
	pub share_with: Vec<ShareTarget>,
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AutoShare {
	pub emails: Vec<String>,
	pub permission: String,
	pub triggered_by_rule: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
	pub classification: Classification,
	pub suggested_actions: SuggestedActions,
	pub auto_apply: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub auto_share: Option<AutoShare>,
	pub classification_method: ClassificationMethod,
}

impl FilerService {
	/// Classifies a meeting: the AI strategy first, the deterministic
	/// rule/domain/keyword path when it fails. Only reference-data failures
	/// and malformed input surface as errors.
	pub async fn classify(&self, req: ClassifyRequest) -> Result<ClassifyResponse> {
		validate_meeting(&req.meeting)?;

		let meeting = &req.meeting;
		let (clients, projects, rules) = tokio::try_join!(
			self.store.active_clients(),
			self.store.active_projects(),
			self.store.active_rules(),
		)?;
		let org_domain = self.cfg.org.domain.as_str();
		let attendee_domains = meeting.attendee_domains();
		let external_domains = meeting.external_domains(org_domain);
		let all_internal = meeting.all_internal(org_domain);

		let (classification, method, matched_rule) =
			match ai::classify_with_ai(self, meeting, &clients, &projects, &attendee_domains).await
			{
				ai::AiAttempt::Classified(classification) => {
					tracing::debug!(
						confidence = classification.confidence,
						"Adopted AI classification."
					);

					(classification, ClassificationMethod::GeminiAi, None)
				},
				ai::AiAttempt::Unavailable { reason } => {
					tracing::warn!(%reason, "AI classification unavailable; using rule-based fallback.");

					let (classification, rule) = rule_based_classification(RulePath {
						meeting,
						clients: &clients,
						projects: &projects,
						rules: &rules,
						attendee_domains: &attendee_domains,
						external_domains: &external_domains,
						all_internal,
						ai_failure: &reason,
					});

					(classification, ClassificationMethod::RuleBased, rule)
				},
			};

		let auto_apply = scoring::auto_apply(classification.confidence);
		let mut share_with = Vec::new();
		let mut seen = HashSet::new();

		for attendee in meeting.internal_attendees(org_domain) {
			if seen.insert(attendee.email.to_lowercase()) {
				share_with.push(ShareTarget {
					email: attendee.email.clone(),
					role: None,
					name: attendee.name.clone(),
				});
			}
		}

		let mut auto_share = None;

		if auto_apply
			&& let Some(rule) = select_rule_matching(&rules, meeting, &attendee_domains, |rule| {
				!rule.action.share_with.is_empty()
			}) {
			let permission = rule
				.action
				.share_permission
				.clone()
				.unwrap_or_else(|| DEFAULT_SHARE_PERMISSION.to_string());
			let mut appended = Vec::new();

			for email in &rule.action.share_with {
				if seen.insert(email.to_lowercase()) {
					appended.push(email.clone());
					share_with.push(ShareTarget {
						email: email.clone(),
						role: Some(permission.clone()),
						name: None,
					});
				}
			}

			auto_share = Some(AutoShare {
				emails: appended,
				permission,
				triggered_by_rule: rule.id.clone(),
			});
		}

		let suggested_actions = build_suggested_actions(&classification, matched_rule, share_with);

		let mut used_rules: Vec<&str> = Vec::new();

		if let Some(rule) = matched_rule {
			used_rules.push(rule.id.as_str());
		}
		if let Some(auto_share) = auto_share.as_ref()
			&& !used_rules.contains(&auto_share.triggered_by_rule.as_str())
		{
			used_rules.push(auto_share.triggered_by_rule.as_str());
		}
		for rule_id in used_rules {
			if let Err(err) = self.store.increment_rule_stats(rule_id, true, false).await {
				tracing::warn!(%rule_id, %err, "Failed to record rule usage.");
			}
		}

		Ok(ClassifyResponse {
			classification,
			suggested_actions,
			auto_apply,
			auto_share,
			classification_method: method,
		})
	}
}

struct RulePath<'a, 'b> {
	meeting: &'b Meeting,
	clients: &'a [Client],
	projects: &'a [Project],
	rules: &'a [ClassificationRule],
	attendee_domains: &'b [String],
	external_domains: &'b [String],
	all_internal: bool,
	ai_failure: &'b str,
}

/// The deterministic strategy: first-match rule selection pre-seeds the
/// outcome, then domain matching (outranking keyword matching) fills in the
/// client, then the remaining type fallbacks run. Guaranteed to succeed.
fn rule_based_classification<'a>(
	path: RulePath<'a, '_>,
) -> (Classification, Option<&'a ClassificationRule>) {
	let RulePath {
		meeting,
		clients,
		projects,
		rules,
		attendee_domains,
		external_domains,
		all_internal,
		ai_failure,
	} = path;
	let matched_rule = select_rule_matching(rules, meeting, attendee_domains, |_| true);

	let mut forced_type = None;
	let mut client: Option<&Client> = None;
	let mut project: Option<&Project> = None;
	let mut internal_team = None;
	let mut client_match = None;
	let mut project_match = None;

	if let Some(rule) = matched_rule {
		forced_type = rule.action.classify_as;
		internal_team = rule.action.internal_team.clone();

		if let Some(id) = rule.action.client_id.as_deref() {
			client = clients.iter().find(|candidate| candidate.id == id);
		}
		if let Some(id) = rule.action.project_id.as_deref() {
			project = projects.iter().find(|candidate| candidate.id == id);

			match (client, project) {
				// A project implies its owning client; an inconsistent pair
				// drops the project.
				(Some(owner), Some(found)) if found.client_id != owner.id => project = None,
				(None, Some(found)) => {
					client = clients.iter().find(|candidate| candidate.id == found.client_id);

					if client.is_none() {
						project = None;
					}
				},
				_ => {},
			}
		}
	}

	if client.is_none() {
		if let Some(found) = matcher::find_client_by_domain(external_domains, clients) {
			client = Some(found);
			client_match = Some(ClientMatch::Domain);
		} else if let Some(found) = matcher::find_client_by_keyword(&meeting.title, clients) {
			client = Some(found);
			client_match = Some(ClientMatch::Keyword);
		}
	}
	if project.is_none()
		&& let Some(found) = client
		&& let Some((resolved, how)) = matcher::resolve_project(
			found,
			&meeting.title,
			meeting.description.as_deref(),
			projects,
		) {
		project = Some(resolved);
		project_match = Some(how);
	}

	let final_type = forced_type.unwrap_or(if client.is_some() {
		ClassificationType::Client
	} else if all_internal {
		ClassificationType::Internal
	} else if !external_domains.is_empty() {
		ClassificationType::External
	} else {
		ClassificationType::Uncategorized
	});

	if final_type == ClassificationType::Internal && internal_team.is_none() {
		internal_team = detect_internal_team(&meeting.title).map(str::to_string);
	}

	let confidence = scoring::score(ScoreSignals {
		client_match,
		project_match,
		rule_boost: matched_rule.map(|rule| rule.confidence_boost),
		resolved_internal: final_type == ClassificationType::Internal,
	});

	(
		Classification {
			r#type: final_type,
			client: client.map(|client| EntityRef {
				id: client.id.clone(),
				name: client.name.clone(),
			}),
			project: project.map(|project| EntityRef {
				id: project.id.clone(),
				name: project.name.clone(),
			}),
			internal_team,
			confidence,
			matched_rule_id: matched_rule.map(|rule| rule.id.clone()),
			ai_reasoning: Some(format!(
				"AI classification unavailable ({ai_failure}); used rule-based fallback."
			)),
		},
		matched_rule,
	)
}

fn build_suggested_actions(
	classification: &Classification,
	matched_rule: Option<&ClassificationRule>,
	share_with: Vec<ShareTarget>,
) -> SuggestedActions {
	let folder_path = matched_rule
		.and_then(|rule| rule.action.folder_path.clone())
		.unwrap_or_else(|| {
			suggested_folder_path(
				classification.r#type,
				classification.client.as_ref().map(|client| client.name.as_str()),
				classification.project.as_ref().map(|project| project.name.as_str()),
				classification.internal_team.as_deref(),
			)
		});
	let tags = matched_rule.map(|rule| rule.action.tags.clone()).unwrap_or_default();

	SuggestedActions { folder_path, folder_id: None, share_with, tags }
}
