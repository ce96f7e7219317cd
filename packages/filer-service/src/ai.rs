use serde_json::Value;

use crate::{
	FilerService,
	classify::{Classification, EntityRef},
};
use filer_domain::{ClassificationType, Client, Meeting, Project, scoring};

const SYSTEM_PROMPT: &str = "\
You classify business meetings for a meeting-notes organizer. Reply with a \
single JSON object and nothing else, using exactly these fields: type (one of \
client, internal, external, personal, uncategorized), client_id, client_name, \
project_id, project_name, internal_team, confidence (a number between 0 and \
1), reasoning. Prefer ids from the provided known clients and projects; use \
null for anything you are not sure about.";

/// Outcome of the AI strategy. `Unavailable` is a signal to fall back, never
/// an error: the reason is kept for the response's diagnostic field.
pub(crate) enum AiAttempt {
	Classified(Classification),
	Unavailable { reason: String },
}

pub(crate) async fn classify_with_ai(
	service: &FilerService,
	meeting: &Meeting,
	clients: &[Client],
	projects: &[Project],
	attendee_domains: &[String],
) -> AiAttempt {
	let messages = build_messages(meeting, clients, projects, attendee_domains);
	let raw = match service.generator.generate(&service.cfg.providers.llm, &messages).await {
		Ok(raw) => raw,
		Err(err) => return AiAttempt::Unavailable { reason: err.to_string() },
	};
	let parsed = match filer_providers::extract_json(&raw) {
		Ok(parsed) => parsed,
		Err(err) => return AiAttempt::Unavailable { reason: err.to_string() },
	};

	parse_reply(&parsed, clients, projects)
}

fn build_messages(
	meeting: &Meeting,
	clients: &[Client],
	projects: &[Project],
	attendee_domains: &[String],
) -> Vec<Value> {
	let known_clients: Vec<Value> = clients
		.iter()
		.map(|client| {
			serde_json::json!({
				"id": client.id,
				"name": client.name,
				"domains": client.domains,
				"keywords": client.keywords,
			})
		})
		.collect();
	let known_projects: Vec<Value> = projects
		.iter()
		.map(|project| {
			serde_json::json!({
				"id": project.id,
				"client_id": project.client_id,
				"name": project.name,
				"keywords": project.keywords,
			})
		})
		.collect();
	let attendee_emails: Vec<&str> =
		meeting.attendees.iter().map(|attendee| attendee.email.as_str()).collect();
	let context = serde_json::json!({
		"known_clients": known_clients,
		"known_projects": known_projects,
		"meeting": {
			"title": meeting.title,
			"description": meeting.description,
			"organizer": meeting.organizer,
			"attendees": attendee_emails,
			"attendee_domains": attendee_domains,
		},
	});

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": context.to_string() }),
	]
}

/// Validates the model reply and normalizes it into the same shape the rule
/// path produces. Requires a recognizable type string and a numeric
/// confidence; everything else degrades gracefully.
fn parse_reply(value: &Value, clients: &[Client], projects: &[Project]) -> AiAttempt {
	let Some(raw_type) = value.get("type").and_then(Value::as_str) else {
		return AiAttempt::Unavailable { reason: "reply is missing a type string".to_string() };
	};
	let Some(classification_type) = ClassificationType::parse(raw_type) else {
		return AiAttempt::Unavailable {
			reason: format!("reply carries unknown type {raw_type:?}"),
		};
	};
	let Some(confidence) = value.get("confidence").and_then(Value::as_f64) else {
		return AiAttempt::Unavailable {
			reason: "reply is missing a numeric confidence".to_string(),
		};
	};
	let confidence = scoring::clamp_confidence(confidence as f32);

	let mut client = resolve_client(value, clients);
	let mut project = resolve_project(value, projects);

	match (client, project) {
		// A project implies its owning client; drop inconsistent pairs, and
		// adopt the owner when the model named only the project.
		(Some(owner), Some(found)) if found.client_id != owner.id => project = None,
		(None, Some(found)) => {
			client = clients.iter().find(|candidate| candidate.id == found.client_id);

			if client.is_none() {
				project = None;
			}
		},
		_ => {},
	}

	AiAttempt::Classified(Classification {
		r#type: classification_type,
		client: client
			.map(|client| EntityRef { id: client.id.clone(), name: client.name.clone() }),
		project: project
			.map(|project| EntityRef { id: project.id.clone(), name: project.name.clone() }),
		internal_team: non_empty_string(value.get("internal_team")),
		confidence,
		matched_rule_id: None,
		ai_reasoning: non_empty_string(value.get("reasoning")),
	})
}

fn resolve_client<'a>(value: &Value, clients: &'a [Client]) -> Option<&'a Client> {
	if let Some(id) = non_empty_string(value.get("client_id"))
		&& let Some(client) = clients.iter().find(|client| client.id == id)
	{
		return Some(client);
	}

	let name = non_empty_string(value.get("client_name"))?;

	clients.iter().find(|client| client.name.eq_ignore_ascii_case(&name))
}

fn resolve_project<'a>(value: &Value, projects: &'a [Project]) -> Option<&'a Project> {
	if let Some(id) = non_empty_string(value.get("project_id"))
		&& let Some(project) = projects.iter().find(|project| project.id == id)
	{
		return Some(project);
	}

	let name = non_empty_string(value.get("project_name"))?;

	projects.iter().find(|project| project.name.eq_ignore_ascii_case(&name))
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
	value
		.and_then(Value::as_str)
		.map(str::trim)
		.filter(|raw| !raw.is_empty())
		.map(str::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;
	use filer_domain::EntityStatus;

	fn clients() -> Vec<Client> {
		vec![Client {
			id: "acme".to_string(),
			name: "Acme Corp".to_string(),
			domains: vec!["acme.com".to_string()],
			keywords: Vec::new(),
			status: EntityStatus::Active,
		}]
	}

	fn projects() -> Vec<Project> {
		vec![Project {
			id: "platform".to_string(),
			client_id: "acme".to_string(),
			name: "Data Platform".to_string(),
			keywords: Vec::new(),
			status: EntityStatus::Active,
		}]
	}

	#[test]
	fn rejects_reply_without_type() {
		let value = serde_json::json!({ "confidence": 0.9 });

		assert!(matches!(
			parse_reply(&value, &clients(), &projects()),
			AiAttempt::Unavailable { .. }
		));
	}

	#[test]
	fn rejects_non_numeric_confidence() {
		let value = serde_json::json!({ "type": "client", "confidence": "high" });

		assert!(matches!(
			parse_reply(&value, &clients(), &projects()),
			AiAttempt::Unavailable { .. }
		));
	}

	#[test]
	fn clamps_out_of_range_confidence() {
		let value = serde_json::json!({ "type": "client", "confidence": 1.4 });
		let AiAttempt::Classified(classification) =
			parse_reply(&value, &clients(), &projects())
		else {
			panic!("expected a classification");
		};

		assert_eq!(classification.confidence, 0.99);
	}

	#[test]
	fn resolves_client_by_name_when_id_is_unknown() {
		let value = serde_json::json!({
			"type": "client",
			"client_id": "bogus",
			"client_name": "acme corp",
			"confidence": 0.8,
		});
		let AiAttempt::Classified(classification) =
			parse_reply(&value, &clients(), &projects())
		else {
			panic!("expected a classification");
		};

		assert_eq!(classification.client.unwrap().id, "acme");
	}

	#[test]
	fn project_reference_pulls_in_owning_client() {
		let value =
			serde_json::json!({ "type": "client", "project_id": "platform", "confidence": 0.8 });
		let AiAttempt::Classified(classification) =
			parse_reply(&value, &clients(), &projects())
		else {
			panic!("expected a classification");
		};

		assert_eq!(classification.client.unwrap().id, "acme");
		assert_eq!(classification.project.unwrap().id, "platform");
	}

	#[test]
	fn inconsistent_project_is_dropped() {
		let mut other = projects();

		other[0].client_id = "globex".to_string();

		let value = serde_json::json!({
			"type": "client",
			"client_id": "acme",
			"project_id": "platform",
			"confidence": 0.8,
		});
		let AiAttempt::Classified(classification) = parse_reply(&value, &clients(), &other)
		else {
			panic!("expected a classification");
		};

		assert_eq!(classification.client.unwrap().id, "acme");
		assert!(classification.project.is_none());
	}
}
