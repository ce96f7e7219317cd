use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Attendee {
	pub email: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
}

/// A calendar meeting as handed to the engine. Never persisted here; every
/// classification and note-match request carries a fresh copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Meeting {
	pub title: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub organizer: Option<String>,
	#[serde(default)]
	pub attendees: Vec<Attendee>,
	#[serde(default, with = "crate::time_serde::option")]
	pub start_time: Option<OffsetDateTime>,
	#[serde(default, with = "crate::time_serde::option")]
	pub end_time: Option<OffsetDateTime>,
}

/// Lowercased domain part of an email address, if there is one.
pub fn email_domain(email: &str) -> Option<String> {
	let (_, domain) = email.rsplit_once('@')?;
	let domain = domain.trim().to_ascii_lowercase();

	if domain.is_empty() { None } else { Some(domain) }
}

impl Meeting {
	/// Attendee email domains, lowercased, deduplicated, in attendee order.
	pub fn attendee_domains(&self) -> Vec<String> {
		let mut out = Vec::new();

		for attendee in &self.attendees {
			let Some(domain) = email_domain(&attendee.email) else { continue };

			if !out.contains(&domain) {
				out.push(domain);
			}
		}

		out
	}

	/// Attendee domains other than the organization's own.
	pub fn external_domains(&self, org_domain: &str) -> Vec<String> {
		let org = org_domain.to_ascii_lowercase();

		self.attendee_domains().into_iter().filter(|domain| *domain != org).collect()
	}

	/// True only when the meeting has attendees and every one of them belongs
	/// to the organization's own domain.
	pub fn all_internal(&self, org_domain: &str) -> bool {
		if self.attendees.is_empty() {
			return false;
		}

		let org = org_domain.to_ascii_lowercase();

		self.attendees
			.iter()
			.all(|attendee| email_domain(&attendee.email).is_some_and(|domain| domain == org))
	}

	pub fn internal_attendees(&self, org_domain: &str) -> Vec<&Attendee> {
		let org = org_domain.to_ascii_lowercase();

		self.attendees
			.iter()
			.filter(|attendee| email_domain(&attendee.email).is_some_and(|domain| domain == org))
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn meeting(attendees: &[&str]) -> Meeting {
		Meeting {
			title: "Sync".to_string(),
			description: None,
			organizer: None,
			attendees: attendees
				.iter()
				.map(|email| Attendee { email: email.to_string(), name: None })
				.collect(),
			start_time: None,
			end_time: None,
		}
	}

	#[test]
	fn extracts_lowercased_domains() {
		assert_eq!(email_domain("Alice@Egen.COM"), Some("egen.com".to_string()));
		assert_eq!(email_domain("no-at-sign"), None);
		assert_eq!(email_domain("dangling@"), None);
	}

	#[test]
	fn dedups_attendee_domains_in_order() {
		let meeting = meeting(&["a@egen.com", "b@acme.com", "c@egen.com"]);

		assert_eq!(meeting.attendee_domains(), vec!["egen.com", "acme.com"]);
		assert_eq!(meeting.external_domains("egen.com"), vec!["acme.com"]);
	}

	#[test]
	fn all_internal_requires_attendees() {
		assert!(!meeting(&[]).all_internal("egen.com"));
		assert!(meeting(&["a@egen.com", "b@egen.com"]).all_internal("egen.com"));
		assert!(!meeting(&["a@egen.com", "b@acme.com"]).all_internal("egen.com"));
	}
}
