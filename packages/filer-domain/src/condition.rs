use serde::{Deserialize, Serialize};

use crate::meeting::Meeting;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionField {
	Title,
	Description,
	AttendeeDomains,
	Organizer,
	AllAttendeesDomain,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
	Contains,
	ContainsAny,
	Equals,
	StartsWith,
	Intersects,
	EndsWith,
}

/// Condition values arrive either as a single string or as a list, depending
/// on the operator.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
	One(String),
	Many(Vec<String>),
}

/// A single field/operator/value predicate over a meeting.
///
/// The field/operator pairing is validated at construction so that malformed
/// rules are rejected when they are saved, not silently skipped when they are
/// evaluated. Evaluation itself never fails: any combination this module does
/// not recognize evaluates to false.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Condition {
	pub field: ConditionField,
	pub operator: ConditionOperator,
	pub value: ConditionValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConditionError {
	UnsupportedPair { field: ConditionField, operator: ConditionOperator },
	EmptyValue,
}

impl std::fmt::Display for ConditionError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::UnsupportedPair { field, operator } => {
				write!(f, "Operator {operator:?} is not supported for field {field:?}.")
			},
			Self::EmptyValue => write!(f, "Condition value must be non-empty."),
		}
	}
}

impl std::error::Error for ConditionError {}

fn pair_supported(field: ConditionField, operator: ConditionOperator) -> bool {
	use ConditionField::*;
	use ConditionOperator::*;

	match field {
		Title | Description => matches!(operator, Contains | ContainsAny | Equals | StartsWith),
		AttendeeDomains => matches!(operator, Intersects),
		Organizer => matches!(operator, Equals | EndsWith),
		AllAttendeesDomain => matches!(operator, Equals),
	}
}

impl ConditionValue {
	fn is_empty(&self) -> bool {
		match self {
			Self::One(value) => value.trim().is_empty(),
			Self::Many(values) => values.iter().all(|value| value.trim().is_empty()),
		}
	}

	fn terms(&self) -> Vec<String> {
		match self {
			Self::One(value) => vec![value.trim().to_lowercase()],
			Self::Many(values) =>
				values.iter().map(|value| value.trim().to_lowercase()).collect(),
		}
	}

	fn single(&self) -> Option<String> {
		match self {
			Self::One(value) => Some(value.trim().to_lowercase()),
			Self::Many(_) => None,
		}
	}
}

impl Condition {
	pub fn new(
		field: ConditionField,
		operator: ConditionOperator,
		value: ConditionValue,
	) -> Result<Self, ConditionError> {
		if !pair_supported(field, operator) {
			return Err(ConditionError::UnsupportedPair { field, operator });
		}
		if value.is_empty() {
			return Err(ConditionError::EmptyValue);
		}

		Ok(Self { field, operator, value })
	}

	/// Whether this condition holds for the meeting. Fails closed: a missing
	/// field, an empty value, or an unsupported field/operator pairing all
	/// evaluate to false.
	pub fn evaluate(&self, meeting: &Meeting, attendee_domains: &[String]) -> bool {
		use ConditionOperator::*;

		if !pair_supported(self.field, self.operator) {
			return false;
		}

		match self.operator {
			Contains => self.text_field(meeting).is_some_and(|text| {
				self.value.single().is_some_and(|term| !term.is_empty() && text.contains(&term))
			}),
			ContainsAny => self.text_field(meeting).is_some_and(|text| {
				self.value.terms().iter().any(|term| !term.is_empty() && text.contains(term))
			}),
			Equals if self.field == ConditionField::AllAttendeesDomain => {
				let Some(term) = self.value.single().filter(|term| !term.is_empty()) else {
					return false;
				};

				!attendee_domains.is_empty()
					&& attendee_domains.iter().all(|domain| *domain == term)
			},
			Equals => self.text_field(meeting).is_some_and(|text| {
				self.value.single().is_some_and(|term| !term.is_empty() && text == term)
			}),
			StartsWith => self.text_field(meeting).is_some_and(|text| {
				self.value.single().is_some_and(|term| !term.is_empty() && text.starts_with(&term))
			}),
			EndsWith => self.text_field(meeting).is_some_and(|text| {
				self.value.single().is_some_and(|term| !term.is_empty() && text.ends_with(&term))
			}),
			Intersects => {
				let terms = self.value.terms();

				attendee_domains
					.iter()
					.any(|domain| terms.iter().any(|term| !term.is_empty() && term == domain))
			},
		}
	}

	fn text_field(&self, meeting: &Meeting) -> Option<String> {
		let raw = match self.field {
			ConditionField::Title => Some(meeting.title.as_str()),
			ConditionField::Description => meeting.description.as_deref(),
			ConditionField::Organizer => meeting.organizer.as_deref(),
			_ => None,
		}?;

		Some(raw.to_lowercase())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::meeting::Attendee;

	fn meeting() -> Meeting {
		Meeting {
			title: "Weekly Sync - Acme Data Platform".to_string(),
			description: Some("Review the ingestion pipeline".to_string()),
			organizer: Some("alice@egen.com".to_string()),
			attendees: vec![
				Attendee { email: "alice@egen.com".to_string(), name: None },
				Attendee { email: "john@acme.com".to_string(), name: None },
			],
			start_time: None,
			end_time: None,
		}
	}

	fn domains(meeting: &Meeting) -> Vec<String> {
		meeting.attendee_domains()
	}

	#[test]
	fn rejects_unsupported_pairs_at_construction() {
		let err = Condition::new(
			ConditionField::AttendeeDomains,
			ConditionOperator::StartsWith,
			ConditionValue::One("acme.com".to_string()),
		)
		.unwrap_err();

		assert!(matches!(err, ConditionError::UnsupportedPair { .. }));
		assert_eq!(
			Condition::new(
				ConditionField::Title,
				ConditionOperator::Contains,
				ConditionValue::One("  ".to_string()),
			)
			.unwrap_err(),
			ConditionError::EmptyValue,
		);
	}

	#[test]
	fn contains_is_case_insensitive() {
		let meeting = meeting();
		let condition = Condition::new(
			ConditionField::Title,
			ConditionOperator::Contains,
			ConditionValue::One("ACME".to_string()),
		)
		.unwrap();

		assert!(condition.evaluate(&meeting, &domains(&meeting)));
	}

	#[test]
	fn contains_any_matches_any_term() {
		let meeting = meeting();
		let condition = Condition::new(
			ConditionField::Title,
			ConditionOperator::ContainsAny,
			ConditionValue::Many(vec!["standup".to_string(), "data platform".to_string()]),
		)
		.unwrap();

		assert!(condition.evaluate(&meeting, &domains(&meeting)));
	}

	#[test]
	fn missing_field_fails_closed() {
		let mut meeting = meeting();

		meeting.description = None;

		let condition = Condition::new(
			ConditionField::Description,
			ConditionOperator::Contains,
			ConditionValue::One("pipeline".to_string()),
		)
		.unwrap();

		assert!(!condition.evaluate(&meeting, &domains(&meeting)));
	}

	#[test]
	fn intersects_matches_attendee_domains() {
		let meeting = meeting();
		let condition = Condition::new(
			ConditionField::AttendeeDomains,
			ConditionOperator::Intersects,
			ConditionValue::Many(vec!["acme.com".to_string(), "globex.com".to_string()]),
		)
		.unwrap();

		assert!(condition.evaluate(&meeting, &domains(&meeting)));
	}

	#[test]
	fn organizer_ends_with() {
		let meeting = meeting();
		let condition = Condition::new(
			ConditionField::Organizer,
			ConditionOperator::EndsWith,
			ConditionValue::One("@egen.com".to_string()),
		)
		.unwrap();

		assert!(condition.evaluate(&meeting, &domains(&meeting)));
	}

	#[test]
	fn all_attendees_domain_requires_every_attendee() {
		let meeting = meeting();
		let condition = Condition::new(
			ConditionField::AllAttendeesDomain,
			ConditionOperator::Equals,
			ConditionValue::One("egen.com".to_string()),
		)
		.unwrap();

		assert!(!condition.evaluate(&meeting, &domains(&meeting)));

		let internal = Meeting { attendees: meeting.attendees[..1].to_vec(), ..meeting };

		assert!(condition.evaluate(&internal, &internal.attendee_domains()));
	}

	#[test]
	fn deserialized_unsupported_pair_fails_closed() {
		// Rules saved before the pairing table tightened may still carry odd
		// combinations; they must evaluate false rather than panic.
		let meeting = meeting();
		let condition = Condition {
			field: ConditionField::AttendeeDomains,
			operator: ConditionOperator::Equals,
			value: ConditionValue::One("acme.com".to_string()),
		};

		assert!(!condition.evaluate(&meeting, &domains(&meeting)));
	}
}
