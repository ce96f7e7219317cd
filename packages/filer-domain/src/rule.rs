use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{classification::ClassificationType, condition::Condition, meeting::Meeting};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GroupCombinator {
	And,
	Or,
}

/// Boolean combinator over an ordered list of conditions. An empty group
/// never matches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConditionGroup {
	pub combinator: GroupCombinator,
	#[serde(default)]
	pub conditions: Vec<Condition>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
	#[default]
	Active,
	Disabled,
	Testing,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleStats {
	#[serde(default)]
	pub times_applied: u64,
	#[serde(default)]
	pub times_corrected: u64,
	#[serde(default, with = "crate::time_serde::option")]
	pub last_applied_at: Option<OffsetDateTime>,
}

/// What a matched rule does to the classification. Every field is optional;
/// unset fields leave the corresponding outcome to the matcher fallbacks.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RuleAction {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub classify_as: Option<ClassificationType>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub project_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub internal_team: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub folder_path: Option<String>,
	#[serde(default)]
	pub share_with: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub share_permission: Option<String>,
	#[serde(default)]
	pub tags: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassificationRule {
	pub id: String,
	pub name: String,
	pub priority: i64,
	pub group: ConditionGroup,
	#[serde(default)]
	pub action: RuleAction,
	#[serde(default)]
	pub confidence_boost: f32,
	#[serde(default)]
	pub status: RuleStatus,
	#[serde(default)]
	pub stats: RuleStats,
}

impl ConditionGroup {
	pub fn evaluate(&self, meeting: &Meeting, attendee_domains: &[String]) -> bool {
		if self.conditions.is_empty() {
			return false;
		}

		match self.combinator {
			GroupCombinator::And => self
				.conditions
				.iter()
				.all(|condition| condition.evaluate(meeting, attendee_domains)),
			GroupCombinator::Or => self
				.conditions
				.iter()
				.any(|condition| condition.evaluate(meeting, attendee_domains)),
		}
	}
}

impl ClassificationRule {
	pub fn is_active(&self) -> bool {
		self.status == RuleStatus::Active
	}
}

/// First-match rule selection: active rules ordered by priority descending
/// (stable, so equal priorities keep their collection order), stopping at the
/// first rule whose group holds. Deliberately not best-match.
pub fn select_matching_rule<'a>(
	rules: &'a [ClassificationRule],
	meeting: &Meeting,
	attendee_domains: &[String],
) -> Option<&'a ClassificationRule> {
	select_rule_matching(rules, meeting, attendee_domains, |_| true)
}

/// Same first-match semantics over the subset of active rules accepted by
/// `filter`. Used for the auto-share scan, which only considers rules that
/// carry a share list.
pub fn select_rule_matching<'a, F>(
	rules: &'a [ClassificationRule],
	meeting: &Meeting,
	attendee_domains: &[String],
	filter: F,
) -> Option<&'a ClassificationRule>
where
	F: Fn(&ClassificationRule) -> bool,
{
	let mut ordered: Vec<&ClassificationRule> =
		rules.iter().filter(|rule| rule.is_active() && filter(rule)).collect();

	ordered.sort_by_key(|rule| std::cmp::Reverse(rule.priority));

	ordered.into_iter().find(|rule| rule.group.evaluate(meeting, attendee_domains))
}
