pub mod classification;
pub mod condition;
pub mod folder;
pub mod matcher;
pub mod meeting;
pub mod registry;
pub mod rule;
pub mod scoring;
pub mod team;
pub mod time_serde;

pub use classification::{ClassificationMethod, ClassificationType};
pub use condition::{Condition, ConditionError, ConditionField, ConditionOperator, ConditionValue};
pub use meeting::{Attendee, Meeting, email_domain};
pub use registry::{Client, EntityStatus, Project};
pub use rule::{
	ClassificationRule, ConditionGroup, GroupCombinator, RuleAction, RuleStats, RuleStatus,
	select_matching_rule, select_rule_matching,
};
