use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassificationType {
	Client,
	Internal,
	External,
	Personal,
	Uncategorized,
}

/// Which strategy produced a classification. The wire names are part of the
/// response contract consumed by the dashboard and the extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationMethod {
	GeminiAi,
	RuleBased,
	None,
}

impl ClassificationType {
	/// Parses the loose type strings the model and older rule payloads use.
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"client" => Some(Self::Client),
			"internal" => Some(Self::Internal),
			"external" => Some(Self::External),
			"personal" => Some(Self::Personal),
			"uncategorized" => Some(Self::Uncategorized),
			_ => None,
		}
	}
}
