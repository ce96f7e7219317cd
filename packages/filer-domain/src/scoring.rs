use crate::matcher::{ClientMatch, ProjectMatch};

pub const BASE_CONFIDENCE: f32 = 0.50;
pub const DOMAIN_MATCH_BOOST: f32 = 0.30;
pub const KEYWORD_MATCH_BOOST: f32 = 0.20;
pub const PROJECT_KEYWORD_BOOST: f32 = 0.15;
pub const SOLE_PROJECT_BOOST: f32 = 0.05;
pub const INTERNAL_BOOST: f32 = 0.20;
pub const CONFIDENCE_CEILING: f32 = 0.99;
pub const AUTO_APPLY_THRESHOLD: f32 = 0.90;

/// The independent signals a rule-based classification accumulates. Boosts
/// are additive on purpose: corroborating signals stack instead of competing.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreSignals {
	pub client_match: Option<ClientMatch>,
	pub project_match: Option<ProjectMatch>,
	pub rule_boost: Option<f32>,
	/// True when the final classification type resolved to internal. On the
	/// organic path that only happens for all-internal meetings; a rule
	/// forcing the type inherits the boost as well.
	pub resolved_internal: bool,
}

pub fn score(signals: ScoreSignals) -> f32 {
	let mut confidence = BASE_CONFIDENCE;

	match signals.client_match {
		Some(ClientMatch::Domain) => confidence += DOMAIN_MATCH_BOOST,
		Some(ClientMatch::Keyword) => confidence += KEYWORD_MATCH_BOOST,
		None => {},
	}
	match signals.project_match {
		Some(ProjectMatch::Keyword) => confidence += PROJECT_KEYWORD_BOOST,
		Some(ProjectMatch::SoleActive) => confidence += SOLE_PROJECT_BOOST,
		None => {},
	}
	if let Some(boost) = signals.rule_boost {
		confidence += boost;
	}
	if signals.resolved_internal {
		confidence += INTERNAL_BOOST;
	}

	clamp_confidence(confidence)
}

pub fn clamp_confidence(confidence: f32) -> f32 {
	if !confidence.is_finite() {
		return 0.0;
	}

	confidence.clamp(0.0, CONFIDENCE_CEILING)
}

pub fn auto_apply(confidence: f32) -> bool {
	confidence >= AUTO_APPLY_THRESHOLD
}
