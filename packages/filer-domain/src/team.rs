const ENGINEERING_TERMS: &[&str] = &[
	"standup",
	"stand-up",
	"sprint",
	"retro",
	"retrospective",
	"engineering",
	"architecture",
	"code review",
	"bug triage",
	"deploy",
];
const SALES_TERMS: &[&str] =
	&["sales", "pipeline", "forecast", "quota", "deal review", "prospect"];
const ALL_HANDS_TERMS: &[&str] =
	&["all hands", "all-hands", "town hall", "townhall", "company update", "kickoff"];

/// Best-effort team attribution for internal meetings, from title wording
/// alone. Returns none when nothing recognizable appears.
pub fn detect_internal_team(title: &str) -> Option<&'static str> {
	let title = title.to_lowercase();

	if ENGINEERING_TERMS.iter().any(|term| title.contains(term)) {
		return Some("Engineering");
	}
	if SALES_TERMS.iter().any(|term| title.contains(term)) {
		return Some("Sales");
	}
	if ALL_HANDS_TERMS.iter().any(|term| title.contains(term)) {
		return Some("All Hands");
	}

	None
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn detects_engineering_terms() {
		assert_eq!(detect_internal_team("Daily Standup"), Some("Engineering"));
		assert_eq!(detect_internal_team("Sprint planning"), Some("Engineering"));
	}

	#[test]
	fn detects_sales_and_all_hands() {
		assert_eq!(detect_internal_team("Q3 Pipeline Review"), Some("Sales"));
		assert_eq!(detect_internal_team("October All Hands"), Some("All Hands"));
	}

	#[test]
	fn unknown_titles_detect_nothing() {
		assert_eq!(detect_internal_team("Coffee chat"), None);
	}
}
