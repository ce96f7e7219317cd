use std::{cmp::Ordering, collections::HashSet};

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{FilerService, Result, validate_meeting};
use filer_domain::Meeting;

const STORED_TITLE_WEIGHT: f32 = 0.4;
const STORED_TIME_WEIGHT: f32 = 0.3;
const STORED_ATTENDEE_WEIGHT: f32 = 0.3;
const ORGANIZER_BONUS: f32 = 0.1;
const FOLDER_TITLE_WEIGHT: f32 = 0.5;
const FOLDER_TIME_WEIGHT: f32 = 0.3;
const NAMING_BONUS: f32 = 0.1;

const DOC_LINK_PATTERN: &str = r"https://docs\.google\.com/document/d/([A-Za-z0-9_-]+)";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteMatchRequest {
	pub meeting: Meeting,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub folder_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub requested_by: Option<String>,
}

/// A note document scored against a meeting. Stored-index candidates carry
/// attendee and organizer metadata; folder listings usually only carry a name
/// and a modified time.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteCandidate {
	pub file_id: String,
	pub name: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub url: Option<String>,
	#[serde(default, with = "filer_domain::time_serde::option")]
	pub modified_time: Option<OffsetDateTime>,
	#[serde(default)]
	pub attendee_emails: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub organizer: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub folder_id: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
	CalendarLink,
	Firestore,
	GeminiFolder,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteMatchResponse {
	pub found: bool,
	#[serde(rename = "driveFileId", default, skip_serializing_if = "Option::is_none")]
	pub drive_file_id: Option<String>,
	#[serde(rename = "driveFileUrl", default, skip_serializing_if = "Option::is_none")]
	pub drive_file_url: Option<String>,
	#[serde(rename = "driveFileName", default, skip_serializing_if = "Option::is_none")]
	pub drive_file_name: Option<String>,
	#[serde(rename = "matchScore", default, skip_serializing_if = "Option::is_none")]
	pub match_score: Option<f32>,
	#[serde(rename = "matchReasons", default, skip_serializing_if = "Option::is_none")]
	pub match_reasons: Option<Vec<String>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source: Option<MatchSource>,
}

impl NoteMatchResponse {
	fn not_found() -> Self {
		Self {
			found: false,
			drive_file_id: None,
			drive_file_url: None,
			drive_file_name: None,
			match_score: None,
			match_reasons: None,
			source: None,
		}
	}

	fn found(
		file_id: String,
		url: Option<String>,
		name: Option<String>,
		score: f32,
		reasons: Vec<String>,
		source: MatchSource,
	) -> Self {
		Self {
			found: true,
			drive_file_id: Some(file_id),
			drive_file_url: url,
			drive_file_name: name,
			match_score: Some(score),
			match_reasons: Some(reasons),
			source: Some(source),
		}
	}
}

impl FilerService {
	/// Finds the note document for a meeting. A document link in the meeting
	/// description always wins outright; otherwise the stored index is
	/// scored, then a drive folder listing. Below-threshold candidates yield
	/// a not-found response, never a low-confidence guess.
	pub async fn match_note(&self, req: NoteMatchRequest) -> Result<NoteMatchResponse> {
		validate_meeting(&req.meeting)?;

		let meeting = &req.meeting;

		if let Some(link) = direct_document_link(meeting.description.as_deref()) {
			tracing::debug!(file_id = %link.file_id, "Meeting description links its note directly.");

			return Ok(NoteMatchResponse::found(
				link.file_id,
				Some(link.url),
				None,
				1.0,
				vec!["Linked directly from the calendar description.".to_string()],
				MatchSource::CalendarLink,
			));
		}

		let stored = self.notes.stored_candidates().await?;

		if let Some((candidate, score, reasons)) = best_candidate(
			stored.iter().map(|candidate| {
				let (score, reasons) = score_stored(meeting, candidate);

				(candidate, score, reasons)
			}),
			self.cfg.matching.candidate_floor,
			self.cfg.matching.stored_accept_threshold,
		) {
			return Ok(NoteMatchResponse::found(
				candidate.file_id.clone(),
				candidate.url.clone(),
				Some(candidate.name.clone()),
				score,
				reasons,
				MatchSource::Firestore,
			));
		}

		let folder_id = match (&req.folder_id, &req.requested_by) {
			(Some(folder_id), _) => Some(folder_id.clone()),
			(None, Some(email)) => self.notes.default_folder_for(email).await?,
			(None, None) => None,
		};
		let Some(folder_id) = folder_id else { return Ok(NoteMatchResponse::not_found()) };
		let listing = self.notes.folder_candidates(&folder_id).await?;
		let patterns = compile_name_patterns(&self.cfg.org.note_name_patterns);

		if let Some((candidate, score, reasons)) = best_candidate(
			listing.iter().map(|candidate| {
				let (score, reasons) = score_folder(meeting, candidate, &patterns);

				(candidate, score, reasons)
			}),
			self.cfg.matching.candidate_floor,
			self.cfg.matching.folder_accept_threshold,
		) {
			return Ok(NoteMatchResponse::found(
				candidate.file_id.clone(),
				candidate.url.clone(),
				Some(candidate.name.clone()),
				score,
				reasons,
				MatchSource::GeminiFolder,
			));
		}

		Ok(NoteMatchResponse::not_found())
	}
}

struct DocumentLink {
	file_id: String,
	url: String,
}

fn direct_document_link(description: Option<&str>) -> Option<DocumentLink> {
	let description = description?;
	let pattern = Regex::new(DOC_LINK_PATTERN).ok()?;
	let captures = pattern.captures(description)?;

	Some(DocumentLink {
		file_id: captures.get(1)?.as_str().to_string(),
		url: captures.get(0)?.as_str().to_string(),
	})
}

fn compile_name_patterns(patterns: &[String]) -> Vec<Regex> {
	patterns.iter().filter_map(|pattern| Regex::new(pattern).ok()).collect()
}

/// Keeps candidates above the floor, ranks them, and accepts the top one only
/// past the threshold.
fn best_candidate<'a, I>(
	scored: I,
	floor: f32,
	threshold: f32,
) -> Option<(&'a NoteCandidate, f32, Vec<String>)>
where
	I: Iterator<Item = (&'a NoteCandidate, f32, Vec<String>)>,
{
	let mut kept: Vec<(&NoteCandidate, f32, Vec<String>)> =
		scored.filter(|(_, score, _)| *score >= floor).collect();

	kept.sort_by(|a, b| cmp_score_desc(a.1, b.1));

	let (candidate, score, reasons) = kept.into_iter().next()?;

	if score >= threshold { Some((candidate, score, reasons)) } else { None }
}

fn cmp_score_desc(a: f32, b: f32) -> Ordering {
	b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn score_stored(meeting: &Meeting, candidate: &NoteCandidate) -> (f32, Vec<String>) {
	let mut score = 0.0;
	let mut reasons = Vec::new();
	let title = title_similarity(&meeting.title, &candidate.name);

	score += STORED_TITLE_WEIGHT * title;

	push_title_reason(&mut reasons, title);

	let proximity = time_proximity(
		meeting,
		candidate.modified_time,
		Duration::minutes(30),
		Duration::hours(2),
	);

	if proximity > 0.0 {
		score += STORED_TIME_WEIGHT * proximity;
		reasons.push(if proximity >= 1.0 {
			"Modified within 30 minutes of the meeting.".to_string()
		} else {
			"Modified within 2 hours of the meeting.".to_string()
		});
	}

	let overlap = attendee_overlap(meeting, candidate);

	if overlap > 0.0 {
		score += STORED_ATTENDEE_WEIGHT * overlap;
		reasons.push(format!("Attendee overlap of {:.0}%.", overlap * 100.0));
	}
	if let (Some(meeting_organizer), Some(candidate_organizer)) =
		(meeting.organizer.as_deref(), candidate.organizer.as_deref())
		&& meeting_organizer.eq_ignore_ascii_case(candidate_organizer)
	{
		score += ORGANIZER_BONUS;
		reasons.push("Same organizer.".to_string());
	}

	(score, reasons)
}

fn score_folder(
	meeting: &Meeting,
	candidate: &NoteCandidate,
	name_patterns: &[Regex],
) -> (f32, Vec<String>) {
	let mut score = 0.0;
	let mut reasons = Vec::new();
	let title = title_similarity(&meeting.title, &candidate.name);

	score += FOLDER_TITLE_WEIGHT * title;

	push_title_reason(&mut reasons, title);

	let proximity =
		time_proximity(meeting, candidate.modified_time, Duration::hours(3), Duration::hours(24));

	if proximity > 0.0 {
		score += FOLDER_TIME_WEIGHT * proximity;
		reasons.push(if proximity >= 1.0 {
			"Modified within 3 hours of the meeting.".to_string()
		} else {
			"Modified within a day of the meeting.".to_string()
		});
	}
	if name_patterns.iter().any(|pattern| pattern.is_match(&candidate.name)) {
		score += NAMING_BONUS;
		reasons.push("Name follows the auto-generated notes convention.".to_string());
	}

	(score, reasons)
}

fn push_title_reason(reasons: &mut Vec<String>, similarity: f32) {
	if similarity >= 1.0 {
		reasons.push("Title matches exactly.".to_string());
	} else if similarity >= 0.8 {
		reasons.push("Title contains the meeting title.".to_string());
	} else if similarity > 0.0 {
		reasons.push(format!("Title wording overlaps by {:.0}%.", similarity * 100.0));
	}
}

/// Exact match outranks containment outranks word overlap.
fn title_similarity(meeting_title: &str, candidate_name: &str) -> f32 {
	let meeting_title = meeting_title.trim().to_lowercase();
	let candidate_name = candidate_name.trim().to_lowercase();

	if meeting_title.is_empty() || candidate_name.is_empty() {
		return 0.0;
	}
	if meeting_title == candidate_name {
		return 1.0;
	}
	if meeting_title.contains(&candidate_name) || candidate_name.contains(&meeting_title) {
		return 0.8;
	}

	jaccard(&word_set(&meeting_title), &word_set(&candidate_name))
}

fn word_set(text: &str) -> HashSet<String> {
	text.split_whitespace().map(str::to_string).collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
	if a.is_empty() || b.is_empty() {
		return 0.0;
	}

	let intersection = a.intersection(b).count();
	let union = a.union(b).count();

	intersection as f32 / union as f32
}

/// Distance from the candidate's modified time to the meeting window: zero
/// inside the window, otherwise the gap to the nearest boundary. Candidates
/// and meetings without timestamps contribute nothing.
fn time_proximity(
	meeting: &Meeting,
	modified: Option<OffsetDateTime>,
	full_window: Duration,
	half_window: Duration,
) -> f32 {
	let Some(modified) = modified else { return 0.0 };
	let distance = match (meeting.start_time, meeting.end_time) {
		(Some(start), Some(end)) =>
			if modified >= start && modified <= end {
				Duration::ZERO
			} else {
				std::cmp::min((modified - start).abs(), (modified - end).abs())
			},
		(Some(start), None) => (modified - start).abs(),
		(None, Some(end)) => (modified - end).abs(),
		(None, None) => return 0.0,
	};

	if distance <= full_window {
		1.0
	} else if distance <= half_window {
		0.5
	} else {
		0.0
	}
}

fn attendee_overlap(meeting: &Meeting, candidate: &NoteCandidate) -> f32 {
	let meeting_emails: HashSet<String> =
		meeting.attendees.iter().map(|attendee| attendee.email.to_lowercase()).collect();
	let candidate_emails: HashSet<String> =
		candidate.attendee_emails.iter().map(|email| email.to_lowercase()).collect();

	jaccard(&meeting_emails, &candidate_emails)
}

#[cfg(test)]
mod tests {
	use super::*;
	use filer_domain::Attendee;
	use time::macros::datetime;

	fn meeting() -> Meeting {
		Meeting {
			title: "Weekly Sync - Acme Data Platform".to_string(),
			description: None,
			organizer: Some("alice@egen.com".to_string()),
			attendees: vec![
				Attendee { email: "alice@egen.com".to_string(), name: None },
				Attendee { email: "john@acme.com".to_string(), name: None },
			],
			start_time: Some(datetime!(2025-06-02 15:00 UTC)),
			end_time: Some(datetime!(2025-06-02 16:00 UTC)),
		}
	}

	fn candidate(name: &str, modified: Option<OffsetDateTime>) -> NoteCandidate {
		NoteCandidate {
			file_id: "file-1".to_string(),
			name: name.to_string(),
			url: None,
			modified_time: modified,
			attendee_emails: Vec::new(),
			organizer: None,
			folder_id: None,
		}
	}

	#[test]
	fn exact_title_beats_containment_beats_overlap() {
		assert_eq!(title_similarity("Weekly Sync", "weekly sync"), 1.0);
		assert_eq!(title_similarity("Weekly Sync", "Notes - Weekly Sync"), 0.8);

		let overlap = title_similarity("Weekly Acme Sync", "Acme Kickoff Sync");

		assert!(overlap > 0.0 && overlap < 0.8);
	}

	#[test]
	fn time_inside_the_meeting_window_counts_as_zero_distance() {
		let meeting = meeting();
		let inside = Some(datetime!(2025-06-02 15:30 UTC));

		assert_eq!(
			time_proximity(&meeting, inside, Duration::minutes(30), Duration::hours(2)),
			1.0
		);
	}

	#[test]
	fn time_windows_step_down_to_half_then_zero() {
		let meeting = meeting();
		let near = Some(datetime!(2025-06-02 16:10 UTC));
		let far = Some(datetime!(2025-06-02 17:30 UTC));
		let gone = Some(datetime!(2025-06-03 12:00 UTC));

		assert_eq!(time_proximity(&meeting, near, Duration::minutes(30), Duration::hours(2)), 1.0);
		assert_eq!(time_proximity(&meeting, far, Duration::minutes(30), Duration::hours(2)), 0.5);
		assert_eq!(time_proximity(&meeting, gone, Duration::minutes(30), Duration::hours(2)), 0.0);
	}

	#[test]
	fn stored_scoring_rewards_full_agreement() {
		let meeting = meeting();
		let mut candidate =
			candidate("Weekly Sync - Acme Data Platform", Some(datetime!(2025-06-02 16:10 UTC)));

		candidate.attendee_emails = vec!["alice@egen.com".to_string(), "john@acme.com".to_string()];
		candidate.organizer = Some("alice@egen.com".to_string());

		let (score, reasons) = score_stored(&meeting, &candidate);

		assert!(score >= 0.9);
		assert!(reasons.iter().any(|reason| reason.contains("Title matches exactly")));
		assert!(reasons.iter().any(|reason| reason.contains("Same organizer")));
	}

	#[test]
	fn folder_scoring_applies_naming_bonus() {
		let meeting = meeting();
		let candidate = candidate(
			"Weekly Sync - Acme Data Platform - Notes by Gemini",
			Some(datetime!(2025-06-02 17:00 UTC)),
		);
		let patterns = compile_name_patterns(&[r"(?i)notes by gemini".to_string()]);

		let (score, reasons) = score_folder(&meeting, &candidate, &patterns);

		// Containment title (0.5 * 0.8) + full time window (0.3) + naming
		// bonus (0.1).
		assert!((score - 0.8).abs() < 1e-6);
		assert!(reasons.iter().any(|reason| reason.contains("convention")));
	}

	#[test]
	fn best_candidate_enforces_floor_and_threshold() {
		let low = candidate("Unrelated doc", None);
		let mid = candidate("Weekly Sync - Acme Data Platform", None);
		let scored = vec![(&low, 0.2, Vec::new()), (&mid, 0.45, Vec::new())];

		assert!(best_candidate(scored.clone().into_iter(), 0.3, 0.5).is_none());
		assert!(best_candidate(scored.into_iter(), 0.3, 0.4).is_some());
	}

	#[test]
	fn direct_link_extraction() {
		let link = direct_document_link(Some(
			"Notes: https://docs.google.com/document/d/abc123_XYZ/edit",
		))
		.unwrap();

		assert_eq!(link.file_id, "abc123_XYZ");
		assert!(link.url.starts_with("https://docs.google.com/document/d/"));

		assert!(direct_document_link(Some("no links here")).is_none());
		assert!(direct_document_link(None).is_none());
	}
}
