pub mod ai;
pub mod classify;
pub mod match_note;

mod error;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use classify::{
	AutoShare, Classification, ClassifyRequest, ClassifyResponse, EntityRef, ShareTarget,
	SuggestedActions,
};
pub use error::{Error, Result};
pub use match_note::{MatchSource, NoteCandidate, NoteMatchRequest, NoteMatchResponse};

use filer_config::{Config, LlmProviderConfig};
use filer_domain::{Client, ClassificationRule, Meeting, Project};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Read access to the reference data both strategies depend on. Rules come
/// back pre-sorted by priority descending. The stats increment is the only
/// mutation this engine ever performs.
pub trait ReferenceStore
where
	Self: Send + Sync,
{
	fn active_clients(&self) -> BoxFuture<'_, Result<Vec<Client>>>;

	fn active_projects(&self) -> BoxFuture<'_, Result<Vec<Project>>>;

	fn active_rules(&self) -> BoxFuture<'_, Result<Vec<ClassificationRule>>>;

	fn increment_rule_stats<'a>(
		&'a self,
		rule_id: &'a str,
		applied: bool,
		corrected: bool,
	) -> BoxFuture<'a, Result<()>>;
}

/// Candidate note documents for the fuzzy matcher: the stored-note index and
/// direct folder listings.
pub trait NoteSource
where
	Self: Send + Sync,
{
	fn stored_candidates(&self) -> BoxFuture<'_, Result<Vec<NoteCandidate>>>;

	fn folder_candidates<'a>(
		&'a self,
		folder_id: &'a str,
	) -> BoxFuture<'a, Result<Vec<NoteCandidate>>>;

	fn default_folder_for<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<Option<String>>>;
}

/// The language-model transport. Prompt construction stays in this crate;
/// the transport is opaque and allowed to fail.
pub trait GenerateProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

struct DefaultGenerate;

impl GenerateProvider for DefaultGenerate {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(filer_providers::generate(cfg, messages))
	}
}

pub struct FilerService {
	pub cfg: Config,
	pub store: Arc<dyn ReferenceStore>,
	pub notes: Arc<dyn NoteSource>,
	pub generator: Arc<dyn GenerateProvider>,
}

impl FilerService {
	pub fn new(cfg: Config, store: Arc<dyn ReferenceStore>, notes: Arc<dyn NoteSource>) -> Self {
		Self { cfg, store, notes, generator: Arc::new(DefaultGenerate) }
	}

	pub fn with_generator(
		cfg: Config,
		store: Arc<dyn ReferenceStore>,
		notes: Arc<dyn NoteSource>,
		generator: Arc<dyn GenerateProvider>,
	) -> Self {
		Self { cfg, store, notes, generator }
	}
}

/// Caller-input validation shared by both entry points. A missing title is a
/// caller error, never a classification outcome.
pub(crate) fn validate_meeting(meeting: &Meeting) -> Result<()> {
	if meeting.title.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "meeting.title must be non-empty.".to_string() });
	}

	for attendee in &meeting.attendees {
		if attendee.email.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "meeting.attendees entries must carry an email.".to_string(),
			});
		}
	}

	Ok(())
}
