pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Reference store error: {message}")]
	Store { message: String },
	#[error("Note source error: {message}")]
	NoteSource { message: String },
}
