use miette::Diagnostic;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Primary error type for the InSitu application
#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    #[error("Environment configuration error: {0}")]
    #[diagnostic(
        code(insitu::config_error),
        help("Create a .env file next to the binary, e.g. ANTHROPIC_API_KEY=sk-ant-...")
    )]
    Config(String),

    #[error("Storage error: {0}")]
    #[diagnostic(code(insitu::storage_error))]
    Storage(#[from] StorageError),

    #[error("Definition provider error: {0}")]
    #[diagnostic(code(insitu::provider_error))]
    Provider(#[from] ProviderError),

    #[error("Text extraction error: {0}")]
    #[diagnostic(code(insitu::extraction_error))]
    Extraction(#[from] ExtractionError),

    #[error("Lookup session error: {0}")]
    #[diagnostic(code(insitu::session_error))]
    Session(#[from] SessionError),

    #[error("Actor system error: {0}")]
    #[diagnostic(code(insitu::actor_error))]
    Actor(#[from] actix::MailboxError),

    #[error("Terminal prompt error: {0}")]
    #[diagnostic(code(insitu::prompt_error))]
    Prompt(#[from] dialoguer::Error),

    #[error("I/O error: {0}")]
    #[diagnostic(code(insitu::io_error))]
    Io(#[from] io::Error),
}

/// Vocab store errors. Every variant means the persistence medium could not
/// be read or written.
#[derive(Error, Debug, Diagnostic)]
pub enum StorageError {
    #[error("Vocab database unavailable: {0}")]
    #[diagnostic(code(insitu::storage::unavailable))]
    Unavailable(#[from] rusqlite::Error),

    #[error("Could not prepare database directory: {0}")]
    #[diagnostic(code(insitu::storage::directory))]
    Directory(#[from] io::Error),

    #[error("Stored entry {id} is corrupt: {reason}")]
    #[diagnostic(code(insitu::storage::corrupt))]
    Corrupt { id: i64, reason: String },

    #[error("Cannot save an entry with an empty word")]
    #[diagnostic(code(insitu::storage::empty_word))]
    EmptyWord,
}

/// Definition provider errors
#[derive(Error, Debug, Diagnostic)]
pub enum ProviderError {
    #[error("Could not reach the definition service: {0}")]
    #[diagnostic(code(insitu::provider::unavailable))]
    Unavailable(String),

    #[error("The definition service rejected the API key")]
    #[diagnostic(
        code(insitu::provider::unauthorized),
        help("Check ANTHROPIC_API_KEY in your .env file")
    )]
    Unauthorized,

    #[error("Rate limit exceeded, wait a moment and try again")]
    #[diagnostic(code(insitu::provider::rate_limit))]
    RateLimit,

    #[error("Timed out after {0:?} waiting for the definition service")]
    #[diagnostic(code(insitu::provider::timeout))]
    Timeout(Duration),

    #[error("The definition service replied in an unexpected format: {0}")]
    #[diagnostic(code(insitu::provider::malformed_response))]
    MalformedResponse(String),
}

impl ProviderError {
    /// True for failures where the service could not be reached or refused
    /// the call, as opposed to replying with something unparseable.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, ProviderError::MalformedResponse(_))
    }
}

/// OCR adapter errors
#[derive(Error, Debug, Diagnostic)]
pub enum ExtractionError {
    #[error("The image could not be read: {0}")]
    #[diagnostic(code(insitu::extraction::unreadable_image))]
    UnreadableImage(#[from] image::ImageError),

    #[error("OCR engine `{0}` is not installed")]
    #[diagnostic(
        code(insitu::extraction::engine_missing),
        help("Install Tesseract (e.g. `brew install tesseract` or `apt install tesseract-ocr`) or set TESSERACT_CMD")
    )]
    EngineMissing(String),

    #[error("OCR engine failed: {0}")]
    #[diagnostic(code(insitu::extraction::engine_failed))]
    EngineFailed(String),

    #[error("No text could be extracted from this image, try a clearer image or paste the text")]
    #[diagnostic(code(insitu::extraction::no_text))]
    NoText,
}

/// Errors raised by the lookup session state machine
#[derive(Error, Debug, Diagnostic)]
pub enum SessionError {
    #[error("Another request is still in progress")]
    #[diagnostic(code(insitu::session::busy))]
    Busy,

    #[error("Cannot {action} while the session is {state}")]
    #[diagnostic(code(insitu::session::invalid_state))]
    InvalidState {
        action: &'static str,
        state: &'static str,
    },

    #[error("Text is empty")]
    #[diagnostic(code(insitu::session::empty_text))]
    EmptyText,

    #[error("Please type a word to look up")]
    #[diagnostic(code(insitu::session::empty_word))]
    EmptyWord,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),
}

// Re-export error types for convenience
pub use AppError as Error;

/// Create a result type that uses our error type
pub type Result<T> = std::result::Result<T, Error>;
