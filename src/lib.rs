pub mod actors;
pub mod cli;
pub mod config;
pub mod definition;
pub mod error;
pub mod extraction;
pub mod vocab;

// Re-export error types for convenience
pub use error::{Error, ExtractionError, ProviderError, Result, SessionError, StorageError};
