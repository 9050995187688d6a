pub mod anthropic;
pub mod context;
pub mod parser;
pub mod prompt;
pub mod provider;

// Re-export common types
pub use anthropic::AnthropicBackend;
pub use provider::{CompletionBackend, CompletionRequest, DefinitionProvider, DefinitionResult};
