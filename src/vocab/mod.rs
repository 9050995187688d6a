pub mod entry;
pub mod store;

// Re-export common types
pub use entry::VocabEntry;
pub use store::VocabStore;
