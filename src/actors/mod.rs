pub mod lookup_session;

// Re-export actor types for easier import
pub use lookup_session::{LookupSessionActor, SessionSnapshot, SessionState};
