pub mod tesseract;

use async_trait::async_trait;

use crate::error::ExtractionError;

// Re-export common types
pub use tesseract::TesseractExtractor;

/// Turns raw image bytes into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;
}
