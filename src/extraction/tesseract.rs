use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::io::{self, Cursor};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::ExtractionError;
use crate::extraction::TextExtractor;

/// OCR through the `tesseract` command line tool
pub struct TesseractExtractor {
    command: String,
    language: String,
}

impl TesseractExtractor {
    pub fn new(command: &str, language: &str) -> Self {
        Self {
            command: command.to_string(),
            language: language.to_string(),
        }
    }

    /// Whether the configured binary can be started at all
    pub async fn is_available(&self) -> bool {
        match Command::new(&self.command).arg("--version").output().await {
            Ok(output) => output.status.success(),
            Err(e) => {
                debug!("Could not start {}: {}", self.command, e);
                false
            }
        }
    }

    async fn run(&self, png: &[u8]) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.command)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.spawn_error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(png)
                .await
                .map_err(|e| ExtractionError::EngineFailed(format!("writing image: {}", e)))?;
            // Dropping stdin closes the pipe so tesseract starts recognising
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractionError::EngineFailed(e.to_string()))?;

        text_from_output(output.status.success(), &output.stdout, &output.stderr)
    }

    fn spawn_error(&self, e: io::Error) -> ExtractionError {
        if e.kind() == io::ErrorKind::NotFound {
            ExtractionError::EngineMissing(self.command.clone())
        } else {
            ExtractionError::EngineFailed(format!("starting {}: {}", self.command, e))
        }
    }
}

#[async_trait]
impl TextExtractor for TesseractExtractor {
    async fn extract(&self, image_bytes: &[u8]) -> Result<String, ExtractionError> {
        info!("Extracting text from {} byte image", image_bytes.len());

        let png = normalize_image(image_bytes)?;
        let text = self.run(&png).await?;

        info!("Extracted {} characters of text", text.len());
        Ok(text)
    }
}

/// Decodes any supported image and re-encodes it as an RGB PNG, dropping
/// alpha channels and palettes that OCR engines handle poorly.
pub fn normalize_image(image_bytes: &[u8]) -> Result<Vec<u8>, ExtractionError> {
    let image = image::load_from_memory(image_bytes)?;
    let rgb = DynamicImage::ImageRgb8(image.to_rgb8());

    let mut png = Vec::new();
    rgb.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

fn text_from_output(success: bool, stdout: &[u8], stderr: &[u8]) -> Result<String, ExtractionError> {
    if !success {
        let stderr = String::from_utf8_lossy(stderr).trim().to_string();
        warn!("tesseract failed: {}", stderr);
        return Err(ExtractionError::EngineFailed(stderr));
    }

    let text = String::from_utf8_lossy(stdout).trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::NoText);
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn rgba_png() -> Vec<u8> {
        let image = RgbaImage::from_pixel(8, 4, Rgba([255, 255, 255, 128]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    #[test]
    fn test_normalize_drops_alpha() {
        let png = normalize_image(&rgba_png()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();

        assert!(matches!(decoded, DynamicImage::ImageRgb8(_)));
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let result = normalize_image(b"definitely not an image");
        assert!(matches!(result, Err(ExtractionError::UnreadableImage(_))));
    }

    #[test]
    fn test_text_from_output() {
        assert_eq!(
            text_from_output(true, b"  Council Tax Notice\n\n", b"").unwrap(),
            "Council Tax Notice"
        );
        assert!(matches!(
            text_from_output(true, b" \n\x0c", b""),
            Err(ExtractionError::NoText)
        ));
        assert!(matches!(
            text_from_output(false, b"", b"Error opening data file eng.traineddata\n"),
            Err(ExtractionError::EngineFailed(msg)) if msg.contains("eng.traineddata")
        ));
    }

    #[tokio::test]
    async fn test_missing_engine() {
        let extractor = TesseractExtractor::new("insitu-no-such-ocr-binary", "eng");

        assert!(!extractor.is_available().await);
        assert!(matches!(
            extractor.extract(&rgba_png()).await,
            Err(ExtractionError::EngineMissing(cmd)) if cmd == "insitu-no-such-ocr-binary"
        ));
    }

    #[tokio::test]
    async fn test_unreadable_image_is_rejected_before_running_engine() {
        let extractor = TesseractExtractor::new("insitu-no-such-ocr-binary", "eng");
        assert!(matches!(
            extractor.extract(b"GIF89a-broken").await,
            Err(ExtractionError::UnreadableImage(_))
        ));
    }
}
