use actix::Actor;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insitu::actors::LookupSessionActor;
use insitu::definition::{AnthropicBackend, DefinitionProvider};
use insitu::extraction::TesseractExtractor;
use insitu::vocab::VocabStore;
use insitu::{cli, config, Error};

#[actix_rt::main]
async fn main() -> miette::Result<()> {
    // Log to stderr so lines don't land in the middle of prompts
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "insitu=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting InSitu vocabulary helper");

    // A missing API key stops us here rather than on the first lookup
    let config = config::load_config()?;

    let store = VocabStore::open(&config.database_path).map_err(Error::from)?;

    let backend = Arc::new(AnthropicBackend::new(&config.api_key, &config.llm_model));
    let provider = DefinitionProvider::new(backend, config.llm_timeout, config.llm_max_tokens);

    let extractor = TesseractExtractor::new(&config.tesseract_cmd, &config.ocr_language);
    let ocr_available = extractor.is_available().await;
    if !ocr_available {
        warn!(
            "'{}' not found, image input is disabled (install Tesseract or set TESSERACT_CMD)",
            config.tesseract_cmd
        );
    }

    let session = LookupSessionActor::new(store, provider, Arc::new(extractor)).start();

    cli::run(session, ocr_available).await?;

    info!("Shutting down");
    Ok(())
}
