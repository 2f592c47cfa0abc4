//! Phish Shield - Main Entry Point
//!
//! Classifies every URL given on the command line and prints one JSON
//! document with the results.

use std::sync::Arc;

use anyhow::Context;

use phish_shield_core::api::commands::{self, ValidationPolicy};
use phish_shield_core::constants::{APP_NAME, APP_VERSION};
use phish_shield_core::logic::config::PipelineConfig;
use phish_shield_core::logic::model::{Classifier, OnnxClassifier};
use phish_shield_core::logic::pipeline::Pipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        eprintln!("{} v{}", APP_NAME, APP_VERSION);
        eprintln!("usage: phish-shield <url> [<url>...]");
        std::process::exit(2);
    }

    log::info!("Starting {} v{}...", APP_NAME, APP_VERSION);

    let config = PipelineConfig::from_env();

    // No degraded mode without a model
    let classifier = OnnxClassifier::load(&config.model_path)
        .with_context(|| format!("failed to load classifier from {}", config.model_path.display()))?;
    let classifier: Arc<dyn Classifier> = Arc::new(classifier);

    let pipeline = Arc::new(Pipeline::new(&config, classifier).context("failed to build pipeline")?);
    let policy = ValidationPolicy::from(&config);

    let entries = commands::classify_batch(pipeline, urls, policy).await;
    let failed = entries.iter().filter(|e| !e.is_ok()).count();

    println!("{}", serde_json::to_string_pretty(&entries)?);

    if failed > 0 {
        log::warn!("{} of {} URLs could not be classified", failed, entries.len());
    }

    Ok(())
}
