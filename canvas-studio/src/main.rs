//! # canvas-export
//!
//! Exports a design from a file-backed design store.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use canvas_core::FileDesignStore;
use canvas_renderer::ExportConfig;
use canvas_studio::{CliArgs, GenerationError, GenerationRequest, ImageGenerator, Studio};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The exporter never generates images.
struct NoGenerator;

#[async_trait]
impl ImageGenerator for NoGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<Vec<u8>, GenerationError> {
        Err(GenerationError::Service(
            "image generation is not available in canvas-export".to_string(),
        ))
    }
}

/// Initialize tracing; `RUST_LOG` overrides the default `info` level and
/// `RUST_LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let store = FileDesignStore::new(args.data_dir.clone())
        .with_context(|| format!("opening design store at {}", args.data_dir.display()))?;
    let export = ExportConfig {
        scale: args.scale,
        ..ExportConfig::default()
    };
    let mut studio = Studio::with_config(
        Arc::new(store),
        Arc::new(NoGenerator),
        canvas_core::EditorConfig::default(),
        export,
    );

    if args.list {
        for id in studio.list()? {
            println!("{id}");
        }
        return Ok(());
    }

    let design = args
        .design
        .as_deref()
        .context("a design id is required")?;
    let format = args.export_format().map_err(anyhow::Error::msg)?;
    let output = args.output_path(format);

    studio.open(design)?;
    let bytes = studio.export(format)?;
    std::fs::write(&output, &bytes)
        .with_context(|| format!("writing {}", output.display()))?;

    tracing::info!(
        "Exported {design} to {} ({} bytes)",
        output.display(),
        bytes.len()
    );
    Ok(())
}
