use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zimage_client::controller::{GenerationController, Outcome};
use zimage_client::models::{validate_strength, Config};
use zimage_client::view::ConsoleView;

#[derive(Debug, Parser)]
#[command(name = "zimage-client")]
#[command(about = "Generate an image from a text prompt")]
struct CliArgs {
    /// Text describing the desired image.
    #[arg(short, long)]
    prompt: String,

    /// Optional reference image (PNG, JPEG, WebP or GIF).
    #[arg(short, long, value_name = "PATH")]
    image: Option<PathBuf>,

    /// How strongly the reference image guides generation (0.0 - 1.0).
    #[arg(short, long, value_parser = parse_strength_arg)]
    strength: Option<f32>,

    /// Fixed RNG seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Classifier-free guidance scale forwarded to the backend.
    #[arg(long)]
    guidance_scale: Option<f32>,

    /// Backend base URL; overrides ZIMAGE_BASE_URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Where to write the generated image.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

fn parse_strength_arg(input: &str) -> std::result::Result<f32, String> {
    let value = input
        .parse::<f32>()
        .map_err(|_| format!("Invalid strength '{}'. Expected a number", input))?;
    validate_strength(value).map_err(|e| e.to_string())
}

fn default_output_path(extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "generated_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        extension
    ))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zimage_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }

    let controller = GenerationController::from_config(&config, Arc::new(ConsoleView::new()))
        .context("Failed to initialize client")?
        .with_seed(args.seed)
        .with_guidance_scale(args.guidance_scale);

    if let Some(strength) = args.strength {
        controller.set_strength(strength)?;
    }
    if let Some(path) = &args.image {
        controller
            .capture_image(path)
            .await
            .with_context(|| format!("Failed to load reference image {}", path.display()))?;
    }

    match controller.generate(&args.prompt).await {
        Outcome::Generated { image, .. } => {
            let path = args
                .output
                .unwrap_or_else(|| default_output_path(image.extension()));
            tokio::fs::write(&path, &image.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Saved image to {}", path.display());
            Ok(())
        }
        Outcome::Skipped => {
            error!("Prompt is empty; nothing to generate");
            std::process::exit(1);
        }
        other => {
            error!("Generation failed: {:?}", other);
            std::process::exit(1);
        }
    }
}
