use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use rivalscope_common::Config;
use rivalscope_scout::bootstrap::build_pipeline;
use rivalscope_scout::AnalysisRequest;

#[derive(Parser)]
#[command(name = "rivalscope", about = "Competitive analysis from a product image")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze one product image and print the result as JSON
    Analyze {
        /// Path to the product image
        image: PathBuf,
        /// Extra description appended to the image description
        #[arg(long)]
        hint: Option<String>,
        /// Social post URL to include (repeatable)
        #[arg(long = "social-url")]
        social_urls: Vec<String>,
        /// JSON fixture file for the offline adapter
        #[arg(long)]
        fixtures: Option<PathBuf>,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("rivalscope=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    config.log_redacted();

    match cli.command {
        Command::Analyze {
            image,
            hint,
            social_urls,
            fixtures,
            pretty,
        } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            let fixtures = fixtures.as_deref().and_then(Path::to_str);
            let pipeline = build_pipeline(&config, fixtures)?;

            let mut request =
                AnalysisRequest::new(bytes, mime_for(&image)).with_social_urls(social_urls);
            if let Some(hint) = hint {
                request = request.with_hint(hint);
            }

            info!(image = %image.display(), "Running analysis");
            let result = pipeline.coordinator.run(&request).await?;

            let json = if pretty {
                serde_json::to_string_pretty(&result)?
            } else {
                serde_json::to_string(&result)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
