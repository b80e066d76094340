use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use siteprobe_common::Config;
use siteprobe_core::backend;
use siteprobe_core::extractor::PageExtractor;

#[derive(Parser)]
#[command(name = "siteprobe", about = "Scrape a page and ask its visitors what they came for")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a page and print the extracted content record
    Scrape { url: String },
    /// Scrape a page and print the generated question set
    Question { url: String },
    /// Send a one-line prompt to the configured generation backend
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::from_default_env().add_directive("siteprobe=info".parse()?);
    if cli.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let config = Config::from_env().context("Failed to load configuration")?;
    config.log_redacted();

    match cli.command {
        Command::Scrape { url } => {
            let extractor = PageExtractor::new(backend::page_renderer(&config)?);
            let record = extractor.extract(&url).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Question { url } => {
            let analyzer = backend::analyzer(&config)?;
            let set = analyzer.generate_question(&url).await?;
            println!("{}", serde_json::to_string_pretty(&set)?);
        }
        Command::Ping => {
            let generation = backend::generation_backend(&config);
            let reply = generation
                .invoke("Reply with the single word: pong", &Default::default())
                .await
                .with_context(|| format!("{} backend did not answer", generation.name()))?;
            info!(backend = generation.name(), "Backend reachable");
            println!("{}", reply.trim());
        }
    }

    Ok(())
}
