use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use toxiscan::classifier::LlmClassifier;
use toxiscan::completion::groq::GroqClient;
use toxiscan::completion::throttle::Throttle;
use toxiscan::config::Config;
use toxiscan::output::{export, terminal};
use toxiscan::pipeline::batch::process_all;
use toxiscan::pipeline::progress::TerminalProgress;
use toxiscan::{input, stats};

/// toxiscan: batch toxicity classification for comment datasets.
///
/// Sends each comment to a hosted LLM, scores it across six toxicity
/// categories and summarizes the batch.
#[derive(Parser)]
#[command(name = "toxiscan", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every comment in a CSV or JSON file
    Analyze {
        /// Input file with a `comment_text` column (.csv or .json)
        file: PathBuf,

        /// Where to write the results (.csv, or .json for a JSON array)
        #[arg(long, short, default_value = export::DEFAULT_EXPORT_NAME)]
        output: PathBuf,

        /// Only classify the first N comments
        #[arg(long)]
        limit: Option<usize>,

        /// Number of result rows to print (default: 20)
        #[arg(long, default_value = "20")]
        show: usize,
    },

    /// Recompute summary statistics from a previously exported results file
    Summarize {
        /// Results file written by `analyze` (.csv or .json)
        file: PathBuf,
    },

    /// Start the dashboard API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 8080)
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("toxiscan=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            file,
            output,
            limit,
            show,
        } => {
            let config = Config::load()?;
            config.require_api_key()?;

            let mut comments = input::load_comments(&file)?;
            if let Some(limit) = limit {
                comments.truncate(limit);
            }
            println!(
                "Loaded {} comments from {}",
                comments.len().to_string().bold(),
                file.display()
            );

            let client = GroqClient::new(
                config.groq_api_key.clone(),
                config.model.clone(),
                config.api_url.clone(),
                config.http_timeout,
            )?;
            info!(model = client.model(), "Using Groq chat completions");
            let classifier = LlmClassifier::new(Arc::new(client), Throttle::default());

            let progress = TerminalProgress::new(comments.len());
            let results = process_all(&classifier, &comments, &progress).await;
            progress.finish();

            if results.len() < comments.len() {
                println!(
                    "{}",
                    format!(
                        "Stopped early: {} of {} comments classified. Partial results kept.",
                        results.len(),
                        comments.len()
                    )
                    .yellow()
                );
            }

            terminal::display_summary(&stats::summarize(&results));
            terminal::display_distribution(&stats::toxicity_distribution(&results));
            terminal::display_results(&results, show);

            export::export_results(&results, &output)?;
            println!(
                "\n{} Results written to {}",
                "✓".green(),
                output.display()
            );
        }

        Commands::Summarize { file } => {
            let rows = export::read_table(&file)?;
            println!("Read {} rows from {}", rows.len(), file.display());
            terminal::display_summary(&stats::summarize_table(&rows));
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_api_key()?;
            toxiscan::web::run_server(config, port, &bind).await?;
        }
    }

    Ok(())
}
