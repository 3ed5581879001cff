mod config;
mod error;
mod news;
mod sentiment;
mod storage;
mod analyzer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use analyzer::SentimentAnalyzer;
use news::GoogleNewsSource;
use sentiment::LexiconClassifier;
use storage::ResultCache;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze recent news sentiment for a ticker symbol
    Analyze {
        /// Stock ticker symbol (e.g. "TCS")
        symbol: String,
    },
    /// List stored analysis records for a symbol, newest first
    History {
        /// Stock ticker symbol
        symbol: String,
        /// Maximum number of records to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Initialize configuration and the cache database
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Analyze { symbol }) => {
            run_analysis(symbol).await?;
        }
        Some(Commands::History { symbol, limit }) => {
            run_history(symbol, *limit).await?;
        }
        Some(Commands::Init) => {
            info!("Initializing NewsPulse configuration...");
            config::initialize_config().await?;
        }
        None => {
            info!("No command specified. Use --help for available commands.");
        }
    }

    Ok(())
}

fn build_analyzer(config: &config::Config) -> Result<SentimentAnalyzer> {
    let cache = ResultCache::open(&config.database_path, config.cache_ttl_minutes)?;
    let source = GoogleNewsSource::new(config.feed_url_template.clone(), config.max_headlines);
    let classifier = LexiconClassifier::new();

    Ok(SentimentAnalyzer::new(
        cache,
        Box::new(source),
        Box::new(classifier),
    ))
}

async fn run_analysis(symbol: &str) -> Result<()> {
    let config = config::load_config().await?;
    let analyzer = build_analyzer(&config)?;

    match analyzer.analyze(symbol).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            // The one failure reported as "not found" rather than internal
            error!("No news found for symbol: {}", symbol);
            std::process::exit(1);
        }
        Err(e) => {
            error!("Error processing {}: {}", symbol, e);
            Err(e.into())
        }
    }
}

async fn run_history(symbol: &str, limit: usize) -> Result<()> {
    let config = config::load_config().await?;
    let analyzer = build_analyzer(&config)?;

    let records = analyzer.history(symbol, limit)?;
    if records.is_empty() {
        info!("No stored records for {}", symbol);
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
