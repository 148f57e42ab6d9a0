use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use pricewatch::{
    BatchRunner, Config, HttpFetcher, JsonFileRepository, PriceAggregator, PromotionDetector,
    PsnScraper, SteamScraper, StorefrontScraper, SystemClock,
};

#[derive(Parser, Debug)]
#[command(version, about = "Steam/PSN price tracker with promotion detection")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON file holding the tracked game library
    #[arg(long, default_value = "library.json")]
    library: PathBuf,

    /// Similarity cutoff for accepting a storefront match (overrides config)
    #[arg(long)]
    similarity_threshold: Option<u8>,

    /// Pause between games in milliseconds (overrides config)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Retry budget per storefront request (overrides config)
    #[arg(long)]
    max_retries: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    // CLI args > config file > defaults
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    if let Some(threshold) = args.similarity_threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(delay_ms) = args.delay_ms {
        config.inter_game_delay_ms = delay_ms;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }

    let fetcher = HttpFetcher::from_config(&config)?;
    let scrapers: Vec<Box<dyn StorefrontScraper>> = vec![
        Box::new(SteamScraper::new(fetcher.clone(), &config)),
        Box::new(PsnScraper::new(fetcher, &config)),
    ];
    let aggregator = PriceAggregator::new(scrapers, config.similarity_threshold);
    let detector = PromotionDetector::from_config(&config);
    let repository = JsonFileRepository::new(&args.library);

    let mut runner = BatchRunner::new(
        aggregator,
        detector,
        repository,
        Box::new(SystemClock),
        &config,
    );
    let report = runner.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
