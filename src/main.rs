use clap::Parser;
use sharpline::cli::{Cli, Commands};
use sharpline::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    sharpline::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Replay(args) => {
            tracing::info!("Starting snapshot replay");
            args.execute(&config).await?;
        }
        Commands::Grade(args) => {
            tracing::info!("Starting grading run");
            args.execute().await?;
        }
        Commands::Status => {
            println!("sharpline status");
            println!("  Reference book: {}", config.books.reference_book);
            println!("  Exchange book: {}", config.books.exchange_book);
            println!("  Tracked books: {}", config.books.tracked_books.join(", "));
        }
        Commands::Config => {
            println!("Current configuration:");
            println!(
                "  Steam: min_books={}, window={}m",
                config.steam.min_books, config.steam.window_minutes
            );
            println!(
                "  Rapid: spread>={}pts, moneyline>={}c",
                config.rapid.spread_threshold, config.rapid.ml_threshold
            );
            println!(
                "  Divergence: spread>={}pts, moneyline prob>={}",
                config.divergence.spread_threshold, config.divergence.ml_prob_threshold
            );
            println!(
                "  Exchange: shift>={}",
                config.exchange_monitor.shift_threshold
            );
            println!(
                "  Pipeline: min_strength={}, cooldown={}m",
                config.pipeline.min_signal_strength, config.pipeline.alert_cooldown_minutes
            );
        }
    }

    Ok(())
}
