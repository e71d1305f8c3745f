// Best ball roster analyzer entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file; stdout carries the report)
// 3. Load config, copying defaults on first run
// 4. Load and enrich the roster snapshot
// 5. Run the subcommand and print its output

use bestball_app::app::{self, ConfiguredSource};
use bestball_app::cli::Args;
use bestball_app::config;
use bestball_app::report::Format;
use bestball_core::repository::Repository;

use anyhow::Context;
use clap::Parser;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing(&args.base_dir)?;
    info!("bestball starting up");

    let config = config::load_config(&args.base_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: contest={:?}, source={:?}, stack sizes {}-{}",
        config.contest.draft_group_id,
        config.data.source,
        config.analysis.min_stack_size,
        config.analysis.max_stack_size
    );

    let source = ConfiguredSource::from_config(&config, &args.base_dir);
    let mut repository = Repository::new(source);
    let snapshot = repository
        .load_snapshot()
        .await
        .context("failed to load roster data")?;

    let output = app::execute(&args.command, &snapshot, &config, Format::from_json_flag(args.json))
        .context("command failed")?;
    println!("{output}");

    info!("bestball finished");
    Ok(())
}

/// Initialize tracing to log to a file under `base_dir/logs`.
fn init_tracing(base_dir: &std::path::Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("bestball.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("bestball=info,bestball_app=info,bestball_core=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    Ok(())
}
