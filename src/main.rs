// src/main.rs

use sqltools::config::load_and_validate;
use sqltools::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("sqltools error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    let cfg = load_and_validate(&args.config)?;
    // The level depends on `[settings].debug`, so logging starts after the
    // config is read.
    logging::init_logging(args.log_level, cfg.settings.debug)?;
    tracing::debug!(
        path = %args.config.display(),
        connections = cfg.connections.len(),
        "configuration loaded"
    );
    run(args, cfg).await
}
