//! # Stockflow Dashboard Entry Point
//!
//! Headless runner: logs in, loads every list, prints the summary.
//!
//! ## Startup Sequence
//! 1. Load configuration (file given as first argument, `$STOCKFLOW_CONFIG`,
//!    or the platform config dir; environment overrides on top)
//! 2. Initialize tracing (logging)
//! 3. Hand over to `stockflow_dashboard::run`

use std::error::Error;
use std::path::PathBuf;

use stockflow_api::ClientConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args().nth(1).map(PathBuf::from);
    let config = ClientConfig::load(path)?;

    stockflow_dashboard::init_tracing(&config.dashboard.log_filter);
    stockflow_dashboard::run(config).await
}
