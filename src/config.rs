//! Application configuration.

use clap::Parser;

/// Storefront demo configuration, read from CLI arguments and the
/// environment.
#[derive(Debug, Parser)]
#[command(name = "storefront", about = "In-memory storefront demo", long_about = None)]
pub struct AppConfig {
    /// Sales tax rate applied to order subtotals.
    #[arg(long, env = "TAX_RATE", default_value_t = 0.08)]
    pub tax_rate: f64,

    /// Connection limit for the pretend database pool.
    #[arg(long, env = "DB_POOL_LIMIT", default_value_t = 20)]
    pub pool_limit: usize,

    /// Requests per minute allowed per client.
    #[arg(long, env = "RATE_LIMIT", default_value_t = 100)]
    pub rate_limit: u32,
}

impl AppConfig {
    /// Load configuration from the environment and CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed.
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing).
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
