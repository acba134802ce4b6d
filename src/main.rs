#[macro_use]
extern crate rust_i18n;

mod shutdown;
mod startup;

use tracing::info;

// Initialize i18n
i18n!("locales", fallback = "en");

#[tokio::main]
async fn main() -> miette::Result<()> {
    startup::init_logging()?;

    info!("Starting Roomwatch");

    let config = startup::load_config().await?;

    startup::start_bot(config).await
}
