use anyhow::Result;
use payroll_fetcher::utils::logging;
use payroll_fetcher::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = Config::load()?;

    let app = App::initialize(config).await?;
    app.run().await?;

    Ok(())
}
