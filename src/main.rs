use market_lens::app::run;
use market_lens::config::Config;
use market_lens::error::Result;
use market_lens::logging::init;

#[tokio::main]
async fn main() -> Result<()> {
    init();

    let config = Config::from_env()?;

    run(config).await
}
