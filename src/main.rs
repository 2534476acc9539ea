use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitfolio::server::{self, AppState};
use gitfolio::Config;

#[derive(Parser, Debug)]
#[command(name = "gitfolio")]
#[command(version)]
#[command(about = "Serve cached GitHub profile statistics for a portfolio site")]
struct Args {
    /// Address to listen on (overrides BIND_ADDR)
    #[arg(short, long)]
    bind: Option<String>,

    /// Fetch the stats once, print them as JSON and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("gitfolio=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::from_env()?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    if config.github_username.is_none() {
        tracing::warn!("GITHUB_USERNAME is not set; stats requests will fail until it is");
    }

    if args.once {
        let state = AppState::from_config(&config)?;
        let payload = state.stats.get_or_refresh().await;
        println!("{}", serde_json::to_string_pretty(&payload)?);

        if let Some(failure) = payload.failure() {
            anyhow::bail!("{}: {}", failure.kind, failure.detail);
        }
        return Ok(());
    }

    server::serve(&config).await?;

    Ok(())
}
