use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use autoresponder::api::{MastodonClient, SocialApi};
use autoresponder::config::BotConfig;
use autoresponder::poller::Poller;

#[derive(Parser, Debug)]
#[command(name = "autoresponder")]
#[command(about = "Auto-reply to mentions and forward direct messages to admins", long_about = None)]
struct Cli {
    /// File to load the config from.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::load(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    let config = Arc::new(config);

    let client = MastodonClient::new(&config).context("building API client")?;

    tracing::info!(
        base_url = %config.base_url,
        client_id = client.client_id(),
        admins = config.admins.len(),
        state_file = %config.state_file.display(),
        "Autoresponder v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    let api: Arc<dyn SocialApi> = Arc::new(client);
    let mut poller = Poller::resume(Arc::clone(&config), api)
        .await
        .context("loading saved state")?;

    // Ctrl-C stops the loop at the next sleep boundary.
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after the current cycle");
            on_signal.cancel();
        }
    });

    if let Err(e) = poller.run(cancel).await {
        tracing::error!(error = %e, "Polling stopped");
        return Err(e.into());
    }

    Ok(())
}
