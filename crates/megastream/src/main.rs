use keepalive::{JobGauge, KeepAliveApi, ServerState};
use mega::MegaClient;
use telegram::{JobRegistry, Settings};
use teloxide::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    let _ = dotenv::dotenv();

    // teloxide logs through the log facade, our crates through tracing
    pretty_env_logger::init();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Initialize the bot from environment variables
    let bot = Bot::from_env();
    let settings = Settings::from_env();
    let client = MegaClient::from_env();

    // megadl does the actual downloading; refuse to start without it
    match client.version().await {
        Ok(version) => log::info!("Found downloader: {}", version),
        Err(e) => {
            eprintln!("Failed to run megadl: {}", e);
            eprintln!("Please install megatools and make sure megadl is on PATH");
            return;
        }
    }

    if let Err(e) = tokio::fs::create_dir_all(&settings.download_root).await {
        eprintln!(
            "Failed to create download root {}: {}",
            settings.download_root.display(),
            e
        );
        return;
    }

    let gauge = JobGauge::new();
    let registry = JobRegistry::new(gauge.clone());

    // Keep-alive server so the hosting platform's health checks pass
    let server = KeepAliveApi::new(ServerState::new(gauge));
    let host = settings.keepalive_host.clone();
    let port = settings.keepalive_port;
    tokio::spawn(async move {
        if let Err(e) = server.serve(&host, port).await {
            tracing::error!("Keep-alive server exited: {}", e);
        }
    });

    // Sweep stale downloads every hour
    let sweep_root = settings.download_root.clone();
    let sweep_age = settings.cleanup_age_hours;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(3600));
        interval.tick().await;
        loop {
            interval.tick().await;
            match telegram::jobs::prune_stale(&sweep_root, sweep_age).await {
                Ok(removed) if removed > 0 => {
                    tracing::info!("Swept {} stale download(s)", removed)
                }
                Ok(_) => {}
                Err(e) => tracing::debug!("Sweep failed: {}", e),
            }
        }
    });

    if let Err(e) = telegram::telegram::set_bot_commands(&bot).await {
        tracing::warn!("Failed to register bot commands: {}", e);
    }

    println!("Bot started successfully!");

    Dispatcher::builder(bot, telegram::telegram::schema())
        .dependencies(dptree::deps![client, registry, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
