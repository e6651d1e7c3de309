use teloxide::Bot;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use video_relay::config::RelayConfig;
use video_relay::dedup::DedupStore;
use video_relay::delivery::DeliveryEngine;
use video_relay::relay::Relay;
use video_relay::telegram::{self, TelegramSender};
use video_relay::worker;

/// Buffer for inbound events queued behind a slow delivery.
const INBOUND_CHANNEL_BUFFER: usize = 64;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "video_relay=info,teloxide=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration problems are the only fatal condition; nothing may start
    // polling before they are ruled out.
    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "configuration error; relay cannot start");
            std::process::exit(1);
        }
    };

    tracing::info!(
        source = %config.source_channel,
        target = %config.target_channel,
        dedup_log = %config.dedup_log.display(),
        "starting video relay"
    );

    let store = DedupStore::load(&config.dedup_log);

    let bot = Bot::new(&config.bot_token);
    let sender = TelegramSender::new(bot.clone(), config.target_channel);
    let engine = DeliveryEngine::new(sender, store, config.backoff(), config.target_channel);
    let relay = Relay::new(config.source_channel, engine);

    let (tx, rx) = mpsc::channel(INBOUND_CHANNEL_BUFFER);
    let cancel = CancellationToken::new();
    let relay_task = tokio::spawn(worker::run(relay, rx, cancel.clone()));

    // Blocks until ctrl-c stops the dispatcher.
    telegram::run_dispatcher(bot, tx).await;

    cancel.cancel();
    let _ = relay_task.await;

    tracing::info!("video relay stopped");
}
