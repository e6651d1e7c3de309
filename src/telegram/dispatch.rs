//! Long-poll dispatcher wiring.
//!
//! Receives updates from Telegram, applies the video pre-filter, and feeds
//! converted messages into the relay worker's channel. Both regular messages
//! and channel posts are handled, since the source chat may be either a
//! group or a broadcast channel. Update-handling errors are logged by the
//! dispatcher's error handler rather than crashing the process.

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{info, trace, warn};

use crate::types::InboundMessage;

use super::inbound::{has_video_payload, inbound_message};

/// Runs the dispatcher until shutdown (ctrl-c).
///
/// Pending updates are not dropped on startup, so videos posted while the
/// relay was offline are still observed and relayed.
pub async fn run_dispatcher(bot: Bot, tx: mpsc::Sender<InboundMessage>) {
    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter(|message: Message| has_video_payload(&message))
                .endpoint(enqueue),
        )
        .branch(
            Update::filter_channel_post()
                .filter(|message: Message| has_video_payload(&message))
                .endpoint(enqueue),
        );

    info!("starting long-poll dispatcher");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![tx])
        .default_handler(|update| async move {
            trace!(?update, "ignoring non-video update");
        })
        .error_handler(LoggingErrorHandler::with_custom_text(
            "update handler failed",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

/// Converts and enqueues one update for the relay worker.
async fn enqueue(message: Message, tx: mpsc::Sender<InboundMessage>) -> ResponseResult<()> {
    if tx.send(inbound_message(&message)).await.is_err() {
        warn!(message_id = %message.id.0, "relay worker is gone; dropping update");
    }
    Ok(())
}
