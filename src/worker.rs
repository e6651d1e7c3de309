//! Serial processing loop for inbound events.
//!
//! All inbound messages funnel through one mpsc channel into this single
//! consumer, which invokes the orchestrator one message at a time. Events
//! queue up behind a slow or rate-limited delivery instead of being dropped
//! or parallelized, and the dedup store sees exactly one writer. The loop
//! exits when the cancellation token fires or every sender is gone.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::delivery::VideoSender;
use crate::relay::Relay;
use crate::types::InboundMessage;

/// Runs the relay worker until cancellation or channel close.
pub async fn run<S: VideoSender>(
    mut relay: Relay<S>,
    mut rx: mpsc::Receiver<InboundMessage>,
    cancel: CancellationToken,
) {
    info!("relay worker started");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("relay worker shutting down");
                break;
            }
            message = rx.recv() => match message {
                Some(message) => relay.handle_message(&message).await,
                None => {
                    info!("inbound channel closed; relay worker exiting");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::time::Duration;

    use tempfile::TempDir;

    use crate::dedup::DedupStore;
    use crate::delivery::{BackoffPolicy, DeliveryEngine, SendError};
    use crate::types::{ChannelId, MediaRef, MessageSeq, TransportId};

    const SOURCE: ChannelId = ChannelId(-1001);

    #[derive(Clone, Default)]
    struct CountingSender {
        sends: Arc<AtomicUsize>,
    }

    impl VideoSender for CountingSender {
        fn send_video(
            &self,
            _video: &TransportId,
        ) -> impl Future<Output = Result<(), SendError>> + Send {
            self.sends.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        }
    }

    fn test_relay(sender: CountingSender) -> (Relay<CountingSender>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = DedupStore::load(dir.path().join("log.txt"));
        let policy = BackoffPolicy::new(Duration::from_secs(1), Duration::ZERO);
        let engine = DeliveryEngine::new(sender, store, policy, ChannelId(-2002));
        (Relay::new(SOURCE, engine), dir)
    }

    fn video_message(seq: i32, key: &str) -> InboundMessage {
        InboundMessage {
            channel: SOURCE,
            seq: MessageSeq(seq),
            video: Some(MediaRef::new(format!("t{seq}"), key)),
            document: None,
        }
    }

    #[tokio::test]
    async fn processes_queued_messages_in_order_then_exits_on_close() {
        let sender = CountingSender::default();
        let (relay, _dir) = test_relay(sender.clone());
        let (tx, rx) = mpsc::channel(8);

        tx.send(video_message(1, "k1")).await.unwrap();
        tx.send(video_message(2, "k2")).await.unwrap();
        tx.send(video_message(3, "k1")).await.unwrap(); // duplicate
        drop(tx);

        run(relay, rx, CancellationToken::new()).await;

        assert_eq!(sender.sends.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let sender = CountingSender::default();
        let (relay, _dir) = test_relay(sender);
        let (_tx, rx) = mpsc::channel::<InboundMessage>(8);

        let cancel = CancellationToken::new();
        cancel.cancel();

        // Returns despite the sender half staying open.
        run(relay, rx, cancel).await;
    }
}
