//! The relay orchestrator.
//!
//! One entry point per inbound message: run the extractor, and if it yields
//! a video, hand it to the delivery engine. Every delivery outcome is
//! terminal here; nothing is escalated upward. The caller (the worker loop)
//! invokes this for one message at a time, which is what keeps the dedup
//! store single-writer.

use tracing::{debug, info, warn};

use crate::delivery::{DeliveryEngine, DeliveryOutcome, VideoSender};
use crate::extract::extract_video;
use crate::types::{ChannelId, InboundMessage};

/// Wires extractor, dedup check, and delivery for one source/target pair.
pub struct Relay<S> {
    source: ChannelId,
    engine: DeliveryEngine<S>,
}

impl<S: VideoSender> Relay<S> {
    /// Creates a relay watching `source` and delivering through `engine`.
    pub fn new(source: ChannelId, engine: DeliveryEngine<S>) -> Self {
        Relay { source, engine }
    }

    /// The delivery engine (and through it the dedup store).
    pub fn engine(&self) -> &DeliveryEngine<S> {
        &self.engine
    }

    /// Processes one inbound message event.
    ///
    /// Messages without relayable video content return with no observable
    /// effect. For the rest, the delivery outcome is logged and discarded:
    /// success, skip, deferral, and failure are all terminal.
    pub async fn handle_message(&mut self, message: &InboundMessage) {
        let Some(media) = extract_video(message, self.source) else {
            return;
        };

        debug!(
            content_key = %media.content_key,
            message_id = %message.seq,
            "video observed in source chat"
        );

        match self.engine.deliver(&media, message.seq).await {
            DeliveryOutcome::Sent { attempts } => {
                debug!(content_key = %media.content_key, attempts, "delivery complete");
            }
            DeliveryOutcome::Duplicate => {
                info!(
                    content_key = %media.content_key,
                    message_id = %message.seq,
                    "duplicate video dropped"
                );
            }
            DeliveryOutcome::Deferred { attempts, waited } => {
                warn!(
                    content_key = %media.content_key,
                    attempts,
                    waited_secs = waited.as_secs_f64(),
                    "delivery deferred; video stays eligible for redelivery"
                );
            }
            DeliveryOutcome::Failed(_) => {
                // Engine already logged the failure with full context.
            }
        }
    }
}
