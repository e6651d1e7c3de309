//! Conversion of teloxide updates into domain inbound messages.
//!
//! This is the only place that reads SDK message fields. The update filter
//! used by the dispatcher lives here too, so the subscription pre-filter and
//! the conversion stay in sync.

use teloxide::types::Message;

use crate::types::{ChannelId, ContentKey, DocumentRef, InboundMessage, MediaRef, MessageSeq, TransportId};

/// Pre-filter matching messages that can possibly carry relayable video:
/// a native video attachment, or a document declared as `video/*`.
///
/// The relay core re-validates regardless; this only trims the update stream.
pub fn has_video_payload(message: &Message) -> bool {
    message.video().is_some()
        || message
            .document()
            .and_then(|doc| doc.mime_type.as_ref())
            .is_some_and(|m| m.type_() == mime::VIDEO)
}

/// Builds the domain view of a Telegram message.
pub fn inbound_message(message: &Message) -> InboundMessage {
    InboundMessage {
        channel: ChannelId(message.chat.id.0),
        seq: MessageSeq(message.id.0),
        video: message.video().map(|video| MediaRef {
            transport_id: TransportId::new(&video.file.id),
            content_key: ContentKey::new(&video.file.unique_id),
        }),
        document: message.document().map(|doc| DocumentRef {
            media: MediaRef {
                transport_id: TransportId::new(&doc.file.id),
                content_key: ContentKey::new(&doc.file.unique_id),
            },
            mime_type: doc.mime_type.clone(),
        }),
    }
}
