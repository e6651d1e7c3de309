//! The inbound message shape the relay core operates on.
//!
//! External Telegram updates are converted into [`InboundMessage`] at the edge
//! (see `telegram::inbound`), so the pipeline never handles SDK types
//! directly. Messages are constructed per event and discarded after one
//! orchestration pass.

use mime::Mime;

use super::ids::{ChannelId, ContentKey, MessageSeq, TransportId};

/// A reference to one media asset: how to request it, and what it is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRef {
    /// Identifier used to request delivery of the asset.
    pub transport_id: TransportId,

    /// Identifier stable for the underlying file; the deduplication unit.
    pub content_key: ContentKey,
}

impl MediaRef {
    pub fn new(transport_id: impl Into<TransportId>, content_key: impl Into<ContentKey>) -> Self {
        MediaRef {
            transport_id: transport_id.into(),
            content_key: content_key.into(),
        }
    }
}

/// A generic file attachment with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    /// The attachment's media identifiers.
    pub media: MediaRef,

    /// Declared media type, if the sender provided one.
    pub mime_type: Option<Mime>,
}

impl DocumentRef {
    /// Whether the declared media type is in the `video/*` family.
    pub fn is_video(&self) -> bool {
        self.mime_type
            .as_ref()
            .is_some_and(|m| m.type_() == mime::VIDEO)
    }
}

/// One inbound message event, read-only to the relay core.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// The chat the message originated from.
    pub channel: ChannelId,

    /// The message's sequence identifier, for log context.
    pub seq: MessageSeq,

    /// Native video attachment, if present.
    pub video: Option<MediaRef>,

    /// Generic file attachment, if present.
    pub document: Option<DocumentRef>,
}
