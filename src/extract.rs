//! Identity extraction for inbound messages.
//!
//! Determines whether a message carries video content the relay should
//! forward, and if so which media identifiers to use. Messages from chats
//! other than the configured source produce nothing, regardless of their
//! attachments.

use crate::types::{ChannelId, InboundMessage, MediaRef};

/// Extracts the video identity from an inbound message.
///
/// Rules, evaluated in order:
///
/// 1. Messages not originating from `source` yield `None`.
/// 2. A native video attachment yields its identifiers directly.
/// 3. A document attachment whose declared media type is `video/*` yields
///    that attachment's identifiers.
/// 4. Anything else yields `None`.
///
/// Pure function of its input; no side effects.
pub fn extract_video(message: &InboundMessage, source: ChannelId) -> Option<MediaRef> {
    if message.channel != source {
        return None;
    }

    if let Some(video) = &message.video {
        return Some(video.clone());
    }

    match &message.document {
        Some(doc) if doc.is_video() => Some(doc.media.clone()),
        _ => None,
    }
}
