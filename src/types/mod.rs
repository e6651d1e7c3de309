//! Core domain types for the relay pipeline.

pub mod ids;
pub mod message;

pub use ids::{ChannelId, ContentKey, MessageSeq, TransportId};
pub use message::{DocumentRef, InboundMessage, MediaRef};
