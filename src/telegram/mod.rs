//! Telegram adapter: everything that touches the SDK.
//!
//! The relay core is SDK-free; this module converts at the boundary in both
//! directions. Inbound, teloxide updates become domain [`InboundMessage`]
//! values; outbound, the [`TelegramSender`] implements the delivery seam
//! over the Bot API, and request errors are classified into the relay's
//! send-error taxonomy.
//!
//! [`InboundMessage`]: crate::types::InboundMessage

pub mod client;
pub mod dispatch;
pub mod error;
pub mod inbound;

pub use client::TelegramSender;
pub use dispatch::run_dispatcher;
pub use error::classify_request_error;
pub use inbound::{has_video_payload, inbound_message};
