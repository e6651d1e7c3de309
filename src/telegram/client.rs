//! Bot API client scoped to the target chat.
//!
//! Wraps a `teloxide::Bot` so that every send through one `TelegramSender`
//! lands in the same chat, matching the delivery seam where the send
//! operation carries no chat identifier.

use std::future::Future;

use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::delivery::{SendError, VideoSender};
use crate::types::{ChannelId, TransportId};

use super::error::classify_request_error;

/// Sends videos to a fixed target chat via the Bot API.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
    target: ChannelId,
}

impl TelegramSender {
    /// Creates a sender delivering to `target`.
    pub fn new(bot: Bot, target: ChannelId) -> Self {
        Self { bot, target }
    }

    /// The chat this sender delivers to.
    pub fn target(&self) -> ChannelId {
        self.target
    }
}

impl VideoSender for TelegramSender {
    fn send_video(
        &self,
        video: &TransportId,
    ) -> impl Future<Output = Result<(), SendError>> + Send {
        let bot = self.bot.clone();
        let chat = teloxide::types::ChatId(self.target.0);
        // Redelivery by file identifier; no caption is attached.
        let file = InputFile::file_id(video.as_str());
        async move {
            bot.send_video(chat, file)
                .await
                .map(|_| ())
                .map_err(classify_request_error)
        }
    }
}

impl std::fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSender")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
