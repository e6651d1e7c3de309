//! Newtype wrappers for domain identifiers.
//!
//! These types prevent accidental mixing of different identifier kinds (e.g.,
//! using a transport identifier where a content key is expected) and make the
//! code more self-documenting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Telegram chat identifier (group, supergroup, or channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub i64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChannelId {
    fn from(n: i64) -> Self {
        ChannelId(n)
    }
}

/// A message sequence identifier within a chat.
///
/// Used only for log context; the relay never addresses messages by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageSeq(pub i32);

impl fmt::Display for MessageSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<i32> for MessageSeq {
    fn from(n: i32) -> Self {
        MessageSeq(n)
    }
}

/// Telegram's `file_id`: sufficient to request redelivery of an asset.
///
/// Not stable across sessions; two distinct transport identifiers can refer
/// to the same underlying file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportId(pub String);

impl TransportId {
    pub fn new(s: impl Into<String>) -> Self {
        TransportId(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TransportId {
    fn from(s: String) -> Self {
        TransportId(s)
    }
}

impl From<&str> for TransportId {
    fn from(s: &str) -> Self {
        TransportId(s.to_owned())
    }
}

/// Telegram's `file_unique_id`: stable for a given physical media asset.
///
/// Equal content implies equal key, which makes this the deduplication unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(pub String);

impl ContentKey {
    pub fn new(s: impl Into<String>) -> Self {
        ContentKey(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ContentKey {
    fn from(s: String) -> Self {
        ContentKey(s)
    }
}

impl From<&str> for ContentKey {
    fn from(s: &str) -> Self {
        ContentKey(s.to_owned())
    }
}
