//! Wire types for the subset of the Mastodon API the bot uses.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// A server-delivered notification.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    /// Triggering status; absent for follows and similar types.
    #[serde(default)]
    pub status: Option<Status>,
}

/// Notification type tag. Only mentions are acted upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    Mention,
    Other(String),
}

impl<'de> Deserialize<'de> for NotificationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(match tag.as_str() {
            "mention" => Self::Mention,
            _ => Self::Other(tag),
        })
    }
}

/// A single post.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
    pub account: Account,
    pub visibility: Visibility,
    /// HTML body as rendered by the server.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    /// `user` for local accounts, `user@domain` for remote ones.
    pub acct: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
    Direct,
    #[serde(other)]
    Unknown,
}

impl Visibility {
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Unlisted => "unlisted",
            Self::Private => "private",
            Self::Direct => "direct",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// A post to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStatus {
    pub status: String,
    #[serde(serialize_with = "ser_opt_id", skip_serializing_if = "Option::is_none")]
    pub in_reply_to_id: Option<u64>,
    pub visibility: Visibility,
}

impl NewStatus {
    /// A direct-visibility reply to `in_reply_to`.
    pub fn direct_reply(text: impl Into<String>, in_reply_to: u64) -> Self {
        Self {
            status: text.into(),
            in_reply_to_id: Some(in_reply_to),
            visibility: Visibility::Direct,
        }
    }
}

/// The part of a created status the bot needs back.
#[derive(Debug, Clone, Deserialize)]
pub struct PostedStatus {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
}

/// Mastodon sends ids as decimal strings; accept plain numbers too.
fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Num(u64),
        Str(String),
    }

    match RawId::deserialize(deserializer)? {
        RawId::Num(n) => Ok(n),
        RawId::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

fn ser_opt_id<S: serde::Serializer>(id: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => serializer.serialize_str(&id.to_string()),
        None => serializer.serialize_none(),
    }
}
