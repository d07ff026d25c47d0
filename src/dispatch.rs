//! Per-notification policy: boost, auto-reply, or forward.
//!
//! - Public mentions from admins are boosted; other admin mentions are ignored.
//! - Everyone else gets a direct auto-reply addressed to them and the admins.
//! - A non-public mention is additionally forwarded to the admins as a
//!   thread of direct posts hanging off the auto-reply.

use std::sync::Arc;

use tracing::{debug, info};

use crate::api::{NewStatus, Notification, NotificationType, SocialApi, Status};
use crate::config::BotConfig;
use crate::error::Result;
use crate::text::{html_to_text, sanitize_forwarded, split_into_posts};

/// Why a notification produced no action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotAMention,
    MissingStatus,
    NonPublicFromAdmin,
}

impl IgnoreReason {
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAMention => "not a mention",
            Self::MissingStatus => "no status attached",
            Self::NonPublicFromAdmin => "non-public mention from admin",
        }
    }
}

/// What was done for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ignored(IgnoreReason),
    Boosted,
    /// Auto-reply sent, followed by `forwarded` forward posts.
    Replied { forwarded: usize },
}

impl Outcome {
    /// Whether any action was taken (and the marker should advance).
    pub fn is_action(&self) -> bool {
        !matches!(self, Self::Ignored(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Ignored(_) => "ignored",
            Self::Boosted => "boosted",
            Self::Replied { forwarded: 0 } => "replied",
            Self::Replied { .. } => "replied+forwarded",
        }
    }
}

/// Applies the response policy to single notifications.
pub struct Dispatcher {
    config: Arc<BotConfig>,
    api: Arc<dyn SocialApi>,
}

impl Dispatcher {
    pub fn new(config: Arc<BotConfig>, api: Arc<dyn SocialApi>) -> Self {
        Self { config, api }
    }

    /// Act on one notification. Any network failure is returned as-is.
    pub async fn handle(&self, notification: &Notification) -> Result<Outcome> {
        let outcome = self.dispatch(notification).await?;

        match outcome {
            Outcome::Ignored(reason) => {
                debug!(
                    notification_id = notification.id,
                    reason = reason.label(),
                    "Ignoring notification"
                );
            }
            _ => {
                if let Some(status) = &notification.status {
                    info!(
                        notification_id = notification.id,
                        status_id = status.id,
                        sender = %status.account.acct,
                        visibility = %status.visibility,
                        action = outcome.label(),
                        "Responded to status {} from {}.",
                        status.id,
                        status.account.acct
                    );
                }
            }
        }

        Ok(outcome)
    }

    async fn dispatch(&self, notification: &Notification) -> Result<Outcome> {
        if notification.kind != NotificationType::Mention {
            return Ok(Outcome::Ignored(IgnoreReason::NotAMention));
        }
        let Some(status) = &notification.status else {
            return Ok(Outcome::Ignored(IgnoreReason::MissingStatus));
        };

        let sender = status.account.acct.as_str();
        if self.config.is_admin(sender) {
            if !status.visibility.is_public() {
                return Ok(Outcome::Ignored(IgnoreReason::NonPublicFromAdmin));
            }
            self.api.reblog(status.id).await?;
            return Ok(Outcome::Boosted);
        }

        self.reply_and_forward(status).await
    }

    async fn reply_and_forward(&self, status: &Status) -> Result<Outcome> {
        let sender = status.account.acct.as_str();
        let forward = !status.visibility.is_public() && !self.config.admins.is_empty();

        // Build the forward text up front so a bad prefix fails before any post.
        let prefix;
        let text;
        let chunks = if forward {
            prefix = forward_prefix(&self.config.admins, sender);
            text = sanitize_forwarded(&html_to_text(&status.content));
            Some(split_into_posts(&prefix, &text)?)
        } else {
            None
        };

        let reply = format!("@{sender} {}", self.config.message);
        let sent = self
            .api
            .post_status(NewStatus::direct_reply(reply, status.id))
            .await?;

        let mut forwarded = 0;
        let mut prev_id = sent.id;
        for chunk in chunks.into_iter().flatten() {
            let part = self
                .api
                .post_status(NewStatus::direct_reply(chunk, prev_id))
                .await?;
            prev_id = part.id;
            forwarded += 1;
        }

        Ok(Outcome::Replied { forwarded })
    }
}

/// `@admin1 @admin2 ... @sender`, admins in configured order.
pub fn forward_prefix(admins: &[String], sender: &str) -> String {
    admins
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(sender))
        .map(|handle| format!("@{handle}"))
        .collect::<Vec<_>>()
        .join(" ")
}
