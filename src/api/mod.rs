//! Network client boundary.

pub mod mastodon;
pub mod types;

use async_trait::async_trait;

use crate::error::ApiError;

pub use mastodon::MastodonClient;
pub use types::{Account, NewStatus, Notification, NotificationType, PostedStatus, Status, Visibility};

/// Operations the bot performs against the social server.
#[async_trait]
pub trait SocialApi: Send + Sync {
    /// Current notification batch, newest first.
    async fn notifications(&self) -> Result<Vec<Notification>, ApiError>;

    /// Create a post and return what the server assigned to it.
    async fn post_status(&self, status: NewStatus) -> Result<PostedStatus, ApiError>;

    /// Boost a status to the bot's followers.
    async fn reblog(&self, status_id: u64) -> Result<(), ApiError>;
}
