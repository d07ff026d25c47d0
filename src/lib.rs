//! Autoresponder — answers mentions on a Mastodon account on behalf of its admins.

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod poller;
pub mod state;
pub mod text;
