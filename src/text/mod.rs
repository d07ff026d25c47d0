//! Text handling for forwarded messages.

pub mod html;
pub mod split;

pub use html::html_to_text;
pub use split::{CONTINUATION_MARKER, MAX_POST_CHARS, PostChunks, split_into_posts};

/// Neutralize mentions in forwarded text so nobody new gets notified.
///
/// Every `@` becomes `/`, including ones that are not part of a mention.
pub fn sanitize_forwarded(text: &str) -> String {
    text.replace('@', "/")
}
