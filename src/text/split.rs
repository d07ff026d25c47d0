//! Splitting long text into post-sized chunks.
//!
//! Every chunk is `prefix + "\n" + slice`. All chunks but the last end with
//! a continuation marker, so each one stays within the post length limit.
//! Lengths are counted in characters, the unit the server enforces.

use crate::error::SplitError;

/// Maximum characters in a single post.
pub const MAX_POST_CHARS: usize = 500;

/// Appended to every chunk except the last.
pub const CONTINUATION_MARKER: &str = "\n…";

/// Characters reserved per chunk: the newline after the prefix plus the marker.
const RESERVED_CHARS: usize = 3;

/// Split `body` into posts of at most [`MAX_POST_CHARS`], each led by `prefix`.
pub fn split_into_posts<'a>(prefix: &'a str, body: &'a str) -> Result<PostChunks<'a>, SplitError> {
    PostChunks::new(prefix, body, MAX_POST_CHARS)
}

/// Lazy sequence of chunk strings. Clone it to iterate again from the start.
#[derive(Debug, Clone)]
pub struct PostChunks<'a> {
    prefix: &'a str,
    rest: &'a str,
    slice_len: usize,
}

impl<'a> PostChunks<'a> {
    /// Chunk `body` for posts of at most `max_len` characters.
    ///
    /// Fails when the prefix leaves no room for any body text.
    pub fn new(prefix: &'a str, body: &'a str, max_len: usize) -> Result<Self, SplitError> {
        let prefix_len = prefix.chars().count();
        let slice_len = max_len
            .checked_sub(prefix_len + RESERVED_CHARS)
            .filter(|&n| n > 0)
            .ok_or(SplitError::PrefixTooLong {
                prefix_len,
                max_len,
            })?;

        Ok(Self {
            prefix,
            rest: body,
            slice_len,
        })
    }

    /// Body characters carried by each chunk.
    pub fn slice_len(&self) -> usize {
        self.slice_len
    }
}

impl Iterator for PostChunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.rest.is_empty() {
            return None;
        }

        let split_at = self
            .rest
            .char_indices()
            .nth(self.slice_len)
            .map_or(self.rest.len(), |(i, _)| i);
        let (slice, rest) = self.rest.split_at(split_at);
        self.rest = rest;

        let mut chunk = String::with_capacity(self.prefix.len() + slice.len() + 4);
        chunk.push_str(self.prefix);
        chunk.push('\n');
        chunk.push_str(slice);
        if !self.rest.is_empty() {
            chunk.push_str(CONTINUATION_MARKER);
        }
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.rest.chars().count().div_ceil(self.slice_len);
        (n, Some(n))
    }
}

impl ExactSizeIterator for PostChunks<'_> {}
