//! Fixed-width splitting of rendered text for size-limited delivery.
//!
//! Windows are counted in characters, never bytes, so a multi-byte
//! character is never cut in half. Splitting ignores word and line
//! boundaries: every chunk but the last is exactly `max_length` characters.

use std::num::NonZeroUsize;

use crate::models::Chunk;

/// Split `text` into consecutive chunks of at most `max_length` characters.
///
/// Concatenating the chunks in index order gives back `text`. Empty input
/// gives no chunks.
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use news_relay::outputs::split;
///
/// let chunks = split("abcdefg", NonZeroUsize::new(3).unwrap());
/// let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
/// assert_eq!(texts, vec!["abc", "def", "g"]);
/// ```
pub fn split(text: &str, max_length: NonZeroUsize) -> Vec<Chunk> {
    let max = max_length.get();
    let mut chunks = Vec::with_capacity(text.len() / max + 1);
    let mut rest = text;

    while !rest.is_empty() {
        let cut = rest
            .char_indices()
            .nth(max)
            .map_or(rest.len(), |(offset, _)| offset);
        let (head, tail) = rest.split_at(cut);
        chunks.push(Chunk {
            index: chunks.len(),
            text: head.to_string(),
        });
        rest = tail;
    }
    chunks
}
