//! Document segmentation into retrievable chunks.
//!
//! This module provides the [`Segmenter`] trait and [`SentenceSegmenter`],
//! which splits raw text into sentences on terminal punctuation and newlines.

/// A strategy for splitting raw document text into retrievable units.
///
/// Implementations return trimmed, non-empty pieces in document order.
/// Embeddings are attached later by the ingestion pipeline.
pub trait Segmenter: Send + Sync {
    /// Split raw text into an ordered sequence of chunks.
    ///
    /// Returns an empty `Vec` if the input contains no segmentable text.
    fn segment(&self, raw_text: &str) -> Vec<String>;
}

/// Splits text into sentences on terminal punctuation, then on newlines.
///
/// A sentence boundary is `.`, `!`, or `?` followed by whitespace; the
/// terminator stays attached to the preceding sentence. Each sentence is
/// further split on literal newlines, trimmed, and dropped if empty.
///
/// No minimum or maximum chunk length is enforced: a single character
/// between two terminators becomes its own chunk. Token-window chunking
/// with overlap is a reasonable extension but not part of this contract.
///
/// # Example
///
/// ```rust
/// use ragkit::segmenter::{Segmenter, SentenceSegmenter};
///
/// let chunks = SentenceSegmenter.segment("Hello world. How are you?");
/// assert_eq!(chunks, vec!["Hello world.", "How are you?"]);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SentenceSegmenter;

/// Split text at sentence terminators followed by whitespace, keeping the
/// terminator attached to the preceding piece.
fn split_keeping_terminator(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    pieces.push(&text[start..end]);
                    start = end;
                }
            }
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }

    pieces
}

impl Segmenter for SentenceSegmenter {
    fn segment(&self, raw_text: &str) -> Vec<String> {
        let mut chunks = Vec::new();
        for sentence in split_keeping_terminator(raw_text) {
            for line in sentence.split('\n') {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            }
        }
        chunks
    }
}
