//! Word-bounded chunking for summarization input.
//!
//! Chunks are produced lazily from a whitespace split of the source text. Each chunk joins at
//! most `max_words` consecutive words with single spaces; chunks never overlap and never drop a
//! word, and only the last chunk may be shorter than the bound. [`WordChunks`] is `Clone`, so a
//! sequence can be restarted by cloning it before iteration.

use std::iter::FusedIterator;
use std::str::SplitWhitespace;

use super::types::ChunkingError;

/// Default number of words per summarization chunk.
pub const DEFAULT_CHUNK_WORDS: usize = 400;

/// Lazy iterator over word-bounded chunks of a text.
#[derive(Debug, Clone)]
pub struct WordChunks<'a> {
    words: SplitWhitespace<'a>,
    max_words: usize,
}

impl Iterator for WordChunks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.words.next()?;
        let mut chunk = String::from(first);
        for word in self.words.by_ref().take(self.max_words - 1) {
            chunk.push(' ');
            chunk.push_str(word);
        }
        Some(chunk)
    }
}

impl FusedIterator for WordChunks<'_> {}

/// Split `text` into chunks of at most `max_words` words.
///
/// Rejects a zero bound, which could only yield empty chunks.
pub fn chunk_words(text: &str, max_words: usize) -> Result<WordChunks<'_>, ChunkingError> {
    if max_words == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    Ok(WordChunks {
        words: text.split_whitespace(),
        max_words,
    })
}

/// Number of whitespace-separated words in `text`.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
