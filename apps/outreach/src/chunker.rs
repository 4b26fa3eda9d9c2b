//! Chunker: splits long text into overlapping windows that fit an LLM context.
//!
//! Algorithm (all positions in characters, i.e. Unicode scalar values):
//! 1. A chunk starts at `start` and may extend to at most `start + chunk_size`.
//! 2. If the text continues past that window, the chunk is cut just after the last
//!    paragraph break (`"\n\n"`) inside the window, else after the last line break,
//!    else at the window edge. A cut is only accepted if it ends past
//!    `start + overlap`, which guarantees forward progress.
//! 3. The next chunk starts exactly `overlap` characters before the previous end.
//!
//! Non-final chunks are exactly `chunk_size` long only on a hard cut; a separator
//! cut ends them early.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundaries tried in order before falling back to a hard cut.
pub const SEPARATORS: [&str; 2] = ["\n\n", "\n"];

pub const DEFAULT_CHUNK_SIZE: usize = 10_000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkError {
    #[error("chunk_size must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    OverlapTooLarge { chunk_size: usize, overlap: usize },
}

/// A window of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    /// Character offset of the first character in the source text.
    pub start: usize,
    /// Character offset one past the last character.
    pub end: usize,
    pub text: String,
}

impl Chunk {
    pub fn char_len(&self) -> usize {
        self.end - self.start
    }
}

/// Splits `text` into chunks of at most `chunk_size` characters, each overlapping the
/// previous one by exactly `overlap` characters.
pub fn split(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<Chunk>, ChunkError> {
    if chunk_size == 0 {
        return Err(ChunkError::ZeroChunkSize);
    }
    if overlap >= chunk_size {
        return Err(ChunkError::OverlapTooLarge {
            chunk_size,
            overlap,
        });
    }

    // bounds[k] is the byte offset of character k; the last element is text.len().
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let total = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < total {
        let window_end = (start + chunk_size).min(total);
        let end = if window_end == total {
            total
        } else {
            find_cut(text, &bounds, start, window_end, overlap).unwrap_or(window_end)
        };

        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
            text: text[bounds[start]..bounds[end]].to_string(),
        });

        if end == total {
            break;
        }
        start = end - overlap;
    }

    Ok(chunks)
}

/// Finds the preferred cut inside `[start, window_end]`, returned as a character
/// offset just past a separator. Only cuts strictly after `start + overlap` qualify.
fn find_cut(
    text: &str,
    bounds: &[usize],
    start: usize,
    window_end: usize,
    overlap: usize,
) -> Option<usize> {
    let window = &text[bounds[start]..bounds[window_end]];
    let min_end = start + overlap;

    SEPARATORS.iter().find_map(|sep| {
        let (pos, matched) = window.rmatch_indices(sep).next()?;
        let end_byte = bounds[start] + pos + matched.len();
        // Separators are ASCII, so end_byte always sits on a char boundary.
        let end = bounds.partition_point(|&b| b < end_byte);
        (end > min_end).then_some(end)
    })
}
