//! Character-window chunking with natural-boundary preference.
//!
//! Chunks are contiguous spans of the trimmed document text. Each chunk holds
//! at most `max_len` characters and starts exactly `overlap` characters before
//! its predecessor ended, so a passage split across a boundary is still
//! retrievable from one side. Lengths are counted in `char`s, never bytes.

use crate::error::{RagError, RagResult};

/// Chunk emitted for embedding and indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Position within the document's chunk sequence.
    pub index: usize,
    /// Chunk body text.
    pub text: String,
    /// Character start offset within the trimmed document text.
    pub char_start: usize,
    /// Exclusive character end offset within the trimmed document text.
    pub char_end: usize,
}

/// Chunking tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub max_len: usize,
    /// Characters shared between consecutive chunks.
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_len: 500,
            overlap: 100,
        }
    }
}

impl ChunkingConfig {
    /// Rejects sizings that would prevent chunking from advancing.
    pub fn validate(&self) -> RagResult<()> {
        if self.max_len == 0 {
            return Err(RagError::Configuration(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if self.max_len <= self.overlap {
            return Err(RagError::Configuration(format!(
                "chunk size {} must exceed chunk overlap {}",
                self.max_len, self.overlap
            )));
        }
        Ok(())
    }
}

/// Stateless text chunker.
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    /// Builds a chunker after validating its sizing.
    pub fn new(config: ChunkingConfig) -> RagResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Splits `text` into ordered, overlapping chunks.
    pub fn chunk(&self, text: &str) -> RagResult<Vec<Chunk>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(RagError::EmptyInput);
        }

        let chars: Vec<char> = trimmed.chars().collect();
        let ChunkingConfig { max_len, overlap } = self.config;
        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let window_end = (start + max_len).min(chars.len());
            let end = if window_end == chars.len() {
                window_end
            } else {
                // cuts at or before start + overlap would not advance the next window
                find_cut(&chars, start + overlap + 1, window_end)
            };
            chunks.push(Chunk {
                index: chunks.len(),
                text: chars[start..end].iter().collect(),
                char_start: start,
                char_end: end,
            });
            if end == chars.len() {
                break;
            }
            start = end - overlap;
        }

        Ok(chunks)
    }

    /// Splits `text` and keeps only the chunk bodies.
    pub fn split(&self, text: &str) -> RagResult<Vec<String>> {
        Ok(self
            .chunk(text)?
            .into_iter()
            .map(|chunk| chunk.text)
            .collect())
    }
}

/// One-shot helper: validates the sizing and splits `text`.
pub fn chunk_text(text: &str, max_len: usize, overlap: usize) -> RagResult<Vec<String>> {
    Chunker::new(ChunkingConfig { max_len, overlap })?.split(text)
}

#[derive(Debug, Clone, Copy)]
enum Boundary {
    Paragraph,
    Sentence,
    Word,
}

const BOUNDARY_PRIORITY: [Boundary; 3] = [Boundary::Paragraph, Boundary::Sentence, Boundary::Word];

impl Boundary {
    /// Whether a chunk may end right before `chars[cut]`.
    fn allows_cut(self, chars: &[char], cut: usize) -> bool {
        if cut < 2 || cut >= chars.len() {
            return false;
        }
        let prev = chars[cut - 1];
        let before = chars[cut - 2];
        match self {
            Boundary::Paragraph => prev == '\n' && before == '\n',
            Boundary::Sentence => prev.is_whitespace() && matches!(before, '.' | '!' | '?'),
            Boundary::Word => prev.is_whitespace(),
        }
    }
}

/// Picks the rightmost cut in `[min_cut, max_cut]` of the best available boundary
/// kind, falling back to a hard cut at `max_cut`.
fn find_cut(chars: &[char], min_cut: usize, max_cut: usize) -> usize {
    BOUNDARY_PRIORITY
        .iter()
        .find_map(|boundary| {
            (min_cut..=max_cut)
                .rev()
                .find(|&cut| boundary.allows_cut(chars, cut))
        })
        .unwrap_or(max_cut)
}
