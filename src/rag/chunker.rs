//! Overlapping character-window splitter.

use crate::core::errors::ConfigError;

/// Splits document text into chunks of at most `chunk_size` characters,
/// where consecutive chunks share `chunk_overlap` characters. The final
/// chunk may be shorter. Pure; the only failure mode is an invalid
/// configuration, rejected at construction.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// A contiguous slice of a document produced by the chunker. Offsets are
/// in characters, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub start_offset: usize,
    pub chunk_index: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, ConfigError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidChunking {
                size: chunk_size,
                overlap: chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    pub fn split(&self, text: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total = chars.len();

        let mut chunks = Vec::new();
        if total == 0 {
            return chunks;
        }

        let step = self.chunk_size - self.chunk_overlap;
        let mut start = 0;
        let mut chunk_index = 0;

        loop {
            let end = (start + self.chunk_size).min(total);
            chunks.push(TextChunk {
                text: chars[start..end].iter().collect(),
                start_offset: start,
                chunk_index,
            });

            if end == total {
                break;
            }
            start += step;
            chunk_index += 1;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_document_yields_single_chunk() {
        let chunker = Chunker::new(1000, 200).unwrap();
        let chunks = chunker.split("a short document");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "a short document");
        assert_eq!(chunks[0].start_offset, 0);
    }

    #[test]
    fn document_of_exact_chunk_size_is_not_split() {
        let chunker = Chunker::new(10, 2).unwrap();
        let chunks = chunker.split("0123456789");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn consecutive_chunks_share_exact_overlap() {
        let chunker = Chunker::new(10, 3).unwrap();
        let text: String = ('a'..='z').collect();
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev_tail: String = pair[0].text.chars().rev().take(3).collect::<Vec<_>>()
                .into_iter().rev().collect();
            let next_head: String = pair[1].text.chars().take(3).collect();
            assert_eq!(prev_tail, next_head);
        }
    }

    #[test]
    fn chunks_cover_entire_input_without_gaps() {
        let chunker = Chunker::new(7, 2).unwrap();
        let text = "the quick brown fox jumps over the lazy dog";
        let chunks = chunker.split(text);

        // Reconstruct by dropping each chunk's overlap prefix.
        let mut rebuilt = chunks[0].text.clone();
        for chunk in &chunks[1..] {
            rebuilt.extend(chunk.text.chars().skip(2));
        }
        assert_eq!(rebuilt, text);

        for chunk in &chunks {
            assert!(!chunk.text.is_empty());
            assert!(chunk.text.chars().count() <= 7);
        }
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = Chunker::new(10, 2).unwrap();
        assert!(chunker.split("").is_empty());
    }

    #[test]
    fn handles_multibyte_characters_by_char_count() {
        let chunker = Chunker::new(4, 1).unwrap();
        let chunks = chunker.split("日本語のテキスト");

        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 4);
        }
        let rebuilt: String = chunks[0]
            .text
            .chars()
            .chain(chunks[1..].iter().flat_map(|c| c.text.chars().skip(1)))
            .collect();
        assert_eq!(rebuilt, "日本語のテキスト");
    }

    #[test]
    fn overlap_equal_to_size_is_a_config_error() {
        assert!(matches!(
            Chunker::new(100, 100),
            Err(ConfigError::InvalidChunking { .. })
        ));
        assert!(matches!(
            Chunker::new(100, 150),
            Err(ConfigError::InvalidChunking { .. })
        ));
        assert!(Chunker::new(100, 99).is_ok());
    }
}
