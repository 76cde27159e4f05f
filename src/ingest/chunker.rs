//! Word-window chunker
//!
//! Splits text into windows of at most `size` whitespace-delimited words,
//! consecutive windows sharing `overlap` words. Each segment is the exact
//! slice of the source from its first word to its last word, so offsets
//! point back into the extracted text.

use crate::errors::DocRagError;
use crate::errors::Result;

/// A contiguous slice of the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub ordinal: usize,
    /// Byte offset of the first word
    pub start: usize,
    /// Byte offset one past the last word
    pub end: usize,
    pub text: String,
}

#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    size: usize,
    overlap: usize,
}

impl Chunker {
    pub fn new(size: usize, overlap: usize) -> Result<Self> {
        if size == 0 {
            return Err(DocRagError::ConfigError(
                "chunk size must be positive".to_string(),
            ));
        }
        if overlap >= size {
            return Err(DocRagError::ConfigError(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
            )));
        }
        Ok(Self { size, overlap })
    }

    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub const fn overlap(&self) -> usize {
        self.overlap
    }

    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<TextSegment> {
        let words = word_spans(text);
        if words.is_empty() {
            return Vec::new();
        }

        let step = self.size - self.overlap;
        let mut segments = Vec::new();
        let mut first = 0;

        loop {
            let last = (first + self.size).min(words.len()) - 1;
            let start = words[first].0;
            let end = words[last].1;
            segments.push(TextSegment {
                ordinal: segments.len(),
                start,
                end,
                text: text[start..end].to_string(),
            });

            if last + 1 == words.len() {
                break;
            }
            first += step;
        }

        segments
    }
}

/// Byte spans of whitespace-delimited words
fn word_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut current: Option<usize> = None;

    for (i, c) in text.char_indices() {
        match (c.is_whitespace(), current) {
            (true, Some(start)) => {
                spans.push((start, i));
                current = None;
            }
            (false, None) => current = Some(i),
            _ => {}
        }
    }
    if let Some(start) = current {
        spans.push((start, text.len()));
    }

    spans
}

/// Join segments in order, dropping the part of each segment already
/// covered by its predecessor.
///
/// With a non-zero overlap this reproduces the source between its first and
/// last word exactly. Segments that do not touch are joined by one space.
#[must_use]
pub fn reassemble(segments: &[TextSegment]) -> String {
    let mut out = String::new();
    let mut covered_to: Option<usize> = None;

    for segment in segments {
        match covered_to {
            None => out.push_str(&segment.text),
            Some(prev_end) if segment.start < prev_end => {
                let skip = (prev_end - segment.start).min(segment.text.len());
                out.push_str(segment.text.get(skip..).unwrap_or_default());
            }
            Some(_) => {
                out.push(' ');
                out.push_str(&segment.text);
            }
        }
        covered_to = Some(covered_to.map_or(segment.end, |c| c.max(segment.end)));
    }

    out
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_invalid_settings() {
        assert!(Chunker::new(0, 0).is_err());
        assert!(Chunker::new(10, 10).is_err());
        assert!(Chunker::new(10, 11).is_err());
        assert!(Chunker::new(10, 9).is_ok());
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        let chunker = Chunker::new(200, 50).unwrap();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\t  ").is_empty());
    }

    #[test]
    fn test_short_text_is_one_segment() {
        let chunker = Chunker::new(200, 50).unwrap();
        let text = "  a short document  ";
        let segments = chunker.chunk(text);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "a short document");
        assert_eq!(&text[segments[0].start..segments[0].end], "a short document");
    }

    #[test]
    fn test_500_words_make_three_segments() {
        let chunker = Chunker::new(200, 50).unwrap();
        let segments = chunker.chunk(&words(500));
        assert_eq!(segments.len(), 3);
        assert!(segments[0].text.starts_with("w0 "));
        assert!(segments[1].text.starts_with("w150 "));
        assert!(segments[2].text.starts_with("w300 "));
        assert!(segments[2].text.ends_with("w499"));
        assert_eq!(segments[2].text.split_whitespace().count(), 200);
    }

    #[test]
    fn test_overlap_shared_between_neighbours() {
        let chunker = Chunker::new(4, 2).unwrap();
        let segments = chunker.chunk("a b c d e f");
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a b c d", "c d e f"]);
        assert_eq!(segments[1].ordinal, 1);
    }

    #[test]
    fn test_reassemble_preserves_inner_whitespace() {
        let chunker = Chunker::new(3, 1).unwrap();
        let text = "one  two\nthree\t\tfour five\n\nsix";
        assert_eq!(reassemble(&chunker.chunk(text)), text);
    }

    #[test]
    fn test_reassemble_without_overlap_uses_single_spaces() {
        let chunker = Chunker::new(2, 0).unwrap();
        assert_eq!(reassemble(&chunker.chunk("a  b\nc d")), "a  b c d");
    }

    proptest! {
        #[test]
        fn prop_chunk_then_reassemble_is_identity(
            text in "[a-z ]{0,40}(\n[a-z\t ]{0,40}){0,8}",
            size in 1usize..12,
            overlap_seed in 0usize..12,
        ) {
            prop_assume!(size > 1);
            let overlap = 1 + overlap_seed % (size - 1);
            let chunker = Chunker::new(size, overlap).unwrap();
            let segments = chunker.chunk(&text);

            prop_assert_eq!(reassemble(&segments), text.trim());
            for segment in &segments {
                prop_assert!(segment.text.split_whitespace().count() <= size);
                prop_assert_eq!(&text[segment.start..segment.end], segment.text.as_str());
            }
        }

        #[test]
        fn prop_no_overlap_keeps_every_word(
            text in "[a-z \n]{0,200}",
            size in 1usize..10,
        ) {
            let chunker = Chunker::new(size, 0).unwrap();
            let rebuilt = reassemble(&chunker.chunk(&text));
            let expected: Vec<&str> = text.split_whitespace().collect();
            let actual: Vec<&str> = rebuilt.split_whitespace().collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
