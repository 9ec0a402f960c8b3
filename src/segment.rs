//! Word-window segmentation of raw notes.

/// A window of consecutive words from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The window's words joined by single spaces
    pub text: String,
    /// Index of the window's first word in the whole input
    pub start_word_index: usize,
}

/// Splits text into overlapping windows of whitespace-delimited words.
///
/// Iteration is lazy and can be restarted by calling [`Segmenter::chunks`]
/// again. Window `i + 1` starts `chunk_size - overlap` words after window `i`,
/// and the last window always ends on the last word.
#[derive(Debug, Clone)]
pub struct Segmenter<'a> {
    words: Vec<&'a str>,
    chunk_size: usize,
    stride: usize,
}

impl<'a> Segmenter<'a> {
    /// A zero `chunk_size` is treated as 1; an overlap that leaves no forward
    /// progress is clamped to a one-word stride.
    pub fn new(text: &'a str, chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            words: text.split_whitespace().collect(),
            chunk_size,
            stride: chunk_size.saturating_sub(overlap).max(1),
        }
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn chunks(&self) -> Chunks<'_, 'a> {
        Chunks {
            segmenter: self,
            next_start: Some(0).filter(|_| !self.words.is_empty()),
        }
    }
}

pub struct Chunks<'s, 'a> {
    segmenter: &'s Segmenter<'a>,
    next_start: Option<usize>,
}

impl Iterator for Chunks<'_, '_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        let start = self.next_start?;
        let words = &self.segmenter.words;
        let end = (start + self.segmenter.chunk_size).min(words.len());

        self.next_start = if end == words.len() {
            None
        } else {
            Some(start + self.segmenter.stride)
        };

        Some(Chunk {
            text: words[start..end].join(" "),
            start_word_index: start,
        })
    }
}

/// Collect all windows of `text` in one go.
pub fn segment(text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    Segmenter::new(text, chunk_size, overlap).chunks().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(segment("", 1500, 200).is_empty());
        assert!(segment("  \n\t ", 1500, 200).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = segment("the   quick\nbrown fox", 1500, 200);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "the quick brown fox");
        assert_eq!(chunks[0].start_word_index, 0);
    }

    #[test]
    fn exact_chunk_size_is_one_chunk() {
        assert_eq!(segment(&words(10), 10, 2).len(), 1);
    }

    #[test]
    fn windows_overlap_by_requested_words() {
        let chunks = segment(&words(24), 10, 3);
        let starts: Vec<usize> = chunks.iter().map(|c| c.start_word_index).collect();
        assert_eq!(starts, vec![0, 7, 14]);
        assert!(chunks[1].text.starts_with("w7 w8 w9"));
        assert!(chunks[0].text.ends_with("w7 w8 w9"));
        assert!(chunks[2].text.ends_with("w23"));
    }

    #[test]
    fn no_trailing_chunk_after_end_is_reached() {
        // 0..10 and 7..17 already cover all 17 words.
        let chunks = segment(&words(17), 10, 3);
        assert_eq!(chunks.len(), 2);
        assert!(chunks[1].text.ends_with("w16"));
    }

    #[test]
    fn iteration_restarts() {
        let text = words(30);
        let seg = Segmenter::new(&text, 10, 2);
        let first: Vec<Chunk> = seg.chunks().collect();
        let second: Vec<Chunk> = seg.chunks().collect();
        assert_eq!(first, second);
        assert_eq!(seg.word_count(), 30);
    }

    #[test]
    fn degenerate_overlap_still_terminates() {
        let chunks = segment(&words(5), 3, 10);
        let starts: Vec<usize> = chunks.iter().map(|c| c.start_word_index).collect();
        assert_eq!(starts, vec![0, 1, 2]);
        assert_eq!(segment(&words(3), 0, 0).len(), 3);
    }

    proptest! {
        #[test]
        fn chunk_count_matches_formula(n in 1usize..400, s in 2usize..60, o_frac in 0usize..100) {
            let o = (s - 1) * o_frac / 100;
            let chunks = segment(&words(n), s, o);
            let expected = if n > s {
                (n - s).div_ceil(s - o) + 1
            } else {
                1
            };
            prop_assert_eq!(chunks.len(), expected);
            let last = chunks.last().unwrap();
            let tail = format!("w{}", n - 1);
            prop_assert!(last.text.ends_with(&tail));
        }
    }
}
