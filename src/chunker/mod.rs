//! Chunking module - sentence-aligned passage splitting
//!
//! Sentences are accumulated into a buffer until the buffer's whitespace
//! word count reaches `max_tokens`; the buffer is then emitted as one passage.
//! A sentence is never split, so a passage may exceed `max_tokens` when a
//! single sentence does.

mod sentences;

pub use sentences::{SentenceSplitter, UnicodeSentenceSplitter};

/// Default passage size in whitespace-delimited words
pub const DEFAULT_MAX_TOKENS: usize = 200;

/// Sentence-aligned chunker
pub struct SentenceChunker<S = UnicodeSentenceSplitter> {
    splitter: S,
    max_tokens: usize,
}

impl SentenceChunker {
    pub fn new(max_tokens: usize) -> Self {
        Self::with_splitter(UnicodeSentenceSplitter, max_tokens)
    }
}

impl Default for SentenceChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TOKENS)
    }
}

impl<S: SentenceSplitter> SentenceChunker<S> {
    /// Create a chunker over a custom sentence tokenizer
    pub fn with_splitter(splitter: S, max_tokens: usize) -> Self {
        Self {
            splitter,
            max_tokens,
        }
    }

    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    /// Split text into ordered passage texts
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let mut passages = Vec::new();
        let mut buffer: Vec<&str> = Vec::new();
        // Running word count of `buffer.join(" ")`; sentences arrive trimmed
        // so joining never merges or adds words.
        let mut words = 0usize;

        for sentence in self.splitter.sentences(text) {
            let sentence = sentence.trim();
            if sentence.is_empty() {
                continue;
            }

            buffer.push(sentence);
            words += sentence.split_whitespace().count();

            if words >= self.max_tokens {
                passages.push(buffer.join(" "));
                buffer.clear();
                words = 0;
            }
        }

        if !buffer.is_empty() {
            passages.push(buffer.join(" "));
        }

        passages
    }
}

/// Chunk text with the default sentence tokenizer
pub fn chunk(text: &str, max_tokens: usize) -> Vec<String> {
    SentenceChunker::new(max_tokens).chunk(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_count(s: &str) -> usize {
        s.split_whitespace().count()
    }

    #[test]
    fn test_empty_text_yields_no_passages() {
        assert!(chunk("", 10).is_empty());
        assert!(chunk("   \n\t ", 10).is_empty());
    }

    #[test]
    fn test_short_text_is_single_passage() {
        let passages = chunk("AI is fascinating. Privacy matters for AI.", 100);
        assert_eq!(passages, vec!["AI is fascinating. Privacy matters for AI."]);
    }

    #[test]
    fn test_passages_close_at_word_budget() {
        // Sentences of 4, 4, 3, 6 and 2 words
        let text = "One two three four. Five six seven eight. Nine ten eleven. \
                    Twelve thirteen fourteen fifteen sixteen seventeen. Eighteen nineteen.";
        let passages = chunk(text, 10);

        assert_eq!(
            passages,
            vec![
                "One two three four. Five six seven eight. Nine ten eleven.",
                "Twelve thirteen fourteen fifteen sixteen seventeen. Eighteen nineteen.",
            ]
        );
        for passage in &passages[..passages.len() - 1] {
            assert!(word_count(passage) >= 10);
        }
    }

    #[test]
    fn test_never_splits_inside_sentence() {
        let sentences = [
            "Alpha beta gamma delta epsilon.",
            "Zeta eta theta.",
            "Iota kappa lambda mu nu xi omicron pi rho sigma tau upsilon.",
            "Phi chi.",
            "Psi omega.",
        ];
        let text = sentences.join(" ");
        let passages = chunk(&text, 10);

        // Re-joining passages reproduces the sentence sequence exactly
        assert_eq!(passages.join(" "), text);
        for passage in &passages {
            let starts_on_boundary = sentences.iter().any(|s| passage.starts_with(s));
            let ends_on_boundary = sentences.iter().any(|s| passage.ends_with(s));
            assert!(starts_on_boundary && ends_on_boundary, "split mid-sentence: {passage}");
        }
    }

    #[test]
    fn test_oversized_sentence_is_kept_whole() {
        let long = "w ".repeat(25).trim().to_string() + ".";
        let text = format!("Short one. {long} Tail here.");
        let passages = chunk(&text, 10);

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0], format!("Short one. {long}"));
        assert_eq!(passages[1], "Tail here.");
    }

    #[test]
    fn test_chunking_is_deterministic() {
        let text = "The index stores vectors. The metadata stores text. \
                    Both must stay aligned! Otherwise retrieval breaks? Yes.";
        for max_tokens in [1, 3, 5, 200] {
            assert_eq!(chunk(text, max_tokens), chunk(text, max_tokens));
        }
    }

    #[test]
    fn test_newlines_collapse_between_sentences() {
        let passages = chunk("First line here.\n\nSecond line here.", 100);
        assert_eq!(passages, vec!["First line here. Second line here."]);
    }

    #[test]
    fn test_abbreviation_does_not_split_passage() {
        let passages = chunk("Dr. Smith met Mr. Jones at 3 p.m. today. They talked.", 3);
        assert_eq!(
            passages,
            vec!["Dr. Smith met Mr. Jones at 3 p.m. today.", "They talked."]
        );
    }

    #[test]
    fn test_custom_splitter() {
        struct LineSplitter;
        impl SentenceSplitter for LineSplitter {
            fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
                text.lines().collect()
            }
        }

        let chunker = SentenceChunker::with_splitter(LineSplitter, 2);
        let passages = chunker.chunk("a b\nc\nd e f\n\ng");
        assert_eq!(passages, vec!["a b", "c d e f", "g"]);
    }
}
