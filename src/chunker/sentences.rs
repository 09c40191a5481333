//! Sentence boundary detection

use unicode_segmentation::UnicodeSegmentation;

/// Trait for sentence tokenizers
pub trait SentenceSplitter {
    /// Split text into ordered sentences
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Words whose trailing period does not end a sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e", "a.m", "p.m",
    "fig", "inc", "ltd", "co", "corp", "dept", "approx", "gen", "gov", "sen", "rep",
];

/// Unicode (UAX #29) sentence boundaries, trimmed, empty sentences dropped
///
/// A boundary right after a common abbreviation or a single-letter initial
/// ("Dr.", "J.") is not treated as a sentence end.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn sentences<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;

        let mut segments = text.split_sentence_bound_indices().peekable();
        while let Some((offset, segment)) = segments.next() {
            let end = offset + segment.len();
            if segments.peek().is_some() && ends_with_abbreviation(segment) {
                continue;
            }

            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            start = end;
        }

        sentences
    }
}

fn ends_with_abbreviation(segment: &str) -> bool {
    let Some(word) = segment.trim_end().strip_suffix('.') else {
        return false;
    };
    let last = word
        .rsplit(|c: char| c.is_whitespace() || c == '(' || c == '"')
        .next()
        .unwrap_or("");

    let mut chars = last.chars();
    let initial = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic() && c.is_uppercase());

    initial
        || ABBREVIATIONS
            .iter()
            .any(|abbr| abbr.eq_ignore_ascii_case(last))
}
