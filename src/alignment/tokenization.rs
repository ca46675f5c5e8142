use std::sync::OnceLock;

use regex::Regex;

use crate::pipeline::traits::Vocabulary;
use crate::types::Token;

/// Normalized-form placeholder for transcript words the model's vocabulary
/// does not contain.
pub const OOV_TERM: &str = "<unk>";

/// Maximal runs of word characters; an internal straight or curly apostrophe
/// stays inside the word, so "I'm" is one token.
fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w(?:\w|['’]\w)*").expect("static word pattern"))
}

/// Two parallel representations of one transcript: the normalized token
/// sequence the recognizer is matched against, and the human-legible text
/// the offsets point back into.
#[derive(Debug, Clone)]
pub struct MetaSentence {
    raw: String,
    tokens: Vec<Token>,
}

impl MetaSentence {
    pub fn new(raw: &str, vocab: &dyn Vocabulary) -> Self {
        Self {
            raw: raw.to_string(),
            tokens: tokenize(raw, vocab),
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The normalized forms, in reference order.
    pub fn normalized_sequence(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.normalized.as_str()).collect()
    }

    /// The raw text spans the tokens were cut from.
    pub fn display_sequence(&self) -> Vec<String> {
        let boundaries = char_boundaries(&self.raw);
        self.tokens
            .iter()
            .map(|t| self.raw[boundaries[t.start_offset]..boundaries[t.end_offset]].to_string())
            .collect()
    }

    pub fn text_offsets(&self) -> Vec<(usize, usize)> {
        self.tokens
            .iter()
            .map(|t| (t.start_offset, t.end_offset))
            .collect()
    }
}

fn tokenize(raw: &str, vocab: &dyn Vocabulary) -> Vec<Token> {
    let mut tokens = Vec::new();
    // matches come back in byte offsets; the tokens carry codepoint offsets
    let mut char_idx = 0usize;
    let mut byte_idx = 0usize;
    for m in word_pattern().find_iter(raw) {
        char_idx += raw[byte_idx..m.start()].chars().count();
        let char_len = m.as_str().chars().count();
        tokens.push(Token {
            start_offset: char_idx,
            end_offset: char_idx + char_len,
            normalized: normalize(m.as_str(), vocab),
        });
        char_idx += char_len;
        byte_idx = m.end();
    }
    tokens
}

/// Lowercase, straighten curly apostrophes, then substitute the OOV sentinel
/// for anything the vocabulary does not know.
fn normalize(word: &str, vocab: &dyn Vocabulary) -> String {
    let norm = word.to_lowercase().replace('’', "'");
    if !norm.is_empty() && !vocab.find_word(&norm) {
        return OOV_TERM.to_string();
    }
    norm
}

/// Byte offset of every codepoint boundary in `s`, including the end.
fn char_boundaries(s: &str) -> Vec<usize> {
    let mut boundaries: Vec<usize> = s.char_indices().map(|(b, _)| b).collect();
    boundaries.push(s.len());
    boundaries
}

/// Slice `s` by codepoint offsets. `None` when the offsets fall outside the
/// string.
pub(crate) fn char_span(s: &str, start: usize, end: usize) -> Option<&str> {
    if start > end {
        return None;
    }
    let boundaries = char_boundaries(s);
    let byte_start = *boundaries.get(start)?;
    let byte_end = *boundaries.get(end)?;
    s.get(byte_start..byte_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SetVocab(Vec<&'static str>);

    impl Vocabulary for SetVocab {
        fn find_word(&self, token: &str) -> bool {
            self.0.contains(&token)
        }
    }

    struct AllKnown;

    impl Vocabulary for AllKnown {
        fn find_word(&self, _token: &str) -> bool {
            true
        }
    }

    #[test]
    fn splits_on_word_runs_and_lowercases() {
        let ms = MetaSentence::new("She climbed ON the bed", &AllKnown);
        assert_eq!(
            ms.normalized_sequence(),
            ["she", "climbed", "on", "the", "bed"]
        );
        assert_eq!(ms.display_sequence(), ["She", "climbed", "ON", "the", "bed"]);
    }

    #[test]
    fn internal_apostrophe_is_one_token() {
        let ms = MetaSentence::new("I'm here, don’t leave", &AllKnown);
        assert_eq!(ms.normalized_sequence(), ["i'm", "here", "don't", "leave"]);
    }

    #[test]
    fn curly_apostrophe_normalized_before_lookup() {
        // vocabulary only knows the straight-apostrophe form
        let vocab = SetVocab(vec!["don't"]);
        let ms = MetaSentence::new("don’t", &vocab);
        assert_eq!(ms.normalized_sequence(), ["don't"]);
    }

    #[test]
    fn unknown_words_become_the_oov_sentinel() {
        let vocab = SetVocab(vec!["the", "cat"]);
        let ms = MetaSentence::new("the Xylomancer cat", &vocab);
        assert_eq!(ms.normalized_sequence(), ["the", OOV_TERM, "cat"]);
        // display text keeps the original spelling
        assert_eq!(ms.display_sequence()[1], "Xylomancer");
    }

    #[test]
    fn offsets_are_codepoint_offsets() {
        let raw = "café naïve";
        let ms = MetaSentence::new(raw, &AllKnown);
        let offsets = ms.text_offsets();
        assert_eq!(offsets, [(0, 4), (5, 10)]);
        assert_eq!(ms.display_sequence(), ["café", "naïve"]);
    }

    #[test]
    fn offsets_are_monotonic_and_in_bounds() {
        let raw = "one, two...  three!";
        let ms = MetaSentence::new(raw, &AllKnown);
        let total = raw.chars().count();
        let mut prev_end = 0;
        for (start, end) in ms.text_offsets() {
            assert!(start >= prev_end);
            assert!(start <= end);
            assert!(end <= total);
            prev_end = end;
        }
    }

    #[test]
    fn tokenization_is_idempotent() {
        let raw = "She climbed on the bed and jumped on the mattress";
        let a = MetaSentence::new(raw, &AllKnown);
        let b = MetaSentence::new(raw, &AllKnown);
        assert_eq!(a.tokens(), b.tokens());
    }

    #[test]
    fn empty_and_punctuation_only_input_yield_no_tokens() {
        assert!(MetaSentence::new("", &AllKnown).is_empty());
        assert!(MetaSentence::new("?!... --", &AllKnown).is_empty());
    }

    #[test]
    fn short_sequences_tokenize_without_panics() {
        assert_eq!(MetaSentence::new("one", &AllKnown).len(), 1);
        assert_eq!(MetaSentence::new("one two", &AllKnown).len(), 2);
    }

    #[test]
    fn char_span_slices_by_codepoint() {
        let s = "café naïve";
        assert_eq!(char_span(s, 0, 4), Some("café"));
        assert_eq!(char_span(s, 5, 10), Some("naïve"));
        assert_eq!(char_span(s, 5, 99), None);
        assert_eq!(char_span(s, 7, 5), None);
    }
}
