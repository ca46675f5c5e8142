use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignError;

/// A normalized, offset-tagged unit produced from raw transcript text.
///
/// Offsets are codepoint offsets into the raw transcript; every token maps
/// back to exactly one contiguous span of the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub start_offset: usize,
    pub end_offset: usize,
    /// Lowercased, vocabulary-checked form; the out-of-vocabulary sentinel
    /// when the model does not know the word.
    pub normalized: String,
}

/// One word-level record from a recognition pass, with timing in seconds
/// and the decoder's confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    pub conf: f32,
}

/// Outcome of aligning one reference token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordCase {
    Success,
    NotFoundInAudio,
    NotFoundInTranscript,
}

/// Per-reference-token alignment result.
///
/// `start_offset`/`end_offset` are codepoint offsets into the transcript and
/// never change after creation; the alignment-derived fields (case, aligned
/// word, confidence, timing) may be exchanged between words by the adjacency
/// optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub case: WordCase,
    pub start_offset: usize,
    pub end_offset: usize,
    pub word: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aligned_word: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conf: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip)]
    pub duration: Option<f64>,
    #[serde(skip)]
    pub needs_realign: bool,
}

impl Word {
    pub fn success(
        start_offset: usize,
        end_offset: usize,
        word: String,
        recognized: &RecognizedWord,
    ) -> Self {
        Self {
            case: WordCase::Success,
            start_offset,
            end_offset,
            word,
            aligned_word: Some(recognized.word.clone()),
            conf: Some(recognized.conf),
            start: Some(recognized.start),
            end: Some(recognized.end),
            duration: Some(round2(recognized.end - recognized.start)),
            needs_realign: false,
        }
    }

    pub fn not_found_in_audio(start_offset: usize, end_offset: usize, word: String) -> Self {
        Self {
            case: WordCase::NotFoundInAudio,
            start_offset,
            end_offset,
            word,
            aligned_word: None,
            conf: None,
            start: None,
            end: None,
            duration: None,
            needs_realign: true,
        }
    }

    pub fn not_found_in_transcript(start_offset: usize, end_offset: usize, word: String) -> Self {
        Self {
            case: WordCase::NotFoundInTranscript,
            start_offset,
            end_offset,
            word,
            aligned_word: None,
            conf: None,
            start: None,
            end: None,
            duration: None,
            needs_realign: false,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.case, WordCase::Success)
    }

    pub fn is_not_found_in_audio(&self) -> bool {
        matches!(self.case, WordCase::NotFoundInAudio)
    }

    pub fn is_not_found_in_transcript(&self) -> bool {
        matches!(self.case, WordCase::NotFoundInTranscript)
    }

    pub(crate) fn shift_offsets(&mut self, by: usize) {
        self.start_offset += by;
        self.end_offset += by;
    }

    /// True if `self` and `other` refer to the same word at roughly the same
    /// position in the audio (start times within 10% of the summed durations).
    pub fn corresponds(&self, other: &Word) -> bool {
        if self.word != other.word {
            return false;
        }
        match (self.start, other.start, self.duration, other.duration) {
            (Some(a), Some(b), Some(da), Some(db)) if da + db > 0.0 => {
                (a - b).abs() / (da + db) < 0.1
            }
            _ => false,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Word counts by alignment outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AlignmentStats {
    pub total: usize,
    pub success: usize,
    pub not_found_in_audio: usize,
    pub not_found_in_transcript: usize,
}

impl AlignmentStats {
    /// Words the aligner could not place in the audio, either way.
    pub fn unaligned(&self) -> usize {
        self.not_found_in_audio + self.not_found_in_transcript
    }
}

/// The final product of an alignment job: the original transcript plus one
/// `Word` per reference token. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    pub transcript: String,
    pub words: Vec<Word>,
}

impl Transcription {
    pub fn new(transcript: String, words: Vec<Word>) -> Self {
        Self { transcript, words }
    }

    pub fn to_json(&self) -> Result<String, AlignError> {
        serde_json::to_string(self).map_err(|e| AlignError::json("serializing transcription", e))
    }

    pub fn to_json_pretty(&self) -> Result<String, AlignError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AlignError::json("serializing transcription", e))
    }

    pub fn from_json(data: &str) -> Result<Self, AlignError> {
        let mut parsed: Self = serde_json::from_str(data)
            .map_err(|e| AlignError::json("parsing transcription", e))?;
        for word in &mut parsed.words {
            if let (Some(start), Some(end)) = (word.start, word.end) {
                word.duration = Some(round2(end - start));
            }
        }
        Ok(parsed)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AlignError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignError::io("reading transcription file", e))?;
        Self::from_json(&data)
    }

    pub fn stats(&self) -> AlignmentStats {
        let mut stats = AlignmentStats {
            total: self.words.len(),
            ..AlignmentStats::default()
        };
        for word in &self.words {
            match word.case {
                WordCase::Success => stats.success += 1,
                WordCase::NotFoundInAudio => stats.not_found_in_audio += 1,
                WordCase::NotFoundInTranscript => stats.not_found_in_transcript += 1,
            }
        }
        stats
    }
}
