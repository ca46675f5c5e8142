use std::ops::Range;

use crate::alignment::diff_align;
use crate::alignment::tokenization::{char_span, MetaSentence, OOV_TERM};
use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::pipeline::recognition;
use crate::pipeline::traits::{AudioSource, RecognitionEngine, Vocabulary};
use crate::types::Word;

/// What the repair pass did, for the job's closing log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RealignSummary {
    pub chunks: usize,
    pub realigned: usize,
    pub skipped: usize,
}

/// Single repair pass over the first-pass alignment: re-decode each run of
/// unsuccessfully aligned words with a grammar constrained to the local
/// text, and splice the improved sub-sequence back in. Words still
/// unresolved afterwards stay as they are.
pub(crate) fn realign(
    words: &mut Vec<Word>,
    transcript: &str,
    engine: &dyn RecognitionEngine,
    vocabulary: &dyn Vocabulary,
    audio: &mut dyn AudioSource,
    config: &AlignConfig,
) -> Result<RealignSummary, AlignError> {
    mark_for_realign(words, config.realign_radius);
    let chunks = marked_runs(words);
    let mut summary = RealignSummary {
        chunks: chunks.len(),
        ..RealignSummary::default()
    };

    // back to front, so earlier ranges stay valid if a splice changes length
    for range in chunks.into_iter().rev() {
        match realign_chunk(
            &words[range.clone()],
            transcript,
            engine,
            vocabulary,
            audio,
            config,
        ) {
            Ok(replacement) => {
                words.splice(range, replacement);
                summary.realigned += 1;
            }
            Err(err) if err.is_degenerate_chunk() => {
                tracing::debug!(chunk = ?range, %err, "skipping chunk realignment");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(summary)
}

/// Mark every word within `radius` positions of an unsuccessfully aligned
/// word. Maximal contiguous marked runs become the chunks to re-decode.
fn mark_for_realign(words: &mut [Word], radius: usize) {
    let unaligned: Vec<usize> = words
        .iter()
        .enumerate()
        .filter(|(_, w)| !w.is_success())
        .map(|(i, _)| i)
        .collect();
    for i in unaligned {
        let lo = i.saturating_sub(radius);
        let hi = (i + radius + 1).min(words.len());
        for word in &mut words[lo..hi] {
            word.needs_realign = true;
        }
    }
}

fn marked_runs(words: &[Word]) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut start = None;
    for (i, word) in words.iter().enumerate() {
        if word.needs_realign {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            runs.push(s..i);
        }
    }
    if let Some(s) = start {
        runs.push(s..words.len());
    }
    runs
}

fn realign_chunk(
    chunk: &[Word],
    transcript: &str,
    engine: &dyn RecognitionEngine,
    vocabulary: &dyn Vocabulary,
    audio: &mut dyn AudioSource,
    config: &AlignConfig,
) -> Result<Vec<Word>, AlignError> {
    let first = match chunk.first() {
        Some(word) => word,
        None => return Ok(Vec::new()),
    };
    let last = chunk.last().unwrap_or(first);

    // boundary words without timing sit at the sequence edge: default to the
    // start or end of the file
    let start_sec = first.start.unwrap_or(0.0);
    let end_sec = last.end.unwrap_or_else(|| audio.duration_sec());

    let span_start = first.start_offset;
    let span = char_span(transcript, span_start, last.end_offset).ok_or_else(|| {
        AlignError::input_mismatch("chunk offsets fall outside the transcript")
    })?;
    let sentence = MetaSentence::new(span, vocabulary);
    let grammar = local_grammar(&sentence);

    let mut hypothesis =
        recognition::constrained_pass(engine, audio, start_sec, end_sec, &grammar, config)?;

    // the decoder may pick up fragments of the padded window; keep at most
    // one spare word and drop boundary words that do not match expectations
    let expected = sentence.normalized_sequence();
    hypothesis.truncate(expected.len() + 1);
    if let (Some(head), Some(&want)) = (hypothesis.first(), expected.first()) {
        if head.word != want {
            tracing::debug!(got = %head.word, want, "dropping unmatched leading hypothesis word");
            hypothesis.remove(0);
        }
    }
    if let (Some(tail), Some(&want)) = (hypothesis.last(), expected.last()) {
        if tail.word != want && hypothesis.len() > 1 {
            tracing::debug!(got = %tail.word, want, "dropping unmatched trailing hypothesis word");
            hypothesis.pop();
        }
    }

    let mut replacement = diff_align::align(&hypothesis, &sentence)?;
    for word in &mut replacement {
        word.shift_offsets(span_start);
    }
    Ok(replacement)
}

/// Constrained grammar for a chunk: the local token phrase plus the
/// decoder's out-of-vocabulary catch-all.
fn local_grammar(sentence: &MetaSentence) -> Vec<String> {
    let phrase = sentence
        .normalized_sequence()
        .iter()
        .map(|t| if *t == OOV_TERM { "[unk]" } else { *t })
        .collect::<Vec<_>>()
        .join(" ");
    vec![phrase, "[unk]".to_string()]
}
