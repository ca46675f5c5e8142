use crate::alignment::diff::{word_diff, DiffOp};
use crate::alignment::tokenization::{MetaSentence, OOV_TERM};
use crate::error::AlignError;
use crate::types::{RecognizedWord, Word};

/// Align a recognition pass against the reference token sequence.
///
/// Every reference token yields exactly one [`Word`]:
/// - a matching hypothesis word marks it `Success` and donates timing and
///   confidence;
/// - a substituted or dropped reference token that is the OOV sentinel marks
///   it `NotFoundInTranscript` (something was spoken there, but it is not a
///   vocabulary word);
/// - any other substituted or dropped reference token marks it
///   `NotFoundInAudio` and flags it for local re-decoding.
///
/// Hypothesis words with no reference counterpart emit nothing.
pub fn align(
    hypothesis: &[RecognizedWord],
    sentence: &MetaSentence,
) -> Result<Vec<Word>, AlignError> {
    let hyp_words: Vec<&str> = hypothesis.iter().map(|w| w.word.as_str()).collect();
    let reference = sentence.normalized_sequence();
    let display = sentence.display_sequence();
    let offsets = sentence.text_offsets();

    let mut out = Vec::with_capacity(reference.len());
    for op in word_diff(&hyp_words, &reference) {
        let b = match op.ref_index() {
            Some(b) => b,
            None => continue,
        };
        let (display_word, (start_offset, end_offset)) = display
            .get(b)
            .zip(offsets.get(b).copied())
            .ok_or_else(|| {
                AlignError::input_mismatch(
                    "reference has more words than the hypothesis diff can address; \
                     the transcript likely contains more text than the audio",
                )
            })?;

        match op {
            DiffOp::Equal { a, .. } => {
                out.push(Word::success(
                    start_offset,
                    end_offset,
                    display_word.clone(),
                    &hypothesis[a],
                ));
            }
            DiffOp::Replace { .. } | DiffOp::RefOnly { .. } => {
                if reference[b] == OOV_TERM {
                    out.push(Word::not_found_in_transcript(
                        start_offset,
                        end_offset,
                        display_word.clone(),
                    ));
                } else {
                    out.push(Word::not_found_in_audio(
                        start_offset,
                        end_offset,
                        display_word.clone(),
                    ));
                }
            }
            DiffOp::HypOnly { .. } => continue,
        }
    }
    Ok(out)
}
