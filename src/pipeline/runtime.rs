use crate::alignment::adjacency;
use crate::alignment::diff_align;
use crate::alignment::multipass;
use crate::alignment::tokenization::MetaSentence;
use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::pipeline::recognition;
use crate::pipeline::traits::{AudioSource, RecognitionEngine, Vocabulary};
use crate::types::{Transcription, Word};

/// Status tags handed to the optional progress callback. Observational
/// only; reporting has no effect on the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// The open first pass is running.
    Transcribing,
    /// The multipass repair stage has begun.
    Aligning,
}

/// Whole-job orchestration: tokenize, first pass, multipass repair,
/// adjacency optimization, result packaging. One instance can serve many
/// jobs; each job runs synchronously on the caller's thread and owns its
/// audio source for the duration.
pub struct ForcedAligner {
    engine: Box<dyn RecognitionEngine>,
    vocabulary: Box<dyn Vocabulary>,
    config: AlignConfig,
}

pub(crate) struct ForcedAlignerParts {
    pub engine: Box<dyn RecognitionEngine>,
    pub vocabulary: Box<dyn Vocabulary>,
    pub config: AlignConfig,
}

impl ForcedAligner {
    pub(crate) fn from_parts(parts: ForcedAlignerParts) -> Self {
        Self {
            engine: parts.engine,
            vocabulary: parts.vocabulary,
            config: parts.config,
        }
    }

    /// Align `transcript` against `audio`. Returns a complete
    /// [`Transcription`]; words the repair stage could not place keep their
    /// unaligned case, which is the expected common outcome, not an error.
    pub fn transcribe(
        &self,
        transcript: &str,
        audio: &mut dyn AudioSource,
        progress: Option<&dyn Fn(Progress)>,
    ) -> Result<Transcription, AlignError> {
        validate_source(audio)?;
        if audio.frame_rate() != self.config.expected_sample_rate_hz {
            tracing::warn!(
                expected_hz = self.config.expected_sample_rate_hz,
                actual_hz = audio.frame_rate(),
                "audio sample rate differs from the model's expected rate; quality may degrade"
            );
        }

        let sentence = MetaSentence::new(transcript, self.vocabulary.as_ref());

        if let Some(report) = progress {
            report(Progress::Transcribing);
        }
        let recognized = recognition::open_pass(self.engine.as_ref(), audio, &self.config)?;
        let mut words = diff_align::align(&recognized, &sentence)?;

        let unaligned = count_unaligned(&words);
        tracing::info!(unaligned, total = words.len(), "first-pass alignment");

        if unaligned > 0 {
            if let Some(report) = progress {
                report(Progress::Aligning);
            }
            let summary = multipass::realign(
                &mut words,
                transcript,
                self.engine.as_ref(),
                self.vocabulary.as_ref(),
                audio,
                &self.config,
            )?;
            tracing::info!(
                chunks = summary.chunks,
                realigned = summary.realigned,
                skipped = summary.skipped,
                unaligned = count_unaligned(&words),
                total = words.len(),
                "second-pass alignment"
            );
        }

        adjacency::optimize(&mut words);

        Ok(Transcription::new(transcript.to_string(), words))
    }
}

fn validate_source(audio: &dyn AudioSource) -> Result<(), AlignError> {
    if audio.channels() != 1 {
        return Err(AlignError::audio_format(format!(
            "expected mono audio, got {} channels",
            audio.channels()
        )));
    }
    if audio.bits_per_sample() != 16 {
        return Err(AlignError::audio_format(format!(
            "expected 16-bit PCM, got {} bits per sample",
            audio.bits_per_sample()
        )));
    }
    Ok(())
}

fn count_unaligned(words: &[Word]) -> usize {
    words.iter().filter(|w| !w.is_success()).count()
}
