use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::error::AlignError;
use crate::pipeline::traits::{RecognitionEngine, RecognizerSession, Vocabulary};
use crate::types::RecognizedWord;

/// Vosk-backed recognition engine and vocabulary, sharing one loaded model.
/// Wrap it in an [`Arc`] to hand the same model to both builder slots.
pub struct VoskBackend {
    // vosk_model_find_word takes a mutable handle
    model: Mutex<vosk::Model>,
}

impl VoskBackend {
    pub fn open(model_dir: impl AsRef<Path>) -> Result<Self, AlignError> {
        let path = model_dir.as_ref().to_string_lossy().into_owned();
        let model = vosk::Model::new(path.clone())
            .ok_or_else(|| AlignError::recognition("loading model", format!("cannot load {path}")))?;
        Ok(Self {
            model: Mutex::new(model),
        })
    }
}

impl RecognitionEngine for VoskBackend {
    fn new_session(
        &self,
        sample_rate_hz: u32,
        grammar: Option<&[String]>,
    ) -> Result<Box<dyn RecognizerSession>, AlignError> {
        let model = self
            .model
            .lock()
            .map_err(|e| AlignError::recognition("locking model", e.to_string()))?;
        let mut recognizer = match grammar {
            Some(phrases) => vosk::Recognizer::new_with_grammar(&model, sample_rate_hz as f32, phrases),
            None => vosk::Recognizer::new(&model, sample_rate_hz as f32),
        }
        .ok_or_else(|| AlignError::recognition("creating session", "recognizer init failed"))?;
        recognizer.set_words(true);
        Ok(Box::new(VoskSession { recognizer }))
    }
}

impl Vocabulary for VoskBackend {
    fn find_word(&self, token: &str) -> bool {
        match self.model.lock() {
            Ok(mut model) => model.find_word(token).is_some(),
            Err(_) => false,
        }
    }
}

impl RecognitionEngine for Arc<VoskBackend> {
    fn new_session(
        &self,
        sample_rate_hz: u32,
        grammar: Option<&[String]>,
    ) -> Result<Box<dyn RecognizerSession>, AlignError> {
        (**self).new_session(sample_rate_hz, grammar)
    }
}

impl Vocabulary for Arc<VoskBackend> {
    fn find_word(&self, token: &str) -> bool {
        (**self).find_word(token)
    }
}

struct VoskSession {
    recognizer: vosk::Recognizer,
}

impl RecognizerSession for VoskSession {
    fn accept(&mut self, frames: &[i16]) -> Result<bool, AlignError> {
        match self.recognizer.accept_waveform(frames) {
            vosk::DecodingState::Finalized => Ok(true),
            vosk::DecodingState::Running => Ok(false),
            vosk::DecodingState::Failed => Err(AlignError::recognition(
                "decoding waveform",
                "recognizer entered failed state",
            )),
        }
    }

    fn result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
        Ok(convert(self.recognizer.result().single()))
    }

    fn final_result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
        Ok(convert(self.recognizer.final_result().single()))
    }
}

fn convert(result: Option<vosk::CompleteResultSingle>) -> Vec<RecognizedWord> {
    result
        .map(|single| {
            single
                .result
                .into_iter()
                .map(|word| RecognizedWord {
                    word: word.word.to_string(),
                    start: word.start as f64,
                    end: word.end as f64,
                    conf: word.conf,
                })
                .collect()
        })
        .unwrap_or_default()
}
