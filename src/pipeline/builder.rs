use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::pipeline::runtime::{ForcedAligner, ForcedAlignerParts};
use crate::pipeline::traits::{RecognitionEngine, Vocabulary};

/// Assembles a [`ForcedAligner`] from its injected capabilities. Both the
/// recognition engine and the vocabulary are required; there are no ambient
/// defaults.
pub struct ForcedAlignerBuilder {
    config: AlignConfig,
    engine: Option<Box<dyn RecognitionEngine>>,
    vocabulary: Option<Box<dyn Vocabulary>>,
}

impl ForcedAlignerBuilder {
    pub fn new(config: AlignConfig) -> Self {
        Self {
            config,
            engine: None,
            vocabulary: None,
        }
    }

    pub fn with_engine(mut self, engine: Box<dyn RecognitionEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn with_vocabulary(mut self, vocabulary: Box<dyn Vocabulary>) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn build(self) -> Result<ForcedAligner, AlignError> {
        let engine = self
            .engine
            .ok_or_else(|| AlignError::invalid_input("no recognition engine provided"))?;
        let vocabulary = self
            .vocabulary
            .ok_or_else(|| AlignError::invalid_input("no vocabulary provided"))?;
        Ok(ForcedAligner::from_parts(ForcedAlignerParts {
            engine,
            vocabulary,
            config: self.config,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::traits::RecognizerSession;
    use crate::types::RecognizedWord;

    struct NullEngine;

    impl RecognitionEngine for NullEngine {
        fn new_session(
            &self,
            _sample_rate_hz: u32,
            _grammar: Option<&[String]>,
        ) -> Result<Box<dyn RecognizerSession>, AlignError> {
            Ok(Box::new(NullSession))
        }
    }

    struct NullSession;

    impl RecognizerSession for NullSession {
        fn accept(&mut self, _frames: &[i16]) -> Result<bool, AlignError> {
            Ok(false)
        }

        fn result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
            Ok(Vec::new())
        }

        fn final_result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
            Ok(Vec::new())
        }
    }

    struct AllKnown;

    impl Vocabulary for AllKnown {
        fn find_word(&self, _token: &str) -> bool {
            true
        }
    }

    #[test]
    fn build_fails_without_engine() {
        let result = ForcedAlignerBuilder::new(AlignConfig::default())
            .with_vocabulary(Box::new(AllKnown))
            .build();
        assert!(matches!(result, Err(AlignError::InvalidInput { .. })));
    }

    #[test]
    fn build_fails_without_vocabulary() {
        let result = ForcedAlignerBuilder::new(AlignConfig::default())
            .with_engine(Box::new(NullEngine))
            .build();
        assert!(matches!(result, Err(AlignError::InvalidInput { .. })));
    }

    #[test]
    fn build_succeeds_with_both_capabilities() {
        let result = ForcedAlignerBuilder::new(AlignConfig::default())
            .with_engine(Box::new(NullEngine))
            .with_vocabulary(Box::new(AllKnown))
            .build();
        assert!(result.is_ok());
    }
}
