use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    /// The reference transcript addresses more words than the hypothesis
    /// diff can index. Fatal for the job; no retry.
    #[error("transcript/audio mismatch: {message}")]
    InputMismatch { message: String },
    /// A multipass chunk's audio range is too short or too long to
    /// re-decode. Recovered by skipping that chunk's repair.
    #[error("chunk duration {duration:.2}s outside realignable range [{min:.2}s, {max:.2}s]")]
    DegenerateChunk { duration: f64, min: f64, max: f64 },
    #[error("recognition failed while {context}: {message}")]
    Recognition {
        context: &'static str,
        message: String,
    },
    #[error("unsupported audio format: {message}")]
    AudioFormat { message: String },
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AlignError {
    pub(crate) fn input_mismatch(message: impl Into<String>) -> Self {
        Self::InputMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn degenerate_chunk(duration: f64, min: f64, max: f64) -> Self {
        Self::DegenerateChunk { duration, min, max }
    }

    /// Constructor for recognition-engine implementations.
    pub fn recognition(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Recognition {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn audio_format(message: impl Into<String>) -> Self {
        Self::AudioFormat {
            message: message.into(),
        }
    }

    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// True for the recoverable degenerate-chunk case; the multipass stage
    /// skips such chunks instead of failing the job.
    pub fn is_degenerate_chunk(&self) -> bool {
        matches!(self, Self::DegenerateChunk { .. })
    }
}
