pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
#[cfg(feature = "vosk-backend")]
pub mod vosk;

pub use alignment::tokenization::{MetaSentence, OOV_TERM};
pub use audio::{MemoryAudioSource, WavFileSource};
pub use config::AlignConfig;
pub use error::AlignError;
pub use pipeline::builder::ForcedAlignerBuilder;
pub use pipeline::runtime::{ForcedAligner, Progress};
pub use pipeline::traits::{AudioSource, RecognitionEngine, RecognizerSession, Vocabulary};
pub use types::{AlignmentStats, RecognizedWord, Token, Transcription, Word, WordCase};
#[cfg(feature = "vosk-backend")]
pub use vosk::VoskBackend;
