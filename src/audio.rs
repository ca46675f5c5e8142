use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AlignError;
use crate::pipeline::traits::AudioSource;

/// WAV-file-backed audio source. Only mono 16-bit integer PCM is accepted;
/// anything else is rejected at open time, before any alignment work starts.
pub struct WavFileSource {
    reader: hound::WavReader<BufReader<File>>,
}

impl std::fmt::Debug for WavFileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WavFileSource").finish_non_exhaustive()
    }
}

impl WavFileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AlignError> {
        let reader = hound::WavReader::open(path).map_err(|e| from_hound("opening wav file", e))?;
        let spec = reader.spec();
        if spec.channels != 1 {
            return Err(AlignError::audio_format(format!(
                "expected mono audio, got {} channels",
                spec.channels
            )));
        }
        if spec.bits_per_sample != 16 || spec.sample_format != hound::SampleFormat::Int {
            return Err(AlignError::audio_format(format!(
                "expected 16-bit integer PCM, got {}-bit {:?}",
                spec.bits_per_sample, spec.sample_format
            )));
        }
        Ok(Self { reader })
    }
}

impl AudioSource for WavFileSource {
    fn read(&mut self, max_frames: usize) -> Result<Vec<i16>, AlignError> {
        let mut frames = Vec::with_capacity(max_frames);
        for sample in self.reader.samples::<i16>().take(max_frames) {
            frames.push(sample.map_err(|e| from_hound("reading wav samples", e))?);
        }
        Ok(frames)
    }

    fn seek(&mut self, frame: u64) -> Result<(), AlignError> {
        self.reader
            .seek(frame.min(u32::MAX as u64) as u32)
            .map_err(|e| AlignError::io("seeking wav file", e))
    }

    fn total_frames(&self) -> u64 {
        self.reader.duration() as u64
    }

    fn frame_rate(&self) -> u32 {
        self.reader.spec().sample_rate
    }

    fn channels(&self) -> u16 {
        self.reader.spec().channels
    }

    fn bits_per_sample(&self) -> u16 {
        self.reader.spec().bits_per_sample
    }
}

/// In-memory mono PCM source, for callers that already hold raw frames.
pub struct MemoryAudioSource {
    frames: Vec<i16>,
    frame_rate: u32,
    pos: usize,
}

impl MemoryAudioSource {
    pub fn new(frames: Vec<i16>, frame_rate: u32) -> Self {
        Self {
            frames,
            frame_rate,
            pos: 0,
        }
    }
}

impl AudioSource for MemoryAudioSource {
    fn read(&mut self, max_frames: usize) -> Result<Vec<i16>, AlignError> {
        let end = (self.pos + max_frames).min(self.frames.len());
        let out = self.frames[self.pos..end].to_vec();
        self.pos = end;
        Ok(out)
    }

    fn seek(&mut self, frame: u64) -> Result<(), AlignError> {
        self.pos = (frame as usize).min(self.frames.len());
        Ok(())
    }

    fn total_frames(&self) -> u64 {
        self.frames.len() as u64
    }

    fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    fn channels(&self) -> u16 {
        1
    }

    fn bits_per_sample(&self) -> u16 {
        16
    }
}

fn from_hound(context: &'static str, err: hound::Error) -> AlignError {
    match err {
        hound::Error::IoError(io) => AlignError::io(context, io),
        other => AlignError::audio_format(other.to_string()),
    }
}
