/// Tunables for an alignment job. The defaults reproduce the behavior the
/// multipass stage was calibrated with; they rarely need changing.
#[derive(Debug, Clone)]
pub struct AlignConfig {
    /// Sample rate the recognition model expects; a differing source rate is
    /// logged and passed through to the recognizer as-is.
    pub expected_sample_rate_hz: u32,
    /// Words within this many positions of an unaligned word are marked for
    /// local re-decoding.
    pub realign_radius: usize,
    /// Seconds of audio decoded before a chunk's first timed word.
    pub chunk_lead_in_sec: f64,
    /// Seconds of audio decoded past a chunk's last timed word.
    pub chunk_tail_sec: f64,
    /// Chunks shorter than this are not re-decoded.
    pub min_chunk_sec: f64,
    /// Chunks longer than this are not re-decoded.
    pub max_chunk_sec: f64,
    /// Frames handed to the recognizer per read.
    pub read_frames: usize,
}

impl AlignConfig {
    pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 16_000;
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self {
            expected_sample_rate_hz: Self::DEFAULT_SAMPLE_RATE_HZ,
            realign_radius: 3,
            chunk_lead_in_sec: 0.5,
            chunk_tail_sec: 2.0,
            min_chunk_sec: 0.75,
            max_chunk_sec: 60.0,
            read_frames: 4000,
        }
    }
}
