use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::pipeline::traits::{AudioSource, RecognitionEngine};
use crate::types::RecognizedWord;

/// Open large-vocabulary pass over the whole source, from the first frame.
pub(crate) fn open_pass(
    engine: &dyn RecognitionEngine,
    audio: &mut dyn AudioSource,
    config: &AlignConfig,
) -> Result<Vec<RecognizedWord>, AlignError> {
    audio.seek(0)?;
    let mut session = engine.new_session(audio.frame_rate(), None)?;
    let mut words = Vec::new();
    loop {
        let frames = audio.read(config.read_frames)?;
        if frames.is_empty() {
            break;
        }
        if session.accept(&frames)? {
            words.extend(session.result()?);
        }
    }
    words.extend(session.final_result()?);
    Ok(words)
}

/// Constrained pass over the chunk `[start_sec, end_sec]`, padded by the
/// configured lead-in/tail and clamped to the file bounds.
///
/// Degenerate chunk ranges are refused with [`AlignError::DegenerateChunk`]
/// so the multipass stage skips them instead of re-decoding indefinitely.
/// Returned word times are global (rebased by the decode window's start).
pub(crate) fn constrained_pass(
    engine: &dyn RecognitionEngine,
    audio: &mut dyn AudioSource,
    start_sec: f64,
    end_sec: f64,
    grammar: &[String],
    config: &AlignConfig,
) -> Result<Vec<RecognizedWord>, AlignError> {
    let duration = end_sec - start_sec;
    if duration < config.min_chunk_sec || duration > config.max_chunk_sec {
        return Err(AlignError::degenerate_chunk(
            duration,
            config.min_chunk_sec,
            config.max_chunk_sec,
        ));
    }

    let frame_rate = audio.frame_rate();
    let window_start = (start_sec - config.chunk_lead_in_sec).max(0.0);
    let window_end = (end_sec + config.chunk_tail_sec).min(audio.duration_sec());

    audio.seek((window_start * frame_rate as f64) as u64)?;
    let mut remaining = ((window_end - window_start) * frame_rate as f64) as u64;

    let mut session = engine.new_session(frame_rate, Some(grammar))?;
    let mut words = Vec::new();
    while remaining > 0 {
        let want = remaining.min(config.read_frames as u64) as usize;
        let frames = audio.read(want)?;
        if frames.is_empty() {
            break;
        }
        remaining -= frames.len() as u64;
        if session.accept(&frames)? {
            words.extend(session.result()?);
        }
    }
    words.extend(session.final_result()?);

    for word in &mut words {
        word.start += window_start;
        word.end += window_start;
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::pipeline::traits::RecognizerSession;

    /// Engine whose sessions echo back a scripted word list and record what
    /// they were asked to decode.
    struct ScriptedEngine {
        script: Vec<RecognizedWord>,
        sessions: Arc<Mutex<Vec<SessionLog>>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct SessionLog {
        sample_rate_hz: u32,
        grammar: Option<Vec<String>>,
        frames_fed: usize,
    }

    struct ScriptedSession {
        script: Vec<RecognizedWord>,
        log_slot: usize,
        logs: Arc<Mutex<Vec<SessionLog>>>,
    }

    impl ScriptedEngine {
        fn new(script: Vec<RecognizedWord>) -> Self {
            Self {
                script,
                sessions: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl RecognitionEngine for ScriptedEngine {
        fn new_session(
            &self,
            sample_rate_hz: u32,
            grammar: Option<&[String]>,
        ) -> Result<Box<dyn RecognizerSession>, AlignError> {
            let mut logs = self.sessions.lock().unwrap();
            logs.push(SessionLog {
                sample_rate_hz,
                grammar: grammar.map(|g| g.to_vec()),
                frames_fed: 0,
            });
            Ok(Box::new(ScriptedSession {
                script: self.script.clone(),
                log_slot: logs.len() - 1,
                logs: Arc::clone(&self.sessions),
            }))
        }
    }

    impl RecognizerSession for ScriptedSession {
        fn accept(&mut self, frames: &[i16]) -> Result<bool, AlignError> {
            self.logs.lock().unwrap()[self.log_slot].frames_fed += frames.len();
            Ok(false)
        }

        fn result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
            Ok(Vec::new())
        }

        fn final_result(&mut self) -> Result<Vec<RecognizedWord>, AlignError> {
            Ok(std::mem::take(&mut self.script))
        }
    }

    struct FakeAudio {
        frames: Vec<i16>,
        pos: usize,
    }

    impl FakeAudio {
        fn seconds(sec: f64) -> Self {
            Self {
                frames: vec![0i16; (sec * 16_000.0) as usize],
                pos: 0,
            }
        }
    }

    impl AudioSource for FakeAudio {
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
            16_000
        }

        fn channels(&self) -> u16 {
            1
        }

        fn bits_per_sample(&self) -> u16 {
            16
        }
    }

    fn word(text: &str, start: f64, end: f64) -> RecognizedWord {
        RecognizedWord {
            word: text.to_string(),
            start,
            end,
            conf: 1.0,
        }
    }

    #[test]
    fn open_pass_feeds_whole_file_without_grammar() {
        let engine = ScriptedEngine::new(vec![word("hello", 0.0, 0.5)]);
        let mut audio = FakeAudio::seconds(2.0);
        let config = AlignConfig::default();
        let words = open_pass(&engine, &mut audio, &config).unwrap();
        assert_eq!(words.len(), 1);

        let logs = engine.sessions.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert!(logs[0].grammar.is_none());
        assert_eq!(logs[0].sample_rate_hz, 16_000);
        assert_eq!(logs[0].frames_fed, 32_000);
    }

    #[test]
    fn constrained_pass_rebases_times_to_the_global_clock() {
        // session reports window-relative times; 10s chunk starting at 5s
        let engine = ScriptedEngine::new(vec![word("mid", 1.0, 1.5)]);
        let mut audio = FakeAudio::seconds(30.0);
        let config = AlignConfig::default();
        let grammar = vec!["mid".to_string(), "[unk]".to_string()];
        let words = constrained_pass(&engine, &mut audio, 5.0, 15.0, &grammar, &config).unwrap();
        // window starts at 5.0 - 0.5 = 4.5
        assert!((words[0].start - 5.5).abs() < 1e-9);
        assert!((words[0].end - 6.0).abs() < 1e-9);
    }

    #[test]
    fn constrained_pass_reads_only_the_window() {
        let engine = ScriptedEngine::new(Vec::new());
        let mut audio = FakeAudio::seconds(30.0);
        let config = AlignConfig::default();
        let grammar = vec!["x".to_string()];
        constrained_pass(&engine, &mut audio, 5.0, 15.0, &grammar, &config).unwrap();

        let logs = engine.sessions.lock().unwrap();
        // [4.5, 17.0] at 16kHz
        assert_eq!(logs[0].frames_fed, (12.5 * 16_000.0) as usize);
        assert_eq!(logs[0].grammar.as_deref(), Some(&grammar[..]));
    }

    #[test]
    fn degenerate_ranges_are_refused() {
        let engine = ScriptedEngine::new(Vec::new());
        let mut audio = FakeAudio::seconds(120.0);
        let config = AlignConfig::default();
        let grammar = vec!["x".to_string()];

        let too_short = constrained_pass(&engine, &mut audio, 1.0, 1.5, &grammar, &config);
        assert!(matches!(too_short, Err(ref e) if e.is_degenerate_chunk()));

        let too_long = constrained_pass(&engine, &mut audio, 0.0, 100.0, &grammar, &config);
        assert!(matches!(too_long, Err(ref e) if e.is_degenerate_chunk()));

        // no session was ever created for a refused pass
        assert!(engine.sessions.lock().unwrap().is_empty());
    }

    #[test]
    fn window_is_clamped_to_file_bounds() {
        let engine = ScriptedEngine::new(Vec::new());
        let mut audio = FakeAudio::seconds(10.0);
        let config = AlignConfig::default();
        let grammar = vec!["x".to_string()];
        // chunk starts at 0.2s: lead-in would reach before the file start
        constrained_pass(&engine, &mut audio, 0.2, 9.5, &grammar, &config).unwrap();
        let logs = engine.sessions.lock().unwrap();
        // [0.0, 10.0] clamped both ends
        assert_eq!(logs[0].frames_fed, 160_000);
    }
}
