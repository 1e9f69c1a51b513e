//! Synthesizers usable from the command line.

use std::process::{Child, Command, Stdio};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::platform::{PlatformError, SpeechParams, SpeechSynthesizer};

/// Words per minute at rate 1.0.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// Speaks through the host text-to-speech command.
///
/// Uses `say` on macOS and `espeak` elsewhere. Only one utterance plays at a
/// time; [`SpeechSynthesizer::stop`] kills the running child.
#[derive(Debug)]
pub struct ProcessSynthesizer {
    program: String,
    child: Mutex<Option<Child>>,
}

impl ProcessSynthesizer {
    /// Use the platform's default speech command.
    #[must_use]
    pub fn new() -> Self {
        let program = if cfg!(target_os = "macos") { "say" } else { "espeak" };
        Self::with_program(program)
    }

    /// Use a specific speech command. It must accept the same flags as `say`
    /// or `espeak` (rate via `-r` or `-s`, text as the last argument).
    #[must_use]
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            child: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn rate_flag(&self) -> &'static str {
        if self.program.ends_with("say") {
            "-r"
        } else {
            "-s"
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Child>> {
        self.child.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the current utterance finishes.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting on the child process fails.
    pub fn wait_until_done(&self) -> Result<(), PlatformError> {
        let child = self.slot().take();
        if let Some(mut child) = child {
            child
                .wait()
                .map_err(|e| PlatformError::Failed(format!("Failed to wait for speech: {e}")))?;
        }
        Ok(())
    }
}

impl Default for ProcessSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeechSynthesizer for ProcessSynthesizer {
    fn speak(&self, text: &str, params: SpeechParams) -> Result<(), PlatformError> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let words_per_minute = (BASE_WORDS_PER_MINUTE * params.rate).round().max(1.0) as u32;

        debug!(program = %self.program, words_per_minute, "spawning speech command");
        let child = Command::new(&self.program)
            .arg(self.rate_flag())
            .arg(words_per_minute.to_string())
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => PlatformError::Unavailable(self.program.clone()),
                _ => PlatformError::Failed(format!("Failed to run {}: {e}", self.program)),
            })?;

        *self.slot() = Some(child);
        Ok(())
    }

    fn stop(&self) -> Result<(), PlatformError> {
        if let Some(mut child) = self.slot().take() {
            // Already exited is fine
            let _ = child.kill();
            child
                .wait()
                .map_err(|e| PlatformError::Failed(format!("Failed to stop speech: {e}")))?;
        }
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        let mut slot = self.slot();
        match slot.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(_) => {
                *slot = None;
                false
            },
            None => false,
        }
    }
}

/// Records what would have been spoken instead of playing audio.
///
/// Used by the `--captions` mode of the CLI and by tests.
#[derive(Debug, Default)]
pub struct CaptionSynthesizer {
    lines: Mutex<Vec<(String, SpeechParams)>>,
}

impl CaptionSynthesizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|(text, _)| text).collect()
    }

    /// Spoken text with the parameters it was spoken with.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, SpeechParams)> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpeechSynthesizer for CaptionSynthesizer {
    fn speak(&self, text: &str, params: SpeechParams) -> Result<(), PlatformError> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((text.to_string(), params));
        Ok(())
    }

    fn stop(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn is_speaking(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(rate: f32) -> SpeechParams {
        SpeechParams { rate, pitch: 1.0 }
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let synth = ProcessSynthesizer::with_program("accessaid-no-such-speech-binary");
        let err = synth.speak("hello", params(1.0)).unwrap_err();
        assert!(matches!(err, PlatformError::Unavailable(_)));
        assert!(!synth.is_speaking());
    }

    #[test]
    fn test_stop_without_child_is_ok() {
        let synth = ProcessSynthesizer::with_program("espeak");
        assert!(synth.stop().is_ok());
        assert!(synth.wait_until_done().is_ok());
    }

    #[test]
    fn test_rate_flag_follows_program() {
        assert_eq!(ProcessSynthesizer::with_program("say").rate_flag(), "-r");
        assert_eq!(ProcessSynthesizer::with_program("/usr/bin/espeak").rate_flag(), "-s");
    }

    #[test]
    fn test_caption_synthesizer_records_lines() {
        let synth = CaptionSynthesizer::new();
        synth.speak("one", params(1.0)).unwrap();
        synth.speak("two", params(1.5)).unwrap();

        assert_eq!(synth.lines(), vec!["one".to_string(), "two".to_string()]);
        assert!((synth.entries()[1].1.rate - 1.5).abs() < f32::EPSILON);
    }
}
