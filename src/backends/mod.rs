use crate::config::AnnouncerConfig;
use crate::error::AnnouncerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
#[cfg(feature = "espeak-ng")]
pub mod espeak_ng;
pub mod null;
pub mod simulated;
#[cfg(all(target_os = "linux", feature = "speech-dispatcher"))]
pub mod speech_dispatcher;
/// A text-to-speech engine the announcer can drive.
///
/// `speak` blocks until the utterance has finished playing (or was cut off by
/// `stop`). `stop` is called from other threads while `speak` is blocked and is
/// best-effort: an engine that cannot cancel lets the utterance finish. `stop`
/// must not wait for `speak` to return.
pub trait SpeechBackend: Send + Sync {
  fn name(&self) -> String;
  fn speak(&self, text: &str) -> Result<(), AnnouncerError>;
  fn stop(&self) -> Result<(), AnnouncerError>;
  fn supports_stop(&self) -> bool {
    true
  }
  /// Starts a short tone alongside any speech and returns without waiting for it.
  /// Returns `Ok(false)` when the engine has no way to play tones.
  fn play_tone(&self, _frequency_hz: u32, _duration: Duration) -> Result<bool, AnnouncerError> {
    Ok(false)
  }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
  Null,
  Simulated,
  EspeakNg,
  SpeechDispatcher,
}
impl BackendKind {
  #[must_use]
  pub fn name(self) -> &'static str {
    match self {
      BackendKind::Null => "null",
      BackendKind::Simulated => "simulated",
      BackendKind::EspeakNg => "espeak-ng",
      BackendKind::SpeechDispatcher => "speech-dispatcher",
    }
  }
}
impl fmt::Display for BackendKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
impl FromStr for BackendKind {
  type Err = AnnouncerError;
  fn from_str(value: &str) -> Result<Self, Self::Err> {
    [
      BackendKind::Null,
      BackendKind::Simulated,
      BackendKind::EspeakNg,
      BackendKind::SpeechDispatcher,
    ]
    .into_iter()
    .find(|kind| kind.name() == value)
    .ok_or_else(|| AnnouncerError::into_backend_not_compiled(value))
  }
}
/// Builds the backend named by `config.backend`.
pub fn create(config: &AnnouncerConfig) -> Result<Arc<dyn SpeechBackend>, AnnouncerError> {
  config.voice.validate()?;
  match config.backend {
    BackendKind::Null => Ok(Arc::new(null::NullBackend::new())),
    BackendKind::Simulated => Ok(Arc::new(simulated::SimulatedBackend::new(
      config.simulated_words_per_minute,
    ))),
    #[cfg(feature = "espeak-ng")]
    BackendKind::EspeakNg => Ok(Arc::new(espeak_ng::EspeakNg::new(&config.voice)?)),
    #[cfg(all(target_os = "linux", feature = "speech-dispatcher"))]
    BackendKind::SpeechDispatcher => Ok(Arc::new(speech_dispatcher::SpeechDispatcher::new(
      &config.voice,
    )?)),
    #[allow(unreachable_patterns)]
    kind => Err(AnnouncerError::into_backend_not_compiled(kind.name())),
  }
}
