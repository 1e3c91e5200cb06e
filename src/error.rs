use std::time::Duration;
use thiserror::Error;
#[derive(Debug, Error)]
pub enum AnnouncerError {
  #[error("Announcement text is empty")]
  EmptyText,
  #[error("Unknown priority {0}, expected emergency, critical, high, medium, low or 1 to 5")]
  InvalidPriority(String),
  #[error("Speech rate ({0}) is not between 0 and 100")]
  InvalidRate(u8),
  #[error("Speech volume ({0}) is not between 0 and 100")]
  InvalidVolume(u8),
  #[error("Speech pitch ({0}) is not between 0 and 100")]
  InvalidPitch(u8),
  #[error("The speech backend {backend} is unavailable: {error}")]
  BackendUnavailable {
    backend: String,
    error: anyhow::Error,
  },
  #[error("Support for the speech backend {0} was not compiled in")]
  BackendNotCompiled(String),
  #[error("The announcer has no speech backend bound")]
  NotInitialized,
  #[error("Failed to speak with the speech backend {backend}: {error}")]
  SpeakFailed {
    backend: String,
    error: anyhow::Error,
  },
  #[error("Failed to stop the speech backend {backend} from speaking: {error}")]
  StopSpeechFailed {
    backend: String,
    error: anyhow::Error,
  },
  #[error("Playing audio with Rodio failed: {0}")]
  PlayAudioFailed(anyhow::Error),
  #[error("Timed out after {timeout:?} while waiting for {stage}")]
  ShutdownTimeout { stage: String, timeout: Duration },
  #[error("Invalid announcer configuration: {0}")]
  InvalidConfig(anyhow::Error),
  #[error("Unknown error: {0}")]
  Unknown(anyhow::Error),
}
impl AnnouncerError {
  pub fn into_backend_unavailable<T>(backend: &str, error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::BackendUnavailable {
      backend: backend.to_owned(),
      error: error.into(),
    }
  }
  pub fn into_backend_not_compiled(backend: &str) -> Self {
    AnnouncerError::BackendNotCompiled(backend.to_owned())
  }
  pub fn into_speak_failed<T>(backend: &str, error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::SpeakFailed {
      backend: backend.to_owned(),
      error: error.into(),
    }
  }
  pub fn into_stop_speech_failed<T>(backend: &str, error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::StopSpeechFailed {
      backend: backend.to_owned(),
      error: error.into(),
    }
  }
  pub fn into_play_audio_failed<T>(error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::PlayAudioFailed(error.into())
  }
  pub fn into_shutdown_timeout(stage: &str, timeout: Duration) -> Self {
    AnnouncerError::ShutdownTimeout {
      stage: stage.to_owned(),
      timeout,
    }
  }
  pub fn into_invalid_config<T>(error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::InvalidConfig(error.into())
  }
  pub fn into_unknown<T>(error: T) -> Self
  where
    T: Into<anyhow::Error>,
  {
    AnnouncerError::Unknown(error.into())
  }
  #[must_use]
  pub fn is_backend_unavailable(&self) -> bool {
    matches!(
      self,
      AnnouncerError::BackendUnavailable { .. } | AnnouncerError::BackendNotCompiled(_)
    )
  }
}
