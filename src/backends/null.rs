use crate::backends::SpeechBackend;
use crate::error::AnnouncerError;
use tracing::debug;
/// Discards everything it is asked to say.
#[derive(Debug, Default)]
pub struct NullBackend;
impl NullBackend {
  #[must_use]
  pub fn new() -> Self {
    NullBackend
  }
}
impl SpeechBackend for NullBackend {
  fn name(&self) -> String {
    "null".to_owned()
  }
  fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
    debug!(text, "null backend discarding utterance");
    Ok(())
  }
  fn stop(&self) -> Result<(), AnnouncerError> {
    Ok(())
  }
  fn supports_stop(&self) -> bool {
    false
  }
}
