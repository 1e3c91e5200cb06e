use crate::backends::SpeechBackend;
use crate::error::AnnouncerError;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, trace};
/// Pretends to speak by waiting as long as a voice reading at `words_per_minute` would.
///
/// `stop` cuts the wait short, which makes this backend useful for exercising
/// preemption without an audio device.
#[derive(Debug)]
pub struct SimulatedBackend {
  words_per_minute: u32,
  generation: Mutex<u64>,
  stopped: Condvar,
}
impl SimulatedBackend {
  #[must_use]
  pub fn new(words_per_minute: u32) -> Self {
    SimulatedBackend {
      words_per_minute: words_per_minute.max(1),
      generation: Mutex::new(0),
      stopped: Condvar::new(),
    }
  }
  #[must_use]
  pub fn utterance_duration(&self, text: &str) -> Duration {
    let words = u32::try_from(text.split_whitespace().count()).unwrap_or(u32::MAX);
    Duration::from_secs(60) * words.max(1) / self.words_per_minute
  }
  fn lock(&self) -> MutexGuard<'_, u64> {
    self.generation.lock().unwrap_or_else(PoisonError::into_inner)
  }
}
impl SpeechBackend for SimulatedBackend {
  fn name(&self) -> String {
    "simulated".to_owned()
  }
  fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
    let duration = self.utterance_duration(text);
    let deadline = Instant::now() + duration;
    let mut generation = self.lock();
    let started = *generation;
    trace!(text, ?duration, "simulating utterance");
    while *generation == started {
      let remaining = deadline.saturating_duration_since(Instant::now());
      if remaining.is_zero() {
        return Ok(());
      }
      generation = self
        .stopped
        .wait_timeout(generation, remaining)
        .unwrap_or_else(PoisonError::into_inner)
        .0;
    }
    debug!(text, "simulated utterance cut off");
    Ok(())
  }
  fn stop(&self) -> Result<(), AnnouncerError> {
    *self.lock() += 1;
    self.stopped.notify_all();
    Ok(())
  }
  fn play_tone(&self, frequency_hz: u32, duration: Duration) -> Result<bool, AnnouncerError> {
    trace!(frequency_hz, ?duration, "simulated tone");
    Ok(true)
  }
}
