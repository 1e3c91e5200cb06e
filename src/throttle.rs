use crate::announcement::Category;
use crate::config::CooldownConfig;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
/// Per-subject cooldown for producers.
///
/// A face recognizer keys on the person's name, an obstacle detector on the zone.
/// The announcer never consults this; each producer decides for itself whether a
/// repeat is worth saying.
#[derive(Debug)]
pub struct Throttle {
  cooldowns: CooldownConfig,
  last: Mutex<HashMap<(Category, String), Instant>>,
}
impl Throttle {
  #[must_use]
  pub fn new(cooldowns: CooldownConfig) -> Self {
    Throttle {
      cooldowns,
      last: Mutex::new(HashMap::new()),
    }
  }
  /// Returns `true` and records the attempt when `subject` has not been announced
  /// within its category's cooldown.
  pub fn should_announce(&self, category: Category, subject: &str) -> bool {
    self.should_announce_at(category, subject, Instant::now())
  }
  pub fn should_announce_at(&self, category: Category, subject: &str, now: Instant) -> bool {
    let interval = self.cooldowns.interval(category);
    let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
    let key = (category, subject.to_owned());
    if let Some(previous) = last.get(&key) {
      if now.saturating_duration_since(*previous) < interval {
        return false;
      }
    }
    last.insert(key, now);
    true
  }
  #[must_use]
  pub fn remaining(&self, category: Category, subject: &str) -> Duration {
    let interval = self.cooldowns.interval(category);
    self
      .last
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .get(&(category, subject.to_owned()))
      .map_or(Duration::ZERO, |previous| {
        interval.saturating_sub(previous.elapsed())
      })
  }
  pub fn reset(&self) {
    self
      .last
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .clear();
  }
}
