#![allow(dead_code)]
use announcer_rs::{
  Announcement, AnnouncerConfig, AnnouncerError, AnnouncerObserver, BackendKind, Category,
  Priority, SpeechBackend,
};
use anyhow::anyhow;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};
pub const WAIT: Duration = Duration::from_secs(5);
pub fn test_config() -> AnnouncerConfig {
  AnnouncerConfig {
    backend: BackendKind::Null,
    poll_interval_ms: 10,
    drain_timeout_ms: 200,
    join_timeout_ms: 200,
    ..AnnouncerConfig::default()
  }
}
#[derive(Default)]
struct Script {
  events: Vec<String>,
  speaking: Option<String>,
  generation: u64,
  calls: usize,
}
/// Records every call. In hold mode `speak` blocks until `release` or `stop`.
pub struct ScriptedBackend {
  script: Mutex<Script>,
  changed: Condvar,
  hold: AtomicBool,
  supports_stop: bool,
  stop_delay: Duration,
  fail_calls: HashSet<usize>,
  panic_calls: HashSet<usize>,
}
impl ScriptedBackend {
  pub fn new() -> Self {
    ScriptedBackend {
      script: Mutex::new(Script::default()),
      changed: Condvar::new(),
      hold: AtomicBool::new(false),
      supports_stop: true,
      stop_delay: Duration::ZERO,
      fail_calls: HashSet::new(),
      panic_calls: HashSet::new(),
    }
  }
  pub fn holding() -> Self {
    let backend = Self::new();
    backend.hold.store(true, Ordering::SeqCst);
    backend
  }
  /// Holds every utterance and ignores `stop`.
  pub fn stuck() -> Self {
    ScriptedBackend {
      supports_stop: false,
      ..Self::holding()
    }
  }
  /// Holds every utterance; `stop` cuts it off at once but only returns after `delay`.
  pub fn slow_to_stop(delay: Duration) -> Self {
    ScriptedBackend {
      stop_delay: delay,
      ..Self::holding()
    }
  }
  /// Fails the given 1-based calls to `speak`.
  pub fn failing_on(calls: &[usize]) -> Self {
    ScriptedBackend {
      fail_calls: calls.iter().copied().collect(),
      ..Self::new()
    }
  }
  pub fn panicking_on(calls: &[usize]) -> Self {
    ScriptedBackend {
      panic_calls: calls.iter().copied().collect(),
      ..Self::new()
    }
  }
  fn script(&self) -> MutexGuard<'_, Script> {
    self.script.lock().unwrap()
  }
  pub fn set_hold(&self, hold: bool) {
    self.hold.store(hold, Ordering::SeqCst);
  }
  /// Lets the utterance in progress finish.
  pub fn release(&self) {
    self.script().generation += 1;
    self.changed.notify_all();
  }
  pub fn wait_until_speaking(&self, text: &str) -> bool {
    let script = self.script();
    let (_script, result) = self
      .changed
      .wait_timeout_while(script, WAIT, |script| script.speaking.as_deref() != Some(text))
      .unwrap();
    !result.timed_out()
  }
  pub fn events(&self) -> Vec<String> {
    self.script().events.clone()
  }
  pub fn spoken(&self) -> Vec<String> {
    self
      .events()
      .into_iter()
      .filter_map(|event| event.strip_prefix("done:").map(str::to_owned))
      .collect()
  }
  pub fn stop_count(&self) -> usize {
    self.events().iter().filter(|event| *event == "stop").count()
  }
}
impl SpeechBackend for ScriptedBackend {
  fn name(&self) -> String {
    "scripted".to_owned()
  }
  fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
    let mut script = self.script();
    script.calls += 1;
    let call = script.calls;
    script.events.push(format!("speak:{text}"));
    if self.panic_calls.contains(&call) {
      drop(script);
      panic!("scripted backend panic on call {call}");
    }
    if self.fail_calls.contains(&call) {
      script.events.push(format!("fail:{text}"));
      return Err(AnnouncerError::into_speak_failed(
        "scripted",
        anyhow!("audio device hiccup"),
      ));
    }
    if self.hold.load(Ordering::SeqCst) {
      let started = script.generation;
      script.speaking = Some(text.to_owned());
      self.changed.notify_all();
      script = self
        .changed
        .wait_while(script, |script| script.generation == started)
        .unwrap();
      script.speaking = None;
    }
    script.events.push(format!("done:{text}"));
    self.changed.notify_all();
    Ok(())
  }
  fn stop(&self) -> Result<(), AnnouncerError> {
    let mut script = self.script();
    script.events.push("stop".to_owned());
    if self.supports_stop {
      script.generation += 1;
    }
    drop(script);
    self.changed.notify_all();
    std::thread::sleep(self.stop_delay);
    Ok(())
  }
  fn play_tone(&self, frequency_hz: u32, _duration: Duration) -> Result<bool, AnnouncerError> {
    self.script().events.push(format!("tone:{frequency_hz}"));
    Ok(true)
  }
  fn supports_stop(&self) -> bool {
    self.supports_stop
  }
}
/// Captures what the announcer reports to its observer.
#[derive(Default)]
pub struct RecordingObserver {
  pub queued: Mutex<Vec<(Category, Priority, String, bool)>>,
  pub spoken: Mutex<Vec<String>>,
  pub skipped: Mutex<Vec<String>>,
  pub interrupted: Mutex<Vec<(Priority, Priority)>>,
  pub cleared: Mutex<Vec<usize>>,
}
impl AnnouncerObserver for RecordingObserver {
  fn on_queued(&self, announcement: &Announcement) {
    self.queued.lock().unwrap().push((
      announcement.category(),
      announcement.priority(),
      announcement.text().to_owned(),
      announcement.is_interruptible(),
    ));
  }
  fn on_spoken(&self, announcement: &Announcement) {
    self
      .spoken
      .lock()
      .unwrap()
      .push(announcement.text().to_owned());
  }
  fn on_skipped(&self, announcement: &Announcement, _error: &AnnouncerError) {
    self
      .skipped
      .lock()
      .unwrap()
      .push(announcement.text().to_owned());
  }
  fn on_interrupted(&self, current: &Announcement, incoming: &Announcement) {
    self
      .interrupted
      .lock()
      .unwrap()
      .push((current.priority(), incoming.priority()));
  }
  fn on_cleared(&self, count: usize) {
    self.cleared.lock().unwrap().push(count);
  }
}
pub fn eventually<F: Fn() -> bool>(condition: F) -> bool {
  let deadline = Instant::now() + WAIT;
  while Instant::now() < deadline {
    if condition() {
      return true;
    }
    std::thread::sleep(Duration::from_millis(5));
  }
  condition()
}
