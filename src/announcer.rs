use crate::announcement::{Announcement, Category, Priority};
use crate::backends::{self, SpeechBackend};
use crate::config::AnnouncerConfig;
use crate::error::AnnouncerError;
use crate::observer::{AnnouncerObserver, TracingObserver};
use crate::policy::PreemptionPolicy;
use crate::queue::AnnouncementQueue;
use anyhow::anyhow;
use serde::Serialize;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnouncerState {
  Stopped,
  Running,
  Draining,
}
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnnouncerStats {
  pub announcements_made: u64,
  pub announcements_skipped: u64,
  pub announcements_interrupted: u64,
  pub queue_size: usize,
  pub is_speaking: bool,
  pub state: AnnouncerState,
}
/// Cancellation flag owned by one consumer thread.
#[derive(Clone, Default)]
struct WorkerToken(Arc<AtomicBool>);
impl WorkerToken {
  fn cancel(&self) {
    self.0.store(true, Ordering::SeqCst);
  }
  fn is_cancelled(&self) -> bool {
    self.0.load(Ordering::SeqCst)
  }
}
struct Worker {
  handle: JoinHandle<()>,
  token: WorkerToken,
}
struct Shared {
  queue: AnnouncementQueue,
  state: Mutex<AnnouncerState>,
  current: Mutex<Option<Announcement>>,
  idle: Condvar,
  made: AtomicU64,
  skipped: AtomicU64,
  interrupted: AtomicU64,
  observer: Arc<dyn AnnouncerObserver>,
}
impl Shared {
  fn state(&self) -> AnnouncerState {
    *self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
  fn set_state(&self, state: AnnouncerState) {
    *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
  }
  fn current(&self) -> MutexGuard<'_, Option<Announcement>> {
    self.current.lock().unwrap_or_else(PoisonError::into_inner)
  }
  /// Takes the next announcement and marks it as being spoken in one step, so that
  /// nobody observing `current` and the queue sees the item in neither place.
  fn claim_next(&self, token: &WorkerToken) -> Option<Announcement> {
    let mut current = self.current();
    if self.state() != AnnouncerState::Running || token.is_cancelled() {
      return None;
    }
    let announcement = self.queue.try_pop()?;
    *current = Some(announcement.clone());
    Some(announcement)
  }
  /// Clears `current` unless the worker was abandoned by shutdown, in which case
  /// `current` belongs to whoever runs next. Returns `false` when abandoned.
  fn finish(&self, token: &WorkerToken) -> bool {
    let mut current = self.current();
    if token.is_cancelled() {
      return false;
    }
    *current = None;
    drop(current);
    self.idle.notify_all();
    true
  }
  /// Forgets the utterance of a worker that shutdown gave up on.
  fn abandon_current(&self) {
    *self.current() = None;
    self.idle.notify_all();
  }
  fn wait_for_current(&self, timeout: Duration) -> bool {
    let current = self.current();
    let (_current, result) = self
      .idle
      .wait_timeout_while(current, timeout, |current| current.is_some())
      .unwrap_or_else(PoisonError::into_inner);
    !result.timed_out()
  }
}
/// Serializes announcements from any number of producers onto one speech backend.
///
/// Producers share the announcer behind an `Arc` and call [`Announcer::announce`] or
/// one of the specialized helpers; none of these calls block on speech. A single
/// consumer thread, started by [`Announcer::start`], speaks the most urgent pending
/// announcement one at a time. Urgent announcements may cut off less urgent speech
/// according to [`PreemptionPolicy`].
///
/// Lifecycle: `Stopped` → `Running` on `start`, `Running` → `Draining` → `Stopped` on
/// `shutdown`. Announcements submitted while stopped are kept until the announcer
/// starts or shuts down.
pub struct Announcer {
  config: AnnouncerConfig,
  policy: PreemptionPolicy,
  shared: Arc<Shared>,
  backend: Mutex<Option<Arc<dyn SpeechBackend>>>,
  worker: Mutex<Option<Worker>>,
}
impl Announcer {
  #[must_use]
  pub fn new(config: AnnouncerConfig) -> Self {
    Self::with_observer(config, Arc::new(TracingObserver))
  }
  #[must_use]
  pub fn with_observer(config: AnnouncerConfig, observer: Arc<dyn AnnouncerObserver>) -> Self {
    let policy = PreemptionPolicy::new(config.priority_interrupt);
    Announcer {
      config,
      policy,
      shared: Arc::new(Shared {
        queue: AnnouncementQueue::new(),
        state: Mutex::new(AnnouncerState::Stopped),
        current: Mutex::new(None),
        idle: Condvar::new(),
        made: AtomicU64::new(0),
        skipped: AtomicU64::new(0),
        interrupted: AtomicU64::new(0),
        observer,
      }),
      backend: Mutex::new(None),
      worker: Mutex::new(None),
    }
  }
  #[must_use]
  pub fn config(&self) -> &AnnouncerConfig {
    &self.config
  }
  fn backend(&self) -> MutexGuard<'_, Option<Arc<dyn SpeechBackend>>> {
    self.backend.lock().unwrap_or_else(PoisonError::into_inner)
  }
  fn worker(&self) -> MutexGuard<'_, Option<Worker>> {
    self.worker.lock().unwrap_or_else(PoisonError::into_inner)
  }
  /// Builds the backend named in the configuration and binds to it.
  ///
  /// An unavailable backend is reported here and logged; the announcer stays
  /// stopped and the rest of the application can carry on without audio.
  pub fn initialize(&self) -> Result<(), AnnouncerError> {
    match backends::create(&self.config) {
      Ok(backend) => self.initialize_with(backend),
      Err(error) => {
        error!(
          backend = %self.config.backend,
          %error,
          "speech backend unavailable, continuing without audio"
        );
        Err(error)
      }
    }
  }
  pub fn initialize_with(&self, backend: Arc<dyn SpeechBackend>) -> Result<(), AnnouncerError> {
    let _worker = self.worker();
    if self.shared.state() != AnnouncerState::Stopped {
      return Err(AnnouncerError::into_unknown(anyhow!(
        "Cannot bind a speech backend while the announcer is running"
      )));
    }
    info!(backend = backend.name(), "speech backend bound");
    *self.backend() = Some(backend);
    Ok(())
  }
  /// Spawns the consumer thread. Does nothing if it is already running.
  pub fn start(&self) -> Result<(), AnnouncerError> {
    let mut worker = self.worker();
    if self.shared.state() == AnnouncerState::Running {
      debug!("announcer already running");
      return Ok(());
    }
    let backend = self.backend().clone().ok_or(AnnouncerError::NotInitialized)?;
    let name = backend.name();
    self.shared.set_state(AnnouncerState::Running);
    let shared = Arc::clone(&self.shared);
    let token = WorkerToken::default();
    let worker_token = token.clone();
    let poll_interval = self.config.poll_interval();
    let handle = thread::Builder::new()
      .name("announcer".to_owned())
      .spawn(move || run(&shared, backend.as_ref(), &worker_token, poll_interval))
      .map_err(|err| {
        self.shared.set_state(AnnouncerState::Stopped);
        AnnouncerError::into_unknown(err)
      })?;
    *worker = Some(Worker { handle, token });
    info!(backend = name, "announcer started");
    Ok(())
  }
  /// Queues `text` as a system announcement. See [`Announcer::submit`].
  pub fn announce(
    &self,
    text: &str,
    priority: Priority,
    interrupt: Option<bool>,
  ) -> Result<(), AnnouncerError> {
    self.submit(Category::System, text, priority, interrupt)
  }
  /// Queues an announcement, interrupting less urgent speech when the policy says so.
  ///
  /// `interrupt` falls back to the configured default when `None`. Blank text is
  /// rejected with [`AnnouncerError::EmptyText`]; nothing else fails, since the
  /// queue is unbounded.
  pub fn submit(
    &self,
    category: Category,
    text: &str,
    priority: Priority,
    interrupt: Option<bool>,
  ) -> Result<(), AnnouncerError> {
    let interruptible = interrupt.unwrap_or(self.config.default_interruptible);
    let announcement = Announcement::new(text, priority, category, interruptible)?;
    // Held until the push so the consumer cannot claim anything ahead of the preemptor.
    let preempted = {
      let current = self.shared.current();
      let preempted = current
        .as_ref()
        .filter(|current| {
          self
            .policy
            .should_interrupt(Some(current.priority()), &announcement)
        })
        .cloned();
      if preempted.is_some() {
        self.stop_current();
      }
      self.shared.queue.push(announcement.clone());
      preempted
    };
    if let Some(current) = preempted {
      self.shared.interrupted.fetch_add(1, Ordering::Relaxed);
      self.shared.observer.on_interrupted(&current, &announcement);
    }
    self.shared.observer.on_queued(&announcement);
    Ok(())
  }
  fn stop_current(&self) {
    let backend = self.backend().clone();
    let Some(backend) = backend else {
      return;
    };
    if !backend.supports_stop() {
      debug!(
        backend = backend.name(),
        "backend cannot cut speech short, the current utterance will finish"
      );
    }
    if let Err(error) = backend.stop() {
      warn!(%error, "failed to stop the current utterance");
    }
  }
  /// Drops every pending announcement. The utterance in progress keeps going.
  pub fn clear_queue(&self) -> usize {
    let count = {
      let _current = self.shared.current();
      self.shared.queue.clear()
    };
    self.shared.idle.notify_all();
    self.shared.observer.on_cleared(count);
    count
  }
  #[must_use]
  pub fn queue_size(&self) -> usize {
    self.shared.queue.len()
  }
  #[must_use]
  pub fn is_busy(&self) -> bool {
    self.shared.current().is_some()
  }
  #[must_use]
  pub fn state(&self) -> AnnouncerState {
    self.shared.state()
  }
  /// Waits until nothing is being spoken and nothing is queued.
  ///
  /// Returns `false` and logs a warning if `timeout` elapses first.
  pub fn wait_until_done(&self, timeout: Duration) -> bool {
    let current = self.shared.current();
    let (_current, result) = self
      .shared
      .idle
      .wait_timeout_while(current, timeout, |current| {
        current.is_some() || !self.shared.queue.is_empty()
      })
      .unwrap_or_else(PoisonError::into_inner);
    if result.timed_out() {
      warn!(?timeout, "timed out waiting for announcements to complete");
      return false;
    }
    true
  }
  #[must_use]
  pub fn get_stats(&self) -> AnnouncerStats {
    AnnouncerStats {
      announcements_made: self.shared.made.load(Ordering::Relaxed),
      announcements_skipped: self.shared.skipped.load(Ordering::Relaxed),
      announcements_interrupted: self.shared.interrupted.load(Ordering::Relaxed),
      queue_size: self.queue_size(),
      is_speaking: self.is_busy(),
      state: self.state(),
    }
  }
  /// Stops the consumer and releases the backend.
  ///
  /// Waits a bounded time for the current utterance and for the consumer thread;
  /// either wait timing out is logged and shutdown carries on. Pending
  /// announcements are discarded. Safe to call repeatedly and before `start`.
  pub fn shutdown(&self) {
    let mut worker = self.worker();
    if let Some(Worker { handle, token }) = worker.take() {
      self.shared.set_state(AnnouncerState::Draining);
      info!("announcer draining");
      let drain_timeout = self.config.drain_timeout();
      if !self.shared.wait_for_current(drain_timeout) {
        let error = AnnouncerError::into_shutdown_timeout("the current utterance", drain_timeout);
        warn!(%error, "cutting the current utterance short");
        if let Some(backend) = self.backend().as_ref() {
          if let Err(error) = backend.stop() {
            warn!(%error, "failed to stop the current utterance");
          }
        }
      }
      token.cancel();
      self.join(handle);
      self.shared.abandon_current();
    }
    let discarded = self.shared.queue.clear();
    if discarded > 0 {
      info!(count = discarded, "discarded pending announcements");
      self.shared.observer.on_cleared(discarded);
    }
    self.shared.idle.notify_all();
    if let Some(backend) = self.backend().take() {
      if let Err(error) = backend.stop() {
        warn!(%error, "failed to silence the backend while releasing it");
      }
      info!(backend = backend.name(), "speech backend released");
    }
    if self.shared.state() != AnnouncerState::Stopped {
      self.shared.set_state(AnnouncerState::Stopped);
      info!("announcer shut down");
    }
  }
  fn join(&self, handle: JoinHandle<()>) {
    let join_timeout = self.config.join_timeout();
    let deadline = Instant::now() + join_timeout;
    while !handle.is_finished() && Instant::now() < deadline {
      thread::sleep(JOIN_POLL_INTERVAL);
    }
    if handle.is_finished() {
      if handle.join().is_err() {
        error!("announcer thread panicked");
      }
    } else {
      let error = AnnouncerError::into_shutdown_timeout("the announcer thread", join_timeout);
      warn!(%error, "leaving the announcer thread behind");
    }
  }
  /// Starts a short tone as a non-verbal cue, if cues are enabled and the backend
  /// can. Returns immediately, even while an utterance is playing.
  pub fn play_beep(&self, frequency_hz: u32, duration_ms: u64) -> bool {
    if !self.config.enable_audio_cues {
      return false;
    }
    let Some(backend) = self.backend().clone() else {
      return false;
    };
    debug!(frequency_hz, duration_ms, "beep");
    match backend.play_tone(frequency_hz, Duration::from_millis(duration_ms)) {
      Ok(played) => played,
      Err(error) => {
        warn!(%error, "failed to play audio cue");
        false
      }
    }
  }
  /// Highest priority; cuts off anything that is not itself an emergency.
  pub fn emergency_announce(&self, text: &str) -> Result<(), AnnouncerError> {
    self.submit(Category::System, text, Priority::Emergency, Some(true))
  }
  pub fn obstacle_alert(&self, distance_cm: f64, direction: &str) -> Result<(), AnnouncerError> {
    let text = format!("Obstacle {direction}, {distance_cm:.0} centimeters");
    self.submit(Category::Obstacle, &text, Priority::Critical, Some(true))
  }
  pub fn person_detected(&self, name: &str) -> Result<(), AnnouncerError> {
    self.submit(Category::Face, &format!("Hello {name}"), Priority::High, None)
  }
  pub fn object_detected<S: AsRef<str>>(&self, objects: &[S]) -> Result<(), AnnouncerError> {
    self.submit(
      Category::Object,
      &describe_objects(objects),
      Priority::Medium,
      None,
    )
  }
  pub fn read_text(&self, text: &str) -> Result<(), AnnouncerError> {
    self.submit(Category::Text, text, Priority::Medium, None)
  }
  pub fn describe_scene(&self, description: &str) -> Result<(), AnnouncerError> {
    self.submit(Category::Scene, description, Priority::Low, None)
  }
  pub fn currency_detected(&self, amount: &str, currency: &str) -> Result<(), AnnouncerError> {
    self.submit(
      Category::Currency,
      &format!("{amount} {currency}"),
      Priority::High,
      None,
    )
  }
  pub fn color_detected(&self, color: &str) -> Result<(), AnnouncerError> {
    self.submit(
      Category::Color,
      &format!("Color: {color}"),
      Priority::Medium,
      None,
    )
  }
}
impl Drop for Announcer {
  fn drop(&mut self) {
    self.shutdown();
  }
}
fn run(
  shared: &Shared,
  backend: &dyn SpeechBackend,
  token: &WorkerToken,
  poll_interval: Duration,
) {
  debug!("announcer loop running");
  while shared.state() == AnnouncerState::Running && !token.is_cancelled() {
    if !shared.queue.wait_for_item(poll_interval) {
      continue;
    }
    let Some(announcement) = shared.claim_next(token) else {
      continue;
    };
    let result = panic::catch_unwind(AssertUnwindSafe(|| backend.speak(announcement.text())))
      .unwrap_or_else(|payload| {
        Err(AnnouncerError::into_speak_failed(
          &backend.name(),
          anyhow!("backend panicked: {}", panic_message(payload.as_ref())),
        ))
      });
    if token.is_cancelled() {
      debug!(text = announcement.text(), "dropping the result of an abandoned utterance");
      break;
    }
    match result {
      Ok(()) => {
        shared.made.fetch_add(1, Ordering::Relaxed);
        shared.observer.on_spoken(&announcement);
      }
      Err(error) => {
        shared.skipped.fetch_add(1, Ordering::Relaxed);
        error!(%error, "failed to speak announcement");
        shared.observer.on_skipped(&announcement, &error);
      }
    }
    if !shared.finish(token) {
      break;
    }
  }
  shared.idle.notify_all();
  debug!("announcer loop stopped");
}
fn panic_message(payload: &(dyn Any + Send)) -> String {
  payload
    .downcast_ref::<&str>()
    .map(|message| (*message).to_owned())
    .or_else(|| payload.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "unknown panic".to_owned())
}
/// "I see a", "I see a and b", "I see a, b, and c". Empty for no objects.
pub fn describe_objects<S: AsRef<str>>(objects: &[S]) -> String {
  match objects {
    [] => String::new(),
    [only] => format!("I see {}", only.as_ref()),
    [first, second] => format!("I see {} and {}", first.as_ref(), second.as_ref()),
    [init @ .., last] => format!(
      "I see {}, and {}",
      init
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(", "),
      last.as_ref()
    ),
  }
}
#[cfg(test)]
mod tests {
  use super::*;
  use crate::backends::null::NullBackend;
  fn quick_config() -> AnnouncerConfig {
    AnnouncerConfig {
      poll_interval_ms: 10,
      drain_timeout_ms: 500,
      join_timeout_ms: 500,
      ..AnnouncerConfig::default()
    }
  }
  #[test]
  fn describes_object_lists() {
    assert_eq!(describe_objects::<&str>(&[]), "");
    assert_eq!(describe_objects(&["chair"]), "I see chair");
    assert_eq!(describe_objects(&["chair", "table"]), "I see chair and table");
    assert_eq!(
      describe_objects(&["chair", "table", "bottle"]),
      "I see chair, table, and bottle"
    );
  }
  #[test]
  fn start_requires_a_backend() {
    let announcer = Announcer::new(quick_config());
    assert!(matches!(announcer.start(), Err(AnnouncerError::NotInitialized)));
    assert_eq!(announcer.state(), AnnouncerState::Stopped);
  }
  #[test]
  fn start_is_idempotent() {
    let announcer = Announcer::new(quick_config());
    announcer.initialize_with(Arc::new(NullBackend::new())).unwrap();
    announcer.start().unwrap();
    announcer.start().unwrap();
    assert_eq!(announcer.state(), AnnouncerState::Running);
    assert!(announcer.initialize_with(Arc::new(NullBackend::new())).is_err());
    announcer.shutdown();
    assert_eq!(announcer.state(), AnnouncerState::Stopped);
  }
  #[test]
  fn rejects_blank_text_without_queueing() {
    let announcer = Announcer::new(quick_config());
    assert!(matches!(
      announcer.announce("", Priority::High, None),
      Err(AnnouncerError::EmptyText)
    ));
    assert!(matches!(
      announcer.announce("   ", Priority::Medium, None),
      Err(AnnouncerError::EmptyText)
    ));
    assert!(announcer.object_detected::<&str>(&[]).is_err());
    assert_eq!(announcer.queue_size(), 0);
  }
  #[test]
  fn queues_while_stopped_and_speaks_after_start() {
    let announcer = Announcer::new(quick_config());
    announcer.read_text("Exit").unwrap();
    announcer.color_detected("blue").unwrap();
    assert_eq!(announcer.queue_size(), 2);
    assert!(!announcer.wait_until_done(Duration::from_millis(30)));
    announcer.initialize_with(Arc::new(NullBackend::new())).unwrap();
    announcer.start().unwrap();
    assert!(announcer.wait_until_done(Duration::from_secs(5)));
    let stats = announcer.get_stats();
    assert_eq!(stats.announcements_made, 2);
    assert_eq!(stats.queue_size, 0);
    assert!(!stats.is_speaking);
  }
  #[test]
  fn audio_cues_follow_configuration() {
    let announcer = Announcer::new(AnnouncerConfig {
      enable_audio_cues: false,
      ..quick_config()
    });
    announcer
      .initialize_with(Arc::new(crate::backends::simulated::SimulatedBackend::new(160)))
      .unwrap();
    assert!(!announcer.play_beep(1000, 200));
    let announcer = Announcer::new(quick_config());
    assert!(!announcer.play_beep(1000, 200));
    announcer
      .initialize_with(Arc::new(crate::backends::simulated::SimulatedBackend::new(160)))
      .unwrap();
    assert!(announcer.play_beep(1000, 200));
    announcer.initialize_with(Arc::new(NullBackend::new())).unwrap();
    assert!(!announcer.play_beep(1000, 200));
  }
}
