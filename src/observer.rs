use crate::announcement::Announcement;
use crate::error::AnnouncerError;
use tracing::{debug, info, warn};
/// Receives per-announcement events from an [`crate::Announcer`].
///
/// Callbacks run on the thread that caused them: `on_queued`, `on_interrupted` and
/// `on_cleared` on the producer's thread, the rest on the consumer thread. They must
/// return quickly.
pub trait AnnouncerObserver: Send + Sync {
  fn on_queued(&self, _announcement: &Announcement) {}
  fn on_spoken(&self, _announcement: &Announcement) {}
  fn on_skipped(&self, _announcement: &Announcement, _error: &AnnouncerError) {}
  fn on_interrupted(&self, _current: &Announcement, _incoming: &Announcement) {}
  fn on_cleared(&self, _count: usize) {}
}
/// Logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;
impl AnnouncerObserver for TracingObserver {
  fn on_queued(&self, announcement: &Announcement) {
    debug!(
      priority = %announcement.priority(),
      category = %announcement.category(),
      text = announcement.text(),
      "queued announcement"
    );
  }
  fn on_spoken(&self, announcement: &Announcement) {
    debug!(
      priority = %announcement.priority(),
      waited = ?announcement.age(),
      "spoke announcement"
    );
  }
  fn on_skipped(&self, announcement: &Announcement, error: &AnnouncerError) {
    warn!(
      priority = %announcement.priority(),
      text = announcement.text(),
      %error,
      "skipped announcement"
    );
  }
  fn on_interrupted(&self, current: &Announcement, incoming: &Announcement) {
    info!(
      current = %current.priority(),
      incoming = %incoming.priority(),
      "interrupting speech for a more urgent announcement"
    );
  }
  fn on_cleared(&self, count: usize) {
    debug!(count, "cleared announcement queue");
  }
}
