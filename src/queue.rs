use crate::announcement::Announcement;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
/// Unbounded, thread-safe multiset of pending announcements, drained most urgent first.
#[derive(Debug, Default)]
pub struct AnnouncementQueue {
  heap: Mutex<BinaryHeap<Reverse<Announcement>>>,
  available: Condvar,
}
impl AnnouncementQueue {
  #[must_use]
  pub fn new() -> Self {
    AnnouncementQueue::default()
  }
  fn lock(&self) -> MutexGuard<'_, BinaryHeap<Reverse<Announcement>>> {
    self.heap.lock().unwrap_or_else(PoisonError::into_inner)
  }
  pub fn push(&self, announcement: Announcement) {
    self.lock().push(Reverse(announcement));
    self.available.notify_one();
  }
  /// Removes the most urgent announcement, waiting up to `timeout` for one to arrive.
  /// Returns `None` when the wait expires with the queue still empty.
  pub fn pop_blocking(&self, timeout: Duration) -> Option<Announcement> {
    let heap = self.wait_while_empty(self.lock(), timeout);
    Self::pop_locked(heap)
  }
  #[must_use]
  pub fn try_pop(&self) -> Option<Announcement> {
    Self::pop_locked(self.lock())
  }
  /// Waits up to `timeout` for the queue to become non-empty without removing anything.
  pub fn wait_for_item(&self, timeout: Duration) -> bool {
    !self.wait_while_empty(self.lock(), timeout).is_empty()
  }
  /// Atomically removes every pending announcement and returns how many were dropped.
  pub fn clear(&self) -> usize {
    let mut heap = self.lock();
    let count = heap.len();
    heap.clear();
    count
  }
  #[must_use]
  pub fn len(&self) -> usize {
    self.lock().len()
  }
  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
  /// Priority of the announcement that would be popped next.
  #[must_use]
  pub fn peek_priority(&self) -> Option<crate::announcement::Priority> {
    self
      .lock()
      .peek()
      .map(|Reverse(announcement)| announcement.priority())
  }
  fn wait_while_empty<'a>(
    &self,
    mut heap: MutexGuard<'a, BinaryHeap<Reverse<Announcement>>>,
    timeout: Duration,
  ) -> MutexGuard<'a, BinaryHeap<Reverse<Announcement>>> {
    let deadline = Instant::now() + timeout;
    while heap.is_empty() {
      let remaining = deadline.saturating_duration_since(Instant::now());
      if remaining.is_zero() {
        break;
      }
      heap = self
        .available
        .wait_timeout(heap, remaining)
        .unwrap_or_else(PoisonError::into_inner)
        .0;
    }
    heap
  }
  fn pop_locked(
    mut heap: MutexGuard<'_, BinaryHeap<Reverse<Announcement>>>,
  ) -> Option<Announcement> {
    heap.pop().map(|Reverse(announcement)| announcement)
  }
}
