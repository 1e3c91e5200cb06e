use crate::announcement::{Announcement, Priority};
/// Decides whether a newly submitted announcement cuts off the one being spoken.
///
/// An emergency interrupts anything except another emergency, regardless of
/// settings. Otherwise the newcomer interrupts only when priority interrupts are
/// enabled, the newcomer is marked interruptible and is `High` or more urgent, and
/// the announcement in progress is strictly less urgent. `Medium` and `Low`
/// announcements never preempt; they wait in the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreemptionPolicy {
  priority_interrupt: bool,
}
impl PreemptionPolicy {
  #[must_use]
  pub fn new(priority_interrupt: bool) -> Self {
    PreemptionPolicy { priority_interrupt }
  }
  #[must_use]
  pub fn priority_interrupt(&self) -> bool {
    self.priority_interrupt
  }
  #[must_use]
  pub fn should_interrupt(&self, current: Option<Priority>, incoming: &Announcement) -> bool {
    let Some(current) = current else {
      return false;
    };
    let incoming_priority = incoming.priority();
    if incoming_priority == Priority::Emergency {
      return current != Priority::Emergency;
    }
    self.priority_interrupt
      && incoming.is_interruptible()
      && incoming_priority.is_interrupt_eligible()
      && incoming_priority.is_more_urgent_than(current)
  }
}
impl Default for PreemptionPolicy {
  fn default() -> Self {
    PreemptionPolicy::new(true)
  }
}
