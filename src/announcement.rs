use crate::error::AnnouncerError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::Instant;
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);
/// Urgency of an announcement. A lower numeric value is more urgent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Priority {
  Emergency = 1,
  Critical = 2,
  High = 3,
  Medium = 4,
  Low = 5,
}
impl Priority {
  pub const ALL: [Priority; 5] = [
    Priority::Emergency,
    Priority::Critical,
    Priority::High,
    Priority::Medium,
    Priority::Low,
  ];
  #[must_use]
  pub fn value(self) -> u8 {
    self as u8
  }
  #[must_use]
  pub fn from_value(value: u8) -> Option<Self> {
    Priority::ALL
      .into_iter()
      .find(|priority| priority.value() == value)
  }
  /// Whether an announcement of this priority may cut off a less urgent one.
  #[must_use]
  pub fn is_interrupt_eligible(self) -> bool {
    self <= Priority::High
  }
  #[must_use]
  pub fn is_more_urgent_than(self, other: Priority) -> bool {
    self < other
  }
  #[must_use]
  pub fn name(self) -> &'static str {
    match self {
      Priority::Emergency => "emergency",
      Priority::Critical => "critical",
      Priority::High => "high",
      Priority::Medium => "medium",
      Priority::Low => "low",
    }
  }
}
impl fmt::Display for Priority {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
impl FromStr for Priority {
  type Err = AnnouncerError;
  fn from_str(value: &str) -> Result<Self, Self::Err> {
    let value = value.trim().to_lowercase();
    if let Some(priority) = Priority::ALL
      .into_iter()
      .find(|priority| priority.name() == value)
    {
      return Ok(priority);
    }
    value
      .parse::<u8>()
      .ok()
      .and_then(Priority::from_value)
      .ok_or(AnnouncerError::InvalidPriority(value))
  }
}
/// The producer an announcement came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Obstacle,
  Face,
  Object,
  Text,
  Scene,
  Color,
  Currency,
  System,
}
impl Category {
  #[must_use]
  pub fn name(self) -> &'static str {
    match self {
      Category::Obstacle => "obstacle",
      Category::Face => "face",
      Category::Object => "object",
      Category::Text => "text",
      Category::Scene => "scene",
      Category::Color => "color",
      Category::Currency => "currency",
      Category::System => "system",
    }
  }
}
impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}
/// A single unit of text slated for spoken output.
///
/// Announcements order by priority first and creation time second. A process-wide
/// sequence number breaks ties between announcements created within the same clock
/// tick, so equal-priority items always come out in the order they were made.
#[derive(Clone, Debug)]
pub struct Announcement {
  text: String,
  priority: Priority,
  category: Category,
  interruptible: bool,
  timestamp: Instant,
  sequence: u64,
}
impl Announcement {
  pub fn new(
    text: &str,
    priority: Priority,
    category: Category,
    interruptible: bool,
  ) -> Result<Self, AnnouncerError> {
    let text = text.trim();
    if text.is_empty() {
      return Err(AnnouncerError::EmptyText);
    }
    Ok(Announcement {
      text: text.to_owned(),
      priority,
      category,
      interruptible,
      timestamp: Instant::now(),
      sequence: NEXT_SEQUENCE.fetch_add(1, AtomicOrdering::Relaxed),
    })
  }
  #[must_use]
  pub fn text(&self) -> &str {
    &self.text
  }
  #[must_use]
  pub fn priority(&self) -> Priority {
    self.priority
  }
  #[must_use]
  pub fn category(&self) -> Category {
    self.category
  }
  #[must_use]
  pub fn is_interruptible(&self) -> bool {
    self.interruptible
  }
  #[must_use]
  pub fn timestamp(&self) -> Instant {
    self.timestamp
  }
  #[must_use]
  pub fn age(&self) -> std::time::Duration {
    self.timestamp.elapsed()
  }
}
impl PartialEq for Announcement {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}
impl Eq for Announcement {}
impl PartialOrd for Announcement {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}
impl Ord for Announcement {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .priority
      .cmp(&other.priority)
      .then_with(|| self.timestamp.cmp(&other.timestamp))
      .then_with(|| self.sequence.cmp(&other.sequence))
  }
}
#[cfg(test)]
mod tests {
  use super::*;
  #[test]
  fn priorities_order_from_most_to_least_urgent() {
    assert!(Priority::Emergency < Priority::Critical);
    assert!(Priority::Critical < Priority::High);
    assert!(Priority::High < Priority::Medium);
    assert!(Priority::Medium < Priority::Low);
    assert!(Priority::Critical.is_more_urgent_than(Priority::Low));
    assert!(!Priority::Low.is_more_urgent_than(Priority::Low));
  }
  #[test]
  fn only_high_and_above_are_interrupt_eligible() {
    assert!(Priority::Emergency.is_interrupt_eligible());
    assert!(Priority::Critical.is_interrupt_eligible());
    assert!(Priority::High.is_interrupt_eligible());
    assert!(!Priority::Medium.is_interrupt_eligible());
    assert!(!Priority::Low.is_interrupt_eligible());
  }
  #[test]
  fn parses_priority_names_and_values() {
    assert_eq!("Emergency".parse::<Priority>().unwrap(), Priority::Emergency);
    assert_eq!(" low ".parse::<Priority>().unwrap(), Priority::Low);
    assert_eq!("3".parse::<Priority>().unwrap(), Priority::High);
    assert!(matches!(
      "6".parse::<Priority>(),
      Err(AnnouncerError::InvalidPriority(value)) if value == "6"
    ));
    assert!(matches!(
      "Urgent".parse::<Priority>(),
      Err(AnnouncerError::InvalidPriority(value)) if value == "urgent"
    ));
  }
  #[test]
  fn trims_text_and_rejects_blank() {
    let announcement =
      Announcement::new("  Chair ahead \n", Priority::Low, Category::Obstacle, true).unwrap();
    assert_eq!(announcement.text(), "Chair ahead");
    assert!(matches!(
      Announcement::new("", Priority::High, Category::System, true),
      Err(AnnouncerError::EmptyText)
    ));
    assert!(matches!(
      Announcement::new(" \t ", Priority::Medium, Category::System, true),
      Err(AnnouncerError::EmptyText)
    ));
  }
  #[test]
  fn orders_by_priority_then_creation() {
    let low = Announcement::new("low", Priority::Low, Category::Scene, true).unwrap();
    let critical = Announcement::new("critical", Priority::Critical, Category::Obstacle, true).unwrap();
    let first_medium = Announcement::new("first", Priority::Medium, Category::Object, true).unwrap();
    let second_medium = Announcement::new("second", Priority::Medium, Category::Color, true).unwrap();
    let mut all = vec![
      second_medium.clone(),
      low.clone(),
      first_medium.clone(),
      critical.clone(),
    ];
    all.sort();
    let texts = all.iter().map(Announcement::text).collect::<Vec<&str>>();
    assert_eq!(texts, vec!["critical", "first", "second", "low"]);
  }
}
