mod common;
use announcer_rs::{
  Announcer, AnnouncerConfig, AnnouncerState, BackendKind, Category, Priority, Throttle,
};
use common::WAIT;
use std::io::Write;
use std::time::{Duration, Instant};
fn config_file(content: &str) -> tempfile::NamedTempFile {
  let mut file = tempfile::NamedTempFile::new().unwrap();
  file.write_all(content.as_bytes()).unwrap();
  file
}
#[test]
fn runs_from_a_configuration_file() {
  let file = config_file(
    r#"
backend = "simulated"
simulated_words_per_minute = 6000
poll_interval_ms = 10
drain_timeout_ms = 500
join_timeout_ms = 500
[cooldowns]
obstacle = 1.5
"#,
  );
  let config = AnnouncerConfig::load_from_file(file.path()).unwrap();
  assert_eq!(config.backend, BackendKind::Simulated);
  assert!((config.cooldowns.obstacle - 1.5).abs() < f64::EPSILON);
  let announcer = Announcer::new(config);
  announcer.initialize().unwrap();
  announcer.start().unwrap();
  assert_eq!(announcer.state(), AnnouncerState::Running);
  announcer.obstacle_alert(80.0, "ahead").unwrap();
  announcer.read_text("Gate 12 boarding").unwrap();
  announcer.describe_scene("An airport hall").unwrap();
  assert!(announcer.wait_until_done(WAIT));
  assert!(announcer.play_beep(880, 10));
  announcer.shutdown();
  let stats = announcer.get_stats();
  assert_eq!(stats.announcements_made, 3);
  assert_eq!(stats.state, AnnouncerState::Stopped);
}
#[test]
fn emergency_cuts_a_long_simulated_utterance_short() {
  let config = AnnouncerConfig {
    backend: BackendKind::Simulated,
    simulated_words_per_minute: 60,
    ..common::test_config()
  };
  let announcer = Announcer::new(config);
  announcer.initialize().unwrap();
  announcer.start().unwrap();
  announcer
    .describe_scene("A very long and winding description of everything in sight")
    .unwrap();
  assert!(common::eventually(|| announcer.is_busy()));
  let started_at = Instant::now();
  announcer.emergency_announce("Stop").unwrap();
  assert!(announcer.wait_until_done(WAIT));
  assert!(started_at.elapsed() < Duration::from_secs(4));
  let stats = announcer.get_stats();
  assert_eq!(stats.announcements_interrupted, 1);
  assert_eq!(stats.announcements_made, 2);
}
#[test]
fn unavailable_backend_leaves_the_announcer_stopped() {
  let config = AnnouncerConfig {
    backend: BackendKind::SpeechDispatcher,
    ..common::test_config()
  };
  let announcer = Announcer::new(config);
  if let Err(error) = announcer.initialize() {
    assert!(error.is_backend_unavailable());
    assert!(announcer.start().is_err());
    announcer.announce("Anyone there", Priority::Low, None).unwrap();
    assert_eq!(announcer.state(), AnnouncerState::Stopped);
    assert_eq!(announcer.queue_size(), 1);
    announcer.shutdown();
    assert_eq!(announcer.queue_size(), 0);
  }
}
#[test]
fn throttle_gates_repeated_detections() {
  let config = AnnouncerConfig {
    backend: BackendKind::Null,
    ..common::test_config()
  };
  let throttle = Throttle::new(config.cooldowns.clone());
  let announcer = Announcer::new(config);
  announcer.initialize().unwrap();
  announcer.start().unwrap();
  for _ in 0..5 {
    if throttle.should_announce(Category::Face, "Ana") {
      announcer.person_detected("Ana").unwrap();
    }
    if throttle.should_announce(Category::System, "battery") {
      announcer.announce("Battery low", Priority::Medium, None).unwrap();
    }
  }
  assert!(announcer.wait_until_done(WAIT));
  assert_eq!(announcer.get_stats().announcements_made, 6);
}
