use crate::announcement::Category;
use crate::backends::BackendKind;
use crate::error::AnnouncerError;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
/// Announcer settings, loaded from TOML.
///
/// Every field has a default, so an empty file yields a usable configuration.
/// Producers read [`CooldownConfig`] to throttle themselves; the announcer never
/// suppresses repeated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncerConfig {
  /// Allow urgent announcements to cut off less urgent speech.
  pub priority_interrupt: bool,
  /// Interrupt flag used when a caller does not specify one.
  pub default_interruptible: bool,
  /// How long the consumer waits on an empty queue before checking for shutdown.
  pub poll_interval_ms: u64,
  /// How long shutdown waits for the utterance in progress.
  pub drain_timeout_ms: u64,
  /// How long shutdown waits for the consumer thread to exit.
  pub join_timeout_ms: u64,
  pub enable_audio_cues: bool,
  pub backend: BackendKind,
  pub voice: VoiceSettings,
  /// Pacing of the simulated backend.
  pub simulated_words_per_minute: u32,
  pub cooldowns: CooldownConfig,
}
impl Default for AnnouncerConfig {
  fn default() -> Self {
    AnnouncerConfig {
      priority_interrupt: true,
      default_interruptible: true,
      poll_interval_ms: 500,
      drain_timeout_ms: 5000,
      join_timeout_ms: 2000,
      enable_audio_cues: true,
      backend: BackendKind::SpeechDispatcher,
      voice: VoiceSettings::default(),
      simulated_words_per_minute: 160,
      cooldowns: CooldownConfig::default(),
    }
  }
}
/// Voice parameters on a 0 to 100 scale, mapped onto each engine's own range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
  pub voice: Option<String>,
  pub language: Option<String>,
  pub rate: u8,
  pub volume: u8,
  pub pitch: u8,
}
impl Default for VoiceSettings {
  fn default() -> Self {
    VoiceSettings {
      voice: None,
      language: Some("en".to_owned()),
      rate: 50,
      volume: 90,
      pitch: 50,
    }
  }
}
impl VoiceSettings {
  pub fn validate(&self) -> Result<(), AnnouncerError> {
    if self.rate > 100 {
      return Err(AnnouncerError::InvalidRate(self.rate));
    }
    if self.volume > 100 {
      return Err(AnnouncerError::InvalidVolume(self.volume));
    }
    if self.pitch > 100 {
      return Err(AnnouncerError::InvalidPitch(self.pitch));
    }
    Ok(())
  }
}
/// Minimum seconds between two announcements about the same subject, per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
  pub obstacle: f64,
  pub face: f64,
  pub object: f64,
  pub text: f64,
  pub scene: f64,
  pub color: f64,
  pub currency: f64,
  pub system: f64,
}
impl Default for CooldownConfig {
  fn default() -> Self {
    CooldownConfig {
      obstacle: 2.0,
      face: 2.0,
      object: 5.0,
      text: 0.0,
      scene: 10.0,
      color: 2.0,
      currency: 3.0,
      system: 0.0,
    }
  }
}
impl CooldownConfig {
  #[must_use]
  pub fn seconds(&self, category: Category) -> f64 {
    match category {
      Category::Obstacle => self.obstacle,
      Category::Face => self.face,
      Category::Object => self.object,
      Category::Text => self.text,
      Category::Scene => self.scene,
      Category::Color => self.color,
      Category::Currency => self.currency,
      Category::System => self.system,
    }
  }
  /// Interval for `category`. Only meaningful after [`CooldownConfig::validate`].
  #[must_use]
  pub fn interval(&self, category: Category) -> Duration {
    Duration::from_secs_f64(self.seconds(category).max(0.0))
  }
  pub fn validate(&self) -> Result<(), AnnouncerError> {
    for category in [
      Category::Obstacle,
      Category::Face,
      Category::Object,
      Category::Text,
      Category::Scene,
      Category::Color,
      Category::Currency,
      Category::System,
    ] {
      let seconds = self.seconds(category);
      if !seconds.is_finite() || seconds < 0.0 {
        return Err(AnnouncerError::into_invalid_config(anyhow!(
          "Cooldown for {category} must be a non-negative number of seconds, got {seconds}"
        )));
      }
    }
    Ok(())
  }
}
impl AnnouncerConfig {
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AnnouncerError> {
    let content = fs::read_to_string(path.as_ref()).map_err(|err| {
      AnnouncerError::into_invalid_config(
        anyhow!(err).context(format!("Failed to read {}", path.as_ref().display())),
      )
    })?;
    let config = Self::from_toml(&content)?;
    Ok(config)
  }
  pub fn from_toml(content: &str) -> Result<Self, AnnouncerError> {
    let config: AnnouncerConfig =
      toml::from_str(content).map_err(AnnouncerError::into_invalid_config)?;
    config.validate()?;
    Ok(config)
  }
  pub fn validate(&self) -> Result<(), AnnouncerError> {
    for (name, value) in [
      ("poll_interval_ms", self.poll_interval_ms),
      ("drain_timeout_ms", self.drain_timeout_ms),
      ("join_timeout_ms", self.join_timeout_ms),
    ] {
      if value == 0 {
        return Err(AnnouncerError::into_invalid_config(anyhow!(
          "{name} must be greater than zero"
        )));
      }
    }
    if self.simulated_words_per_minute == 0 {
      return Err(AnnouncerError::into_invalid_config(anyhow!(
        "simulated_words_per_minute must be greater than zero"
      )));
    }
    self.voice.validate()?;
    self.cooldowns.validate()?;
    Ok(())
  }
  #[must_use]
  pub fn poll_interval(&self) -> Duration {
    Duration::from_millis(self.poll_interval_ms)
  }
  #[must_use]
  pub fn drain_timeout(&self) -> Duration {
    Duration::from_millis(self.drain_timeout_ms)
  }
  #[must_use]
  pub fn join_timeout(&self) -> Duration {
    Duration::from_millis(self.join_timeout_ms)
  }
}
