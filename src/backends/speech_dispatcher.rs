use crate::backends::SpeechBackend;
use crate::config::VoiceSettings;
use crate::error::AnnouncerError;
use ssip_client_async::*;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
const NAME: &str = "Speech Dispatcher";
/// Speech Dispatcher over SSIP.
///
/// Two connections are kept: utterances are sent on one and the announcer blocks
/// on its END or CANCEL notification, while cancellation goes through the other so
/// that `stop` never waits behind a blocked `speak`.
pub struct SpeechDispatcher {
  speaker: Mutex<Client<fifo::UnixStream>>,
  control: Mutex<Client<fifo::UnixStream>>,
  current: Mutex<Option<MessageId>>,
}
fn connect(role: &str) -> Result<Client<fifo::UnixStream>, anyhow::Error> {
  let mut client = fifo::Builder::new().build()?;
  client
    .set_client_name(ClientName::new("", &format!("announcer-{role}")))?
    .check_client_name_set()?;
  Ok(client)
}
fn scale(value: u8) -> i8 {
  let value = i16::from(value) * 2 - 100;
  i8::try_from(value).unwrap_or(i8::MAX)
}
fn configure(
  client: &mut Client<fifo::UnixStream>,
  settings: &VoiceSettings,
) -> Result<(), anyhow::Error> {
  match (settings.voice.as_deref(), settings.language.as_deref()) {
    (Some(voice), _) => {
      let (output_module, voice) = voice.split_once('/').unwrap_or(("", voice));
      if !output_module.is_empty() {
        client
          .set_output_module(ClientScope::Current, output_module)?
          .check_status(OK_OUTPUT_MODULE_SET)?;
      }
      client
        .set_synthesis_voice(ClientScope::Current, voice)?
        .check_status(OK_VOICE_SET)?;
    }
    (None, Some(language)) => {
      client
        .set_language(ClientScope::Current, language)?
        .check_status(OK_LANGUAGE_SET)?;
    }
    (None, None) => {}
  };
  client
    .set_rate(ClientScope::Current, scale(settings.rate))?
    .check_status(OK_RATE_SET)?;
  client
    .set_pitch(ClientScope::Current, scale(settings.pitch))?
    .check_status(OK_PITCH_SET)?;
  client
    .set_volume(ClientScope::Current, scale(settings.volume))?
    .check_status(OK_VOLUME_SET)?;
  client
    .set_notification(NotificationType::All, true)?
    .check_status(OK_NOTIFICATION_SET)?;
  Ok(())
}
impl SpeechDispatcher {
  pub fn new(settings: &VoiceSettings) -> Result<Self, AnnouncerError> {
    let mut speaker =
      connect("speaker").map_err(|err| AnnouncerError::into_backend_unavailable(NAME, err))?;
    configure(&mut speaker, settings)
      .map_err(|err| AnnouncerError::into_backend_unavailable(NAME, err))?;
    let control =
      connect("control").map_err(|err| AnnouncerError::into_backend_unavailable(NAME, err))?;
    info!("connected to Speech Dispatcher");
    Ok(SpeechDispatcher {
      speaker: Mutex::new(speaker),
      control: Mutex::new(control),
      current: Mutex::new(None),
    })
  }
  fn current(&self) -> MutexGuard<'_, Option<MessageId>> {
    self.current.lock().unwrap_or_else(PoisonError::into_inner)
  }
  fn speak_and_wait(&self, text: &str) -> Result<(), anyhow::Error> {
    let mut client = self.speaker.lock().unwrap_or_else(PoisonError::into_inner);
    let lines = text
      .lines()
      .map(std::borrow::ToOwned::to_owned)
      .collect::<Vec<String>>();
    let message_id = client
      .speak()?
      .check_receiving_data()?
      .send_lines(&lines)?
      .receive_message_id()?;
    *self.current() = Some(message_id.clone());
    let expected = message_id.to_string();
    let result = loop {
      let event = match client.receive_event() {
        Ok(event) => event,
        Err(error) => break Err(anyhow::Error::from(error)),
      };
      if event.id.message != expected {
        continue;
      }
      match event.ntype {
        EventType::End => break Ok(()),
        EventType::Cancel => {
          debug!(message = expected, "utterance cancelled");
          break Ok(());
        }
        _ => {}
      }
    };
    *self.current() = None;
    result
  }
}
impl SpeechBackend for SpeechDispatcher {
  fn name(&self) -> String {
    NAME.to_owned()
  }
  fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
    self
      .speak_and_wait(text)
      .map_err(|err| AnnouncerError::into_speak_failed(NAME, err))
  }
  fn stop(&self) -> Result<(), AnnouncerError> {
    let Some(message_id) = self.current().clone() else {
      return Ok(());
    };
    self
      .control
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .cancel(MessageScope::Message(message_id))
      .map_err(|err| AnnouncerError::into_stop_speech_failed(NAME, err))?
      .check_status(OK_CANCELED)
      .map_err(|err| AnnouncerError::into_stop_speech_failed(NAME, err))?;
    Ok(())
  }
}
