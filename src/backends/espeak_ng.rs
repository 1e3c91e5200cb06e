#![allow(non_upper_case_globals)]
use crate::backends::SpeechBackend;
use crate::config::VoiceSettings;
use crate::error::AnnouncerError;
use anyhow::anyhow;
use espeakng_sys::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::ffi::{c_void, CString};
use std::os::raw::{c_int, c_short};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;
use tracing::{debug, info};
static BUFFER: Mutex<Vec<i16>> = Mutex::new(Vec::new());
fn handle_espeak_error(error: espeak_ERROR) -> Result<(), anyhow::Error> {
  match error {
    espeak_ERROR_EE_OK => Ok(()),
    error => Err(anyhow!("eSpeak NG error: {}", error)),
  }
}
/// eSpeak NG synthesis played through a Rodio sink.
///
/// The output stream lives on its own thread because it cannot move between
/// threads; dropping the backend ends that thread and releases the device.
pub struct EspeakNg {
  sample_rate: u32,
  sink: Sink,
  mixer: OutputStreamHandle,
  synth_lock: Mutex<()>,
  _stream_guard: mpsc::Sender<()>,
}
impl EspeakNg {
  pub fn new(settings: &VoiceSettings) -> Result<Self, AnnouncerError> {
    let name = "eSpeak NG";
    let (sink, mixer, stream_guard) =
      open_sink().map_err(|err| AnnouncerError::into_backend_unavailable(name, err))?;
    let output: espeak_AUDIO_OUTPUT = espeak_AUDIO_OUTPUT_AUDIO_OUTPUT_SYNCHRONOUS;
    let path_cstr = CString::new(".").map_err(AnnouncerError::into_unknown)?;
    let sample_rate: u32 = unsafe { espeak_Initialize(output, 0, path_cstr.as_ptr(), 0) }
      .try_into()
      .map_err(|err| AnnouncerError::into_backend_unavailable(name, err))?;
    apply_voice(settings).map_err(|err| AnnouncerError::into_backend_unavailable(name, err))?;
    info!(sample_rate, "eSpeak NG initialized");
    Ok(EspeakNg {
      sample_rate,
      sink,
      mixer,
      synth_lock: Mutex::new(()),
      _stream_guard: stream_guard,
    })
  }
  fn synthesize(&self, text: &str) -> Result<Vec<i16>, anyhow::Error> {
    let _guard = self
      .synth_lock
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    BUFFER.lock().unwrap_or_else(PoisonError::into_inner).clear();
    unsafe { espeak_SetSynthCallback(Some(synth_callback)) };
    let text_cstr = CString::new(text)?;
    let position = 0u32;
    let position_type: espeak_POSITION_TYPE = 0;
    let end_position = 0u32;
    let flags = espeakCHARS_AUTO;
    let identifier = std::ptr::null_mut();
    let user_data = std::ptr::null_mut();
    handle_espeak_error(unsafe {
      espeak_Synth(
        text_cstr.as_ptr().cast::<c_void>(),
        text_cstr.count_bytes(),
        position,
        position_type,
        end_position,
        flags,
        identifier,
        user_data,
      )
    })?;
    Ok(std::mem::take(
      &mut *BUFFER.lock().unwrap_or_else(PoisonError::into_inner),
    ))
  }
}
fn open_sink() -> Result<(Sink, OutputStreamHandle, mpsc::Sender<()>), anyhow::Error> {
  let (sink_tx, sink_rx) = mpsc::channel();
  let (guard_tx, guard_rx) = mpsc::channel::<()>();
  thread::Builder::new()
    .name("espeak-ng-output".to_owned())
    .spawn(move || {
      let opened = OutputStream::try_default()
        .map_err(anyhow::Error::from)
        .and_then(|(stream, handle)| {
          Sink::try_new(&handle)
            .map(|sink| (stream, sink, handle.clone()))
            .map_err(anyhow::Error::from)
        });
      match opened {
        Ok((stream, sink, handle)) => {
          if sink_tx.send(Ok((sink, handle))).is_ok() {
            let _closed = guard_rx.recv();
          }
          drop(stream);
        }
        Err(error) => {
          let _result = sink_tx.send(Err(error));
        }
      }
    })?;
  let (sink, handle) = sink_rx.recv()??;
  Ok((sink, handle, guard_tx))
}
fn apply_voice(settings: &VoiceSettings) -> Result<(), anyhow::Error> {
  match (settings.voice.as_deref(), settings.language.as_deref()) {
    (Some(voice), _) => {
      let voice_cstr = CString::new(voice)?;
      handle_espeak_error(unsafe { espeak_SetVoiceByName(voice_cstr.as_ptr()) })
        .map_err(|err| err.context(format!("No voice was found with the name {voice}")))?;
    }
    (None, Some(language)) => {
      let language_cstr = CString::new(language)?;
      let mut voice_spec = espeak_VOICE {
        name: std::ptr::null(),
        languages: language_cstr.as_ptr(),
        identifier: std::ptr::null(),
        gender: 0,
        age: 0,
        variant: 0,
        xx1: 0,
        score: 0,
        spare: std::ptr::null_mut(),
      };
      handle_espeak_error(unsafe { espeak_SetVoiceByProperties(&mut voice_spec) })
        .map_err(|err| err.context(format!("No voice was found with the language {language}")))?;
    }
    (None, None) => {}
  };
  let rate = f64::from(settings.rate);
  let rate = (rate / 100.0) * f64::from(espeakRATE_MAXIMUM - espeakRATE_MINIMUM)
    + f64::from(espeakRATE_MINIMUM);
  #[allow(clippy::cast_possible_truncation)]
  let rate = rate.round() as i32;
  handle_espeak_error(unsafe { espeak_SetParameter(espeak_PARAMETER_espeakRATE, rate, 0) })?;
  let volume = i32::from(settings.volume);
  handle_espeak_error(unsafe {
    espeak_SetParameter(espeak_PARAMETER_espeakVOLUME, volume * 2, 0)
  })?;
  let pitch = i32::from(settings.pitch);
  handle_espeak_error(unsafe { espeak_SetParameter(espeak_PARAMETER_espeakPITCH, pitch, 0) })?;
  Ok(())
}
impl SpeechBackend for EspeakNg {
  fn name(&self) -> String {
    "eSpeak NG".to_owned()
  }
  fn speak(&self, text: &str) -> Result<(), AnnouncerError> {
    let samples = self
      .synthesize(text)
      .map_err(|err| AnnouncerError::into_speak_failed(&self.name(), err))?;
    debug!(samples = samples.len(), "playing synthesized speech");
    self
      .sink
      .append(SamplesBuffer::new(1, self.sample_rate, samples));
    self.sink.sleep_until_end();
    Ok(())
  }
  fn stop(&self) -> Result<(), AnnouncerError> {
    self.sink.stop();
    Ok(())
  }
  #[allow(clippy::cast_precision_loss)]
  fn play_tone(&self, frequency_hz: u32, duration: Duration) -> Result<bool, AnnouncerError> {
    let tone = rodio::source::SineWave::new(frequency_hz as f32)
      .take_duration(duration)
      .amplify(0.2);
    self
      .mixer
      .play_raw(tone)
      .map_err(AnnouncerError::into_play_audio_failed)?;
    Ok(true)
  }
}
unsafe extern "C" fn synth_callback(
  wav: *mut c_short,
  sample_count: c_int,
  _events: *mut espeak_EVENT,
) -> c_int {
  if !wav.is_null() && sample_count > 0 {
    let samples = std::slice::from_raw_parts(wav, sample_count.unsigned_abs() as usize);
    BUFFER
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .extend_from_slice(samples);
  }
  0
}
