use crate::announcement::{Category, Priority};
use crate::announcer::Announcer;
use crate::config::AnnouncerConfig;
use crate::logging::init_tracing;
use std::ffi::{c_char, c_int, CStr};
use std::time::Duration;
use tracing::error;
#[repr(C)]
pub struct AnnouncerCStats {
  pub announcements_made: u64,
  pub announcements_skipped: u64,
  pub announcements_interrupted: u64,
  pub queue_size: usize,
  pub is_speaking: bool,
}
unsafe fn string_from<'a>(text: *const c_char) -> Option<&'a str> {
  if text.is_null() {
    return None;
  }
  CStr::from_ptr(text).to_str().ok()
}
fn interrupt_from(interrupt: c_int) -> Option<bool> {
  match interrupt {
    value if value < 0 => None,
    0 => Some(false),
    _ => Some(true),
  }
}
#[no_mangle]
pub extern "C" fn announcer_init_logging() -> bool {
  init_tracing("info")
}
/// Creates an announcer, binds its configured backend and starts it.
///
/// # Safety
/// `config_path` must be null or a valid NUL-terminated string. A null path uses the
/// defaults. Returns null only if the configuration cannot be loaded; an unavailable
/// backend yields a stopped announcer that silently accepts announcements.
#[no_mangle]
pub unsafe extern "C" fn announcer_create(config_path: *const c_char) -> *mut Announcer {
  let config = if config_path.is_null() {
    AnnouncerConfig::default()
  } else {
    let Some(path) = string_from(config_path) else {
      error!("announcer configuration path is not valid UTF-8");
      return std::ptr::null_mut();
    };
    match AnnouncerConfig::load_from_file(path) {
      Ok(config) => config,
      Err(err) => {
        error!(%err, "failed to load announcer configuration");
        return std::ptr::null_mut();
      }
    }
  };
  let announcer = Announcer::new(config);
  if announcer.initialize().is_ok() {
    if let Err(err) = announcer.start() {
      error!(%err, "failed to start announcer");
    }
  }
  Box::into_raw(Box::new(announcer))
}
/// # Safety
/// `announcer` must come from `announcer_create` and `text` must be a valid
/// NUL-terminated string. `priority` is 1 (emergency) to 5 (low); `interrupt` is
/// negative for the configured default, 0 for no and anything else for yes.
#[no_mangle]
pub unsafe extern "C" fn announcer_announce(
  announcer: *const Announcer,
  text: *const c_char,
  priority: u8,
  interrupt: c_int,
) -> bool {
  let (Some(announcer), Some(text), Some(priority)) = (
    announcer.as_ref(),
    string_from(text),
    Priority::from_value(priority),
  ) else {
    return false;
  };
  announcer
    .submit(Category::System, text, priority, interrupt_from(interrupt))
    .is_ok()
}
/// # Safety
/// Same requirements as `announcer_announce`.
#[no_mangle]
pub unsafe extern "C" fn announcer_emergency(
  announcer: *const Announcer,
  text: *const c_char,
) -> bool {
  let (Some(announcer), Some(text)) = (announcer.as_ref(), string_from(text)) else {
    return false;
  };
  announcer.emergency_announce(text).is_ok()
}
/// # Safety
/// `announcer` must be null or come from `announcer_create`.
#[no_mangle]
pub unsafe extern "C" fn announcer_clear_queue(announcer: *const Announcer) -> usize {
  announcer.as_ref().map_or(0, Announcer::clear_queue)
}
/// # Safety
/// `announcer` must be null or come from `announcer_create`.
#[no_mangle]
pub unsafe extern "C" fn announcer_wait_until_done(
  announcer: *const Announcer,
  timeout_ms: u64,
) -> bool {
  announcer
    .as_ref()
    .is_some_and(|announcer| announcer.wait_until_done(Duration::from_millis(timeout_ms)))
}
/// # Safety
/// `announcer` must be null or come from `announcer_create`; `stats` must be null or
/// point to writable memory for one `AnnouncerCStats`.
#[no_mangle]
pub unsafe extern "C" fn announcer_get_stats(
  announcer: *const Announcer,
  stats: *mut AnnouncerCStats,
) -> bool {
  let (Some(announcer), false) = (announcer.as_ref(), stats.is_null()) else {
    return false;
  };
  let current = announcer.get_stats();
  stats.write(AnnouncerCStats {
    announcements_made: current.announcements_made,
    announcements_skipped: current.announcements_skipped,
    announcements_interrupted: current.announcements_interrupted,
    queue_size: current.queue_size,
    is_speaking: current.is_speaking,
  });
  true
}
/// # Safety
/// `announcer` must be null or come from `announcer_create`.
#[no_mangle]
pub unsafe extern "C" fn announcer_shutdown(announcer: *const Announcer) {
  if let Some(announcer) = announcer.as_ref() {
    announcer.shutdown();
  }
}
/// Shuts the announcer down if needed and frees it.
///
/// # Safety
/// `announcer` must be null or come from `announcer_create`, and must not be used
/// afterwards.
#[no_mangle]
pub unsafe extern "C" fn announcer_free(announcer: *mut Announcer) {
  if !announcer.is_null() {
    drop(Box::from_raw(announcer));
  }
}
#[cfg(test)]
mod tests {
  use super::*;
  use std::ffi::CString;
  use std::io::Write;
  fn null_backend_config() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "backend = \"null\"\npoll_interval_ms = 10").unwrap();
    file
  }
  #[test]
  fn speaks_through_the_c_surface() {
    let file = null_backend_config();
    let path = CString::new(file.path().to_str().unwrap()).unwrap();
    let text = CString::new("Door ahead").unwrap();
    unsafe {
      let announcer = announcer_create(path.as_ptr());
      assert!(!announcer.is_null());
      assert!(announcer_announce(announcer, text.as_ptr(), 2, -1));
      assert!(announcer_emergency(announcer, text.as_ptr()));
      assert!(announcer_wait_until_done(announcer, 5000));
      let mut stats = std::mem::MaybeUninit::<AnnouncerCStats>::uninit();
      assert!(announcer_get_stats(announcer, stats.as_mut_ptr()));
      let stats = stats.assume_init();
      assert_eq!(stats.announcements_made, 2);
      assert_eq!(stats.queue_size, 0);
      announcer_shutdown(announcer);
      announcer_shutdown(announcer);
      announcer_free(announcer);
    }
  }
  #[test]
  fn rejects_bad_arguments() {
    let file = null_backend_config();
    let path = CString::new(file.path().to_str().unwrap()).unwrap();
    let blank = CString::new("  ").unwrap();
    let text = CString::new("Stairs").unwrap();
    unsafe {
      let announcer = announcer_create(path.as_ptr());
      assert!(!announcer_announce(announcer, blank.as_ptr(), 3, -1));
      assert!(!announcer_announce(announcer, text.as_ptr(), 9, -1));
      assert!(!announcer_announce(announcer, std::ptr::null(), 3, -1));
      assert!(!announcer_announce(std::ptr::null(), text.as_ptr(), 3, -1));
      assert!(!announcer_get_stats(announcer, std::ptr::null_mut()));
      assert_eq!(announcer_clear_queue(std::ptr::null()), 0);
      announcer_free(announcer);
      announcer_free(std::ptr::null_mut());
    }
    let missing = CString::new("/nonexistent/announcer.toml").unwrap();
    assert!(unsafe { announcer_create(missing.as_ptr()) }.is_null());
  }
  #[test]
  fn interrupt_flag_mapping() {
    assert_eq!(interrupt_from(-1), None);
    assert_eq!(interrupt_from(0), Some(false));
    assert_eq!(interrupt_from(1), Some(true));
  }
}
