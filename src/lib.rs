#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]
//! Priority-arbitrated spoken announcements.
//!
//! Any number of producers (obstacle, face, object, text, scene, color and currency
//! detectors, voice command responses) submit short texts with a [`Priority`]. A
//! single [`Announcer`] thread speaks them one at a time on a [`SpeechBackend`],
//! most urgent first, and lets urgent alerts cut off less urgent speech.
pub mod announcement;
pub mod announcer;
pub mod backends;
pub mod c_api;
pub mod config;
pub mod error;
pub mod logging;
pub mod observer;
pub mod policy;
pub mod queue;
pub mod throttle;
pub use crate::announcement::{Announcement, Category, Priority};
pub use crate::announcer::{Announcer, AnnouncerState, AnnouncerStats};
pub use crate::backends::{BackendKind, SpeechBackend};
pub use crate::config::{AnnouncerConfig, CooldownConfig, VoiceSettings};
pub use crate::error::AnnouncerError;
pub use crate::logging::init_tracing;
pub use crate::observer::{AnnouncerObserver, TracingObserver};
pub use crate::policy::PreemptionPolicy;
pub use crate::queue::AnnouncementQueue;
pub use crate::throttle::Throttle;
