//! Region-aware sound dispatch.
//!
//! Trigger events come in from a host, get matched against the configured
//! sounds for their kind, are gated by region membership and end up as play
//! requests on the host audio system, now or after a tick delay.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod geometry;
pub mod messaging;
pub mod playback;
pub mod region;
pub mod sound;
pub mod trigger;

pub use dispatcher::{DispatchOutcome, SoundDispatcher};
pub use error::{AppResult, LoadReport};
