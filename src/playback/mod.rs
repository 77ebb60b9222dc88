/// Playback: where a resolved sound plays, when, and through which host call.
pub mod host;
pub mod scheduler;
pub mod toggles;

pub use host::{AudioHost, LoggingAudioHost, PlayRequest, Subject, DEFAULT_EYE_HEIGHT};
pub use scheduler::PlaybackScheduler;
pub use toggles::SoundToggles;

use crate::geometry::Location;
use crate::sound::SoundDescriptor;

/// Outcome of a pre-play hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    Continue,
    Cancel,
}

/// Runs right before a request reaches the host. May move the request or
/// cancel it.
pub trait PrePlayHook: Send + Sync {
    fn before_play(&self, request: &mut PlayRequest) -> HookDecision;
}

impl<F> PrePlayHook for F
where
    F: Fn(&mut PlayRequest) -> HookDecision + Send + Sync,
{
    fn before_play(&self, request: &mut PlayRequest) -> HookDecision {
        self(request)
    }
}

/// Where `descriptor` plays for an event at `event_location`.
///
/// Eye location wins over a relative offset; both need a subject. Without
/// one the event location is used as-is.
pub fn final_location(
    descriptor: &SoundDescriptor,
    subject: Option<&Subject>,
    event_location: &Location,
) -> Location {
    let options = &descriptor.options;

    match subject {
        Some(subject) if options.eye_location => subject.eye_location(),
        Some(subject) => match &options.relative {
            Some(offset) => subject.location.offset_relative(offset),
            None => event_location.clone(),
        },
        None => event_location.clone(),
    }
}
