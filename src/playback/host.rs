/// The boundary to the host audio system.
use std::collections::HashSet;

use uuid::Uuid;

use crate::geometry::Location;
use crate::sound::{SoundCategory, SoundId};

/// Default eye height of a standing player.
pub const DEFAULT_EYE_HEIGHT: f64 = 1.62;

/// An entity that triggered an event and may hear sounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: Uuid,
    pub location: Location,
    pub eye_height: f64,
}

impl Subject {
    pub fn new(id: Uuid, location: Location) -> Self {
        Self {
            id,
            location,
            eye_height: DEFAULT_EYE_HEIGHT,
        }
    }

    pub fn with_eye_height(mut self, eye_height: f64) -> Self {
        self.eye_height = eye_height;
        self
    }

    pub fn eye_location(&self) -> Location {
        self.location.translate(0.0, self.eye_height, 0.0)
    }
}

/// One fully resolved call into the host audio system.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub sound: SoundId,
    /// Engine-native name the host resolved `sound` to.
    pub native: String,
    pub category: SoundCategory,
    pub volume: f32,
    pub pitch: f32,
    pub radius: f64,
    pub location: Location,
    /// Subject the sound is aimed at; `None` plays at the location only.
    pub listener: Option<Uuid>,
    pub ignores_disabled: bool,
}

pub trait AudioHost: Send + Sync {
    /// Native name of `sound` on the running engine version, if it exists there.
    fn resolve_sound(&self, sound: &SoundId) -> Option<String>;

    /// Fire-and-forget playback.
    fn play(&self, request: &PlayRequest);
}

/// Host that only writes play requests to the log.
///
/// Logical sound types resolve to their lowercase dotted form unless a list of
/// available types is given.
#[derive(Debug, Default)]
pub struct LoggingAudioHost {
    available: Option<HashSet<String>>,
}

impl LoggingAudioHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_available(types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            available: Some(types.into_iter().map(Into::into).collect()),
        }
    }
}

impl AudioHost for LoggingAudioHost {
    fn resolve_sound(&self, sound: &SoundId) -> Option<String> {
        match sound {
            SoundId::Native(name) => Some(name.clone()),
            SoundId::Logical(name) => {
                if let Some(available) = &self.available {
                    if !available.contains(name) {
                        return None;
                    }
                }
                Some(format!("minecraft:{}", name.to_ascii_lowercase().replace('_', ".")))
            }
        }
    }

    fn play(&self, request: &PlayRequest) {
        tracing::info!(
            "Playing {} [{}] volume={} pitch={} radius={} at {} {:.2},{:.2},{:.2}{}",
            request.native,
            request.category,
            request.volume,
            request.pitch,
            request.radius,
            request.location.world,
            request.location.x,
            request.location.y,
            request.location.z,
            request
                .listener
                .map(|id| format!(" for {}", id))
                .unwrap_or_default()
        );
    }
}
