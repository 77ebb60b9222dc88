/// Event types broadcast by the dispatcher
///
/// Events represent things that have happened (past tense).
/// They are broadcast to all subscribers.
use uuid::Uuid;

use crate::geometry::Location;
use crate::trigger::TriggerKind;

#[derive(Debug, Clone)]
pub enum DispatchEvent {
    /// A request reached the audio host
    SoundPlayed {
        sound: String,
        location: Location,
        listener: Option<Uuid>,
    },

    /// A sound was dropped because the engine does not know it
    SoundUnavailable { sound: String, trigger: TriggerKind },

    /// A pre-play hook cancelled a request
    SoundCancelled { sound: String },

    /// A new sound configuration generation was published
    ConfigReloaded {
        generation: u64,
        listening: usize,
        failures: usize,
    },

    RegionAdded { id: Uuid, name: String },

    RegionRemoved { id: Uuid, name: String },
}

impl DispatchEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            DispatchEvent::SoundPlayed { sound, listener, .. } => match listener {
                Some(id) => format!("Played {} for {}", sound, id),
                None => format!("Played {}", sound),
            },
            DispatchEvent::SoundUnavailable { sound, trigger } => {
                format!("Sound {} unavailable ({})", sound, trigger)
            }
            DispatchEvent::SoundCancelled { sound } => format!("Cancelled {}", sound),
            DispatchEvent::ConfigReloaded {
                generation,
                listening,
                failures,
            } => format!(
                "Configuration #{} published: {} listening, {} error(s)",
                generation, listening, failures
            ),
            DispatchEvent::RegionAdded { name, .. } => format!("Region added: {}", name),
            DispatchEvent::RegionRemoved { name, .. } => format!("Region removed: {}", name),
        }
    }
}
