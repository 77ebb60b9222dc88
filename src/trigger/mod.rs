/// Triggers: the closed set of event kinds that may play sounds, each carrying
/// its own discriminator.
pub mod listener;

pub use listener::{ListenerState, Listeners};

use std::fmt;

use crate::geometry::Location;
use crate::playback::Subject;

/// Event kinds, one per configurable section of `sounds.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TriggerKind {
    Join,
    Leave,
    Chat,
    Command,
    PlayerSwing,
    ItemHeld,
    DropItem,
    CraftItem,
    FurnaceExtract,
    EntityDamage,
    Death,
    BedEnter,
    BedLeave,
    GameModeChange,
    Kick,
    LevelUp,
    ToggleFlight,
    ToggleSneak,
    InventoryClick,
    InventoryClose,
    PortalCreate,
    RegionEnter,
    RegionLeave,
    ServerStart,
}

impl TriggerKind {
    pub const ALL: [TriggerKind; 24] = [
        TriggerKind::Join,
        TriggerKind::Leave,
        TriggerKind::Chat,
        TriggerKind::Command,
        TriggerKind::PlayerSwing,
        TriggerKind::ItemHeld,
        TriggerKind::DropItem,
        TriggerKind::CraftItem,
        TriggerKind::FurnaceExtract,
        TriggerKind::EntityDamage,
        TriggerKind::Death,
        TriggerKind::BedEnter,
        TriggerKind::BedLeave,
        TriggerKind::GameModeChange,
        TriggerKind::Kick,
        TriggerKind::LevelUp,
        TriggerKind::ToggleFlight,
        TriggerKind::ToggleSneak,
        TriggerKind::InventoryClick,
        TriggerKind::InventoryClose,
        TriggerKind::PortalCreate,
        TriggerKind::RegionEnter,
        TriggerKind::RegionLeave,
        TriggerKind::ServerStart,
    ];

    /// Section name in `sounds.json`.
    pub fn config_name(&self) -> &'static str {
        match self {
            TriggerKind::Join => "Join Server",
            TriggerKind::Leave => "Leave Server",
            TriggerKind::Chat => "Player Chat",
            TriggerKind::Command => "Send Command",
            TriggerKind::PlayerSwing => "Player Swing",
            TriggerKind::ItemHeld => "Change Held Item",
            TriggerKind::DropItem => "Drop Item",
            TriggerKind::CraftItem => "Craft Item",
            TriggerKind::FurnaceExtract => "Furnace Extract",
            TriggerKind::EntityDamage => "Entity Hit",
            TriggerKind::Death => "Player Death",
            TriggerKind::BedEnter => "Bed Enter",
            TriggerKind::BedLeave => "Bed Leave",
            TriggerKind::GameModeChange => "Change Game Mode",
            TriggerKind::Kick => "Player Kicked",
            TriggerKind::LevelUp => "Change Level",
            TriggerKind::ToggleFlight => "Toggle Flight",
            TriggerKind::ToggleSneak => "Toggle Sneak",
            TriggerKind::InventoryClick => "Inventory Click",
            TriggerKind::InventoryClose => "Inventory Close",
            TriggerKind::PortalCreate => "Portal Create",
            TriggerKind::RegionEnter => "Region Enter",
            TriggerKind::RegionLeave => "Region Leave",
            TriggerKind::ServerStart => "Server Start",
        }
    }

    /// File holding criteria-keyed sounds for kinds that carry a discriminator.
    pub fn criteria_file(&self) -> Option<&'static str> {
        match self {
            TriggerKind::Command => Some("commands.json"),
            TriggerKind::PlayerSwing => Some("items_swung.json"),
            TriggerKind::ItemHeld => Some("items_held.json"),
            TriggerKind::DropItem => Some("items_dropped.json"),
            TriggerKind::CraftItem => Some("items_crafted.json"),
            TriggerKind::FurnaceExtract => Some("furnace_extracted.json"),
            TriggerKind::EntityDamage => Some("hit_sounds.json"),
            TriggerKind::GameModeChange => Some("game_modes.json"),
            TriggerKind::RegionEnter => Some("regions_entered.json"),
            TriggerKind::RegionLeave => Some("regions_left.json"),
            _ => None,
        }
    }

    /// Case-insensitive lookup by section name.
    pub fn from_config_name(name: &str) -> Option<TriggerKind> {
        let name = name.trim();
        TriggerKind::ALL
            .into_iter()
            .find(|k| k.config_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

/// One occurrence of a trigger with its discriminator payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    Join,
    Leave,
    Chat,
    Command { command: String },
    PlayerSwing { held: String },
    ItemHeld { material: String },
    DropItem { material: String },
    CraftItem { material: String },
    FurnaceExtract { material: String },
    EntityDamage { damager: String },
    Death,
    BedEnter,
    BedLeave,
    GameModeChange { mode: String },
    Kick,
    LevelUp,
    ToggleFlight,
    ToggleSneak,
    InventoryClick,
    InventoryClose,
    PortalCreate,
    RegionEnter { region: String },
    RegionLeave { region: String },
    ServerStart,
}

impl Trigger {
    pub fn kind(&self) -> TriggerKind {
        match self {
            Trigger::Join => TriggerKind::Join,
            Trigger::Leave => TriggerKind::Leave,
            Trigger::Chat => TriggerKind::Chat,
            Trigger::Command { .. } => TriggerKind::Command,
            Trigger::PlayerSwing { .. } => TriggerKind::PlayerSwing,
            Trigger::ItemHeld { .. } => TriggerKind::ItemHeld,
            Trigger::DropItem { .. } => TriggerKind::DropItem,
            Trigger::CraftItem { .. } => TriggerKind::CraftItem,
            Trigger::FurnaceExtract { .. } => TriggerKind::FurnaceExtract,
            Trigger::EntityDamage { .. } => TriggerKind::EntityDamage,
            Trigger::Death => TriggerKind::Death,
            Trigger::BedEnter => TriggerKind::BedEnter,
            Trigger::BedLeave => TriggerKind::BedLeave,
            Trigger::GameModeChange { .. } => TriggerKind::GameModeChange,
            Trigger::Kick => TriggerKind::Kick,
            Trigger::LevelUp => TriggerKind::LevelUp,
            Trigger::ToggleFlight => TriggerKind::ToggleFlight,
            Trigger::ToggleSneak => TriggerKind::ToggleSneak,
            Trigger::InventoryClick => TriggerKind::InventoryClick,
            Trigger::InventoryClose => TriggerKind::InventoryClose,
            Trigger::PortalCreate => TriggerKind::PortalCreate,
            Trigger::RegionEnter { .. } => TriggerKind::RegionEnter,
            Trigger::RegionLeave { .. } => TriggerKind::RegionLeave,
            Trigger::ServerStart => TriggerKind::ServerStart,
        }
    }

    /// Value matched against criterion keys.
    ///
    /// Commands are matched by their first word without the leading slash.
    pub fn discriminator(&self) -> Option<&str> {
        match self {
            Trigger::Command { command } => command
                .trim_start()
                .trim_start_matches('/')
                .split_whitespace()
                .next(),
            Trigger::PlayerSwing { held: value }
            | Trigger::ItemHeld { material: value }
            | Trigger::DropItem { material: value }
            | Trigger::CraftItem { material: value }
            | Trigger::FurnaceExtract { material: value }
            | Trigger::EntityDamage { damager: value }
            | Trigger::GameModeChange { mode: value }
            | Trigger::RegionEnter { region: value }
            | Trigger::RegionLeave { region: value } => Some(value.as_str()),
            _ => None,
        }
    }

    /// Build a trigger of `kind`. Kinds with a payload require a discriminator.
    pub fn new(kind: TriggerKind, discriminator: Option<String>) -> Option<Trigger> {
        let with = |f: fn(String) -> Trigger| discriminator.clone().map(f);

        match kind {
            TriggerKind::Join => Some(Trigger::Join),
            TriggerKind::Leave => Some(Trigger::Leave),
            TriggerKind::Chat => Some(Trigger::Chat),
            TriggerKind::Command => with(|command| Trigger::Command { command }),
            TriggerKind::PlayerSwing => with(|held| Trigger::PlayerSwing { held }),
            TriggerKind::ItemHeld => with(|material| Trigger::ItemHeld { material }),
            TriggerKind::DropItem => with(|material| Trigger::DropItem { material }),
            TriggerKind::CraftItem => with(|material| Trigger::CraftItem { material }),
            TriggerKind::FurnaceExtract => with(|material| Trigger::FurnaceExtract { material }),
            TriggerKind::EntityDamage => with(|damager| Trigger::EntityDamage { damager }),
            TriggerKind::Death => Some(Trigger::Death),
            TriggerKind::BedEnter => Some(Trigger::BedEnter),
            TriggerKind::BedLeave => Some(Trigger::BedLeave),
            TriggerKind::GameModeChange => with(|mode| Trigger::GameModeChange { mode }),
            TriggerKind::Kick => Some(Trigger::Kick),
            TriggerKind::LevelUp => Some(Trigger::LevelUp),
            TriggerKind::ToggleFlight => Some(Trigger::ToggleFlight),
            TriggerKind::ToggleSneak => Some(Trigger::ToggleSneak),
            TriggerKind::InventoryClick => Some(Trigger::InventoryClick),
            TriggerKind::InventoryClose => Some(Trigger::InventoryClose),
            TriggerKind::PortalCreate => Some(Trigger::PortalCreate),
            TriggerKind::RegionEnter => with(|region| Trigger::RegionEnter { region }),
            TriggerKind::RegionLeave => with(|region| Trigger::RegionLeave { region }),
            TriggerKind::ServerStart => Some(Trigger::ServerStart),
        }
    }
}

/// A trigger as delivered by the host, with the context dispatch needs.
#[derive(Debug, Clone)]
pub struct TriggerEvent {
    pub trigger: Trigger,
    /// Another handler already cancelled the host event.
    pub cancelled: bool,
    pub subject: Option<Subject>,
    pub location: Location,
}

impl TriggerEvent {
    pub fn new(trigger: Trigger, location: Location) -> Self {
        Self {
            trigger,
            cancelled: false,
            subject: None,
            location,
        }
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }
}
