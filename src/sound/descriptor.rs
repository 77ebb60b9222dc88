/// Resolved, immutable sound playback parameters.
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::config::ConfigSection;
use crate::error::SoundConfigError;
use crate::geometry::RelativeOffset;

use super::SoundCategory;

pub const DEFAULT_VOLUME: f32 = 10.0;
pub const DEFAULT_PITCH: f32 = 1.0;

fn logical_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Z0-9_]+$").expect("static pattern"))
}

fn native_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9_.-]+(:[a-z0-9_./-]+)?$").expect("static pattern")
    })
}

/// Sound identifier as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SoundId {
    /// Engine-independent type name (`ENTITY_PLAYER_LEVELUP`), mapped by the
    /// host to whatever the running engine version calls it.
    Logical(String),
    /// Engine-native key (`minecraft:entity.player.levelup`), passed through.
    Native(String),
}

impl SoundId {
    pub fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if logical_pattern().is_match(raw) {
            Ok(SoundId::Logical(raw.to_string()))
        } else if native_pattern().is_match(raw) {
            Ok(SoundId::Native(raw.to_string()))
        } else {
            Err(format!("{:?} is not a valid sound name", raw))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SoundId::Logical(s) | SoundId::Native(s) => s,
        }
    }
}

impl fmt::Display for SoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoundOptions {
    /// Audible range handed to the host unchanged.
    pub radius: f64,
    /// Play at the subject's eye level instead of the event location.
    pub eye_location: bool,
    /// Reach subjects that turned their sounds off.
    pub ignores_disabled: bool,
    pub relative: Option<RelativeOffset>,
    /// Region names; when non-empty the event must happen inside one of them.
    pub regions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SoundDescriptor {
    pub sound: SoundId,
    pub category: SoundCategory,
    pub volume: f32,
    pub pitch: f32,
    /// Ticks to wait before playing; 0 plays on the current tick.
    pub delay: u64,
    pub options: SoundOptions,
    pub cancellable: bool,
}

impl SoundDescriptor {
    pub fn new(sound: SoundId) -> Self {
        Self {
            sound,
            category: SoundCategory::Master,
            volume: DEFAULT_VOLUME,
            pitch: DEFAULT_PITCH,
            delay: 0,
            options: SoundOptions::default(),
            cancellable: false,
        }
    }

    /// Build a descriptor from one entry of a `Sounds` section.
    pub fn from_section(
        section: &ConfigSection,
        cancellable: bool,
    ) -> Result<Self, SoundConfigError> {
        let invalid = |reason: String| SoundConfigError::invalid(section.path(), reason);

        let raw = section
            .get_string("Sound")
            .ok_or_else(|| invalid("missing Sound".to_string()))?;
        let sound = SoundId::parse(raw).map_err(invalid)?;

        let category = match section.get("Category") {
            None => SoundCategory::default(),
            Some(value) => value
                .as_str()
                .ok_or_else(|| invalid("Category must be a string".to_string()))?
                .parse::<SoundCategory>()
                .map_err(invalid)?,
        };

        let volume = non_negative(section, "Volume", DEFAULT_VOLUME as f64)? as f32;
        let pitch = non_negative(section, "Pitch", DEFAULT_PITCH as f64)? as f32;

        let delay = non_negative(section, "Delay", 0.0)?;
        if delay.fract() != 0.0 {
            return Err(invalid(format!("Delay must be a whole number of ticks, got {}", delay)));
        }
        if delay >= u64::MAX as f64 {
            return Err(invalid(format!("Delay {} is out of range", delay)));
        }

        Ok(Self {
            sound,
            category,
            volume,
            pitch,
            delay: delay as u64,
            options: SoundOptions::from_section(section)?,
            cancellable,
        })
    }
}

impl SoundOptions {
    fn from_section(section: &ConfigSection) -> Result<Self, SoundConfigError> {
        let relative = if section.contains("Options.Relative Location") {
            let offset = RelativeOffset::new(
                number(section, "Options.Relative Location.Right", 0.0)?,
                number(section, "Options.Relative Location.Up", 0.0)?,
                number(section, "Options.Relative Location.Front", 0.0)?,
            );
            (!offset.is_zero()).then_some(offset)
        } else {
            None
        };

        let regions = match section.get("Options.Regions") {
            None => Vec::new(),
            Some(_) => section.get_string_list("Options.Regions").ok_or_else(|| {
                SoundConfigError::invalid(section.path(), "Options.Regions must be a list of names")
            })?,
        };

        Ok(Self {
            radius: number(section, "Options.Radius", 0.0)?,
            eye_location: flag(section, "Options.Eye Location")?,
            ignores_disabled: flag(section, "Options.Ignores Disabled")?,
            relative,
            regions,
        })
    }
}

/// Optional finite number; absent means `default`, any other type is invalid.
pub(crate) fn number(
    section: &ConfigSection,
    key: &str,
    default: f64,
) -> Result<f64, SoundConfigError> {
    match section.get(key) {
        None => Ok(default),
        Some(_) => section
            .get_number(key)
            .filter(|v| v.is_finite())
            .ok_or_else(|| SoundConfigError::invalid(section.path(), format!("{} must be a number", key))),
    }
}

fn non_negative(section: &ConfigSection, key: &str, default: f64) -> Result<f64, SoundConfigError> {
    let value = number(section, key, default)?;
    if value < 0.0 {
        return Err(SoundConfigError::invalid(
            section.path(),
            format!("{} must not be negative, got {}", key, value),
        ));
    }
    Ok(value)
}

/// Optional boolean; absent means `false`.
pub(crate) fn flag(section: &ConfigSection, key: &str) -> Result<bool, SoundConfigError> {
    match section.get(key) {
        None => Ok(false),
        Some(_) => section
            .get_bool(key)
            .ok_or_else(|| SoundConfigError::invalid(section.path(), format!("{} must be true or false", key))),
    }
}
