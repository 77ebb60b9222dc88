/// Per-trigger sound bundles and the resolution rules that pick what plays.
use crate::config::ConfigSection;
use crate::error::{LoadReport, SoundConfigError};

use super::criteria::Criterion;
use super::descriptor::{flag, SoundDescriptor};

/// One configured sound section: the `Sounds` it plays plus its flags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SoundGroup {
    pub cancellable: bool,
    pub prevent_default: bool,
    pub prevent_other_criteria: bool,
    pub sounds: Vec<SoundDescriptor>,
}

impl SoundGroup {
    /// Parse an enabled section. The whole group fails if any sound is invalid.
    pub fn from_section(section: &ConfigSection) -> Result<Self, SoundConfigError> {
        let cancellable = flag(section, "Cancellable")?;
        let sounds_section = section
            .get_section("Sounds")
            .ok_or_else(|| SoundConfigError::invalid(section.path(), "missing Sounds"))?;

        if let Some((key, _)) = sounds_section.entries().find(|(_, v)| !v.is_object()) {
            return Err(SoundConfigError::invalid(
                sounds_section.child_path(key),
                "sound entry must be a section",
            ));
        }

        let sounds = sounds_section
            .sections()
            .iter()
            .map(|sound| SoundDescriptor::from_section(sound, cancellable))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            cancellable,
            prevent_default: flag(section, "Prevent Other Sounds.Default Sound")?,
            prevent_other_criteria: flag(section, "Prevent Other Sounds.Other Criteria")?,
            sounds,
        })
    }
}

/// A criterion key with the sounds it selects.
#[derive(Debug, Clone, PartialEq)]
pub struct RichSoundEntry {
    pub criterion: Criterion,
    pub group: SoundGroup,
}

/// Everything configured for one trigger: the default sounds and the
/// criteria-keyed entries, kept in configuration order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RichSound {
    default: Option<SoundGroup>,
    entries: Vec<RichSoundEntry>,
}

impl RichSound {
    pub fn new(default: Option<SoundGroup>, entries: Vec<RichSoundEntry>) -> Self {
        Self { default, entries }
    }

    /// Build from the trigger's default section and its criteria file.
    ///
    /// Invalid sections are reported and left out; they never stop the rest.
    pub fn load(
        default: Option<&ConfigSection>,
        criteria: Option<&ConfigSection>,
        report: &mut LoadReport,
    ) -> Self {
        let default = default
            .filter(|s| s.get_bool("Enabled").unwrap_or(false))
            .and_then(|s| match SoundGroup::from_section(s) {
                Ok(group) => Some(group),
                Err(e) => {
                    report.push(e);
                    None
                }
            });

        let mut entries = Vec::new();
        for section in criteria.map(ConfigSection::sections).unwrap_or_default() {
            if !section.get_bool("Enabled").unwrap_or(false) {
                continue;
            }

            let entry = Criterion::parse(section.name()).and_then(|criterion| {
                SoundGroup::from_section(&section).map(|group| RichSoundEntry { criterion, group })
            });
            match entry {
                Ok(entry) => entries.push(entry),
                Err(e) => report.push(e),
            }
        }

        Self { default, entries }
    }

    /// Listening means something could play: an enabled default or any criterion.
    pub fn is_enabled(&self) -> bool {
        self.default.is_some() || !self.entries.is_empty()
    }

    pub fn default_group(&self) -> Option<&SoundGroup> {
        self.default.as_ref()
    }

    pub fn entries(&self) -> &[RichSoundEntry] {
        &self.entries
    }

    /// Pick the sounds one event plays, in dispatch order.
    ///
    /// Matching entries are visited in configuration order. A cancelled event
    /// skips cancellable entries. A dispatched entry may drop the default or
    /// stop later entries from being considered. The default, if still in
    /// play, goes last.
    pub fn resolve(&self, discriminator: Option<&str>, cancelled: bool) -> Vec<&SoundDescriptor> {
        let mut out = Vec::new();
        if !self.is_enabled() {
            return out;
        }

        let mut default = self.default.as_ref();

        if let Some(value) = discriminator {
            for entry in self.entries.iter().filter(|e| e.criterion.matches(value)) {
                if cancelled && entry.group.cancellable {
                    continue;
                }

                out.extend(entry.group.sounds.iter());

                if entry.group.prevent_default {
                    default = None;
                }
                if entry.group.prevent_other_criteria {
                    break;
                }
            }
        }

        if let Some(group) = default {
            if !cancelled || !group.cancellable {
                out.extend(group.sounds.iter());
            }
        }

        out
    }
}
