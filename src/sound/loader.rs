/// Builds a complete sound configuration generation from the data folder.
use std::collections::HashMap;
use std::path::Path;

use crate::config::{ConfigSection, SOUNDS_FILE};
use crate::error::LoadReport;
use crate::trigger::TriggerKind;

use super::RichSound;

/// Immutable sound configuration for every trigger kind.
///
/// A snapshot is built in full before it is published and never changes
/// afterwards; reloads publish a new one.
#[derive(Debug, Default)]
pub struct SoundSnapshot {
    generation: u64,
    sounds: HashMap<TriggerKind, RichSound>,
}

impl SoundSnapshot {
    pub fn empty(generation: u64) -> Self {
        Self {
            generation,
            sounds: HashMap::new(),
        }
    }

    /// Assemble from already-read sections. `criteria` supplies the parsed
    /// criteria file of a kind, if it has one.
    pub fn from_sections(
        generation: u64,
        sounds: Option<&ConfigSection>,
        mut criteria: impl FnMut(TriggerKind) -> Option<ConfigSection>,
        report: &mut LoadReport,
    ) -> Self {
        let mut map = HashMap::new();

        if let Some(root) = sounds {
            for (key, _) in root.entries() {
                if TriggerKind::from_config_name(key).is_none() {
                    tracing::warn!("Ignoring unknown trigger section {:?} in {}", key, root.path());
                }
            }
        }

        for kind in TriggerKind::ALL {
            let default = sounds.and_then(|root| root.get_section(kind.config_name()));
            let criteria = criteria(kind);
            let rich = RichSound::load(default.as_ref(), criteria.as_ref(), report);

            if rich.is_enabled() {
                report.loaded += 1;
                map.insert(kind, rich);
            }
        }

        Self {
            generation,
            sounds: map,
        }
    }

    /// Read `sounds.json` and every criteria file under `dir`.
    ///
    /// Unreadable files are reported; everything else still loads.
    pub fn load(dir: &Path, generation: u64) -> (Self, LoadReport) {
        let mut report = LoadReport::new();

        let sounds = match ConfigSection::load(&dir.join(SOUNDS_FILE)) {
            Ok(Some(section)) => Some(section),
            Ok(None) => {
                tracing::warn!("No {} in {}, no default sounds", SOUNDS_FILE, dir.display());
                None
            }
            Err(e) => {
                report.push(e);
                None
            }
        };

        let mut failures = Vec::new();
        let snapshot = Self::from_sections(
            generation,
            sounds.as_ref(),
            |kind| {
                let file = dir.join(kind.criteria_file()?);
                match ConfigSection::load(&file) {
                    Ok(section) => section,
                    Err(e) => {
                        failures.push(e);
                        None
                    }
                }
            },
            &mut report,
        );

        for failure in failures {
            report.push(failure);
        }

        (snapshot, report)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, kind: TriggerKind) -> Option<&RichSound> {
        self.sounds.get(&kind)
    }

    pub fn is_enabled(&self, kind: TriggerKind) -> bool {
        self.sounds.get(&kind).is_some_and(RichSound::is_enabled)
    }
}
