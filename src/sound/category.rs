use std::fmt;
use std::str::FromStr;

/// Mixer channel a sound plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SoundCategory {
    Ambient,
    Block,
    Hostile,
    #[default]
    Master,
    Music,
    Neutral,
    Player,
    Record,
    Voice,
    Weather,
}

impl SoundCategory {
    pub const ALL: [SoundCategory; 10] = [
        SoundCategory::Ambient,
        SoundCategory::Block,
        SoundCategory::Hostile,
        SoundCategory::Master,
        SoundCategory::Music,
        SoundCategory::Neutral,
        SoundCategory::Player,
        SoundCategory::Record,
        SoundCategory::Voice,
        SoundCategory::Weather,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundCategory::Ambient => "AMBIENT",
            SoundCategory::Block => "BLOCK",
            SoundCategory::Hostile => "HOSTILE",
            SoundCategory::Master => "MASTER",
            SoundCategory::Music => "MUSIC",
            SoundCategory::Neutral => "NEUTRAL",
            SoundCategory::Player => "PLAYER",
            SoundCategory::Record => "RECORD",
            SoundCategory::Voice => "VOICE",
            SoundCategory::Weather => "WEATHER",
        }
    }

    /// Plural spelling used by older engine APIs.
    pub fn legacy_name(&self) -> &'static str {
        match self {
            SoundCategory::Block => "BLOCKS",
            SoundCategory::Player => "PLAYERS",
            SoundCategory::Record => "RECORDS",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for SoundCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoundCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        SoundCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted || c.legacy_name() == wanted)
            .ok_or_else(|| format!("unknown sound category {:?}", s))
    }
}
