/// Persisted form of a sound region.
///
/// One record per region, keyed by the region id. Field names match the
/// on-disk format:
///
/// ```text
/// { "Name": "spawn", "Creator": "<uuid>", "Creation Date": "2021-03-04T10:15:30-03:00",
///   "Description": "...", "World": "<world id>",
///   "Diagonals": { "First": {"X": 10, "Y": 70, "Z": 5}, "Second": {"X": 0, "Y": 60, "Z": -5} } }
/// ```
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RegionError;
use crate::geometry::{BlockLocation, BlockPos, WorldId};

use super::SoundRegion;

/// Resolves persisted coordinate-space identities to live worlds.
pub trait WorldLookup {
    fn resolve(&self, id: &str) -> Option<WorldId>;
}

/// Accepts every world id as-is.
pub struct AnyWorld;

impl WorldLookup for AnyWorld {
    fn resolve(&self, id: &str) -> Option<WorldId> {
        if id.trim().is_empty() {
            None
        } else {
            Some(WorldId::new(id))
        }
    }
}

/// Only the listed worlds exist.
pub struct KnownWorlds(pub Vec<WorldId>);

impl WorldLookup for KnownWorlds {
    fn resolve(&self, id: &str) -> Option<WorldId> {
        self.0.iter().find(|w| w.as_str() == id).cloned()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CornerRecord {
    #[serde(rename = "X")]
    pub x: Option<f64>,
    #[serde(rename = "Y")]
    pub y: Option<f64>,
    #[serde(rename = "Z")]
    pub z: Option<f64>,
}

impl CornerRecord {
    fn from_pos(pos: BlockPos) -> Self {
        Self {
            x: Some(pos.x as f64),
            y: Some(pos.y as f64),
            z: Some(pos.z as f64),
        }
    }

    fn to_pos(&self, id: Uuid, which: &str) -> Result<BlockPos, RegionError> {
        let axis = |value: Option<f64>, name: &str| -> Result<i32, RegionError> {
            let value = value.filter(|v| v.is_finite()).ok_or_else(|| {
                RegionError::invalid_data(id, format!("missing Diagonals.{}.{}", which, name))
            })?;
            let block = value.floor();
            if block < i32::MIN as f64 || block >= i32::MAX as f64 {
                return Err(RegionError::invalid_data(
                    id,
                    format!("Diagonals.{}.{} is out of range: {}", which, name, value),
                ));
            }
            Ok(block as i32)
        };

        Ok(BlockPos::new(
            axis(self.x, "X")?,
            axis(self.y, "Y")?,
            axis(self.z, "Z")?,
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagonalsRecord {
    #[serde(rename = "First")]
    pub first: Option<CornerRecord>,
    #[serde(rename = "Second")]
    pub second: Option<CornerRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionRecord {
    #[serde(rename = "Name")]
    pub name: Option<String>,
    #[serde(rename = "Creator", default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(rename = "Creation Date")]
    pub creation_date: Option<String>,
    #[serde(rename = "Description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "World")]
    pub world: Option<String>,
    #[serde(rename = "Diagonals")]
    pub diagonals: Option<DiagonalsRecord>,
}

impl RegionRecord {
    pub fn from_region(region: &SoundRegion) -> Self {
        Self {
            name: Some(region.name().to_string()),
            creator: region.creator().map(|c| c.to_string()),
            creation_date: Some(region.created_at().to_rfc3339()),
            description: region.description().map(str::to_string),
            world: Some(region.world().to_string()),
            diagonals: Some(DiagonalsRecord {
                first: Some(CornerRecord::from_pos(region.max_diagonal().pos)),
                second: Some(CornerRecord::from_pos(region.min_diagonal().pos)),
            }),
        }
    }

    /// Build the region stored under `id`. Nothing is built unless every
    /// required field is present and valid.
    pub fn into_region(
        self,
        id: Uuid,
        worlds: &dyn WorldLookup,
    ) -> Result<SoundRegion, RegionError> {
        let missing = |field: &str| RegionError::invalid_data(id, format!("missing {}", field));

        let name = self.name.ok_or_else(|| missing("Name"))?;
        let created_at = parse_creation_date(
            self.creation_date.as_deref().ok_or_else(|| missing("Creation Date"))?,
        )
        .ok_or_else(|| RegionError::invalid_data(id, "unparsable Creation Date"))?;

        let creator = match self.creator.as_deref() {
            Some(raw) => Some(
                Uuid::parse_str(raw)
                    .map_err(|_| RegionError::invalid_data(id, format!("bad Creator {:?}", raw)))?,
            ),
            None => None,
        };

        let world_id = self.world.ok_or_else(|| missing("World"))?;
        let world = worlds.resolve(&world_id).ok_or_else(|| {
            RegionError::invalid_data(id, format!("world {} does not exist or is not loaded", world_id))
        })?;

        let diagonals = self.diagonals.ok_or_else(|| missing("Diagonals"))?;
        let first = diagonals
            .first
            .ok_or_else(|| missing("Diagonals.First"))?
            .to_pos(id, "First")?;
        let second = diagonals
            .second
            .ok_or_else(|| missing("Diagonals.Second"))?
            .to_pos(id, "Second")?;

        SoundRegion::from_parts(
            id,
            &name,
            self.description,
            creator,
            created_at,
            &BlockLocation::new(world.clone(), first),
            &BlockLocation::new(world, second),
        )
        .map_err(|e| match e {
            RegionError::InvalidRegionName(n) => {
                RegionError::invalid_data(id, format!("invalid Name {:?}", n))
            }
            other => other,
        })
    }
}

/// Parse an ISO-8601 timestamp, tolerating a trailing `[Zone/Id]` suffix.
pub fn parse_creation_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let trimmed = raw.trim();
    let without_zone = match trimmed.find('[') {
        Some(idx) if trimmed.ends_with(']') => &trimmed[..idx],
        _ => trimmed,
    };

    DateTime::parse_from_rfc3339(without_zone).ok()
}
