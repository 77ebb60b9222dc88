/// A named, axis-aligned box in one world, used to gate or trigger sounds.
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, Local};
use regex::Regex;
use uuid::Uuid;

use crate::error::RegionError;
use crate::geometry::{self, BlockLocation, BlockPos, Location, WorldId};

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static pattern"))
}

/// Check a region name against the allowed character set.
pub fn validate_name(name: &str) -> Result<(), RegionError> {
    if name_pattern().is_match(name) {
        Ok(())
    } else {
        Err(RegionError::InvalidRegionName(name.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct SoundRegion {
    id: Uuid,
    name: String,
    description: Option<String>,
    /// `None` when created from the administrative console.
    creator: Option<Uuid>,
    created_at: DateTime<FixedOffset>,
    world: WorldId,
    min: BlockPos,
    max: BlockPos,
    border: HashSet<BlockPos>,
}

impl SoundRegion {
    /// Create a new region with a fresh id from two arbitrary corners.
    pub fn new(
        name: &str,
        first: &Location,
        second: &Location,
        creator: Option<Uuid>,
        description: Option<String>,
    ) -> Result<Self, RegionError> {
        Self::from_parts(
            Uuid::new_v4(),
            name,
            description,
            creator,
            Local::now().fixed_offset(),
            &first.block_location(),
            &second.block_location(),
        )
    }

    /// Assemble a region from already-parsed fields, normalizing the diagonals.
    ///
    /// Either the whole region is built or an error is returned.
    pub fn from_parts(
        id: Uuid,
        name: &str,
        description: Option<String>,
        creator: Option<Uuid>,
        created_at: DateTime<FixedOffset>,
        first: &BlockLocation,
        second: &BlockLocation,
    ) -> Result<Self, RegionError> {
        validate_name(name)?;
        let (min, max) = geometry::normalize(first, second)?;

        Ok(Self {
            id,
            name: name.to_string(),
            description,
            creator,
            created_at,
            world: min.world,
            border: geometry::border(min.pos, max.pos),
            min: min.pos,
            max: max.pos,
        })
    }

    /// Whether the block containing `location` lies inside this region.
    pub fn contains(&self, location: &Location) -> bool {
        if location.world != self.world {
            return false;
        }

        let b = location.block();
        b.x >= self.min.x
            && b.x <= self.max.x
            && b.y >= self.min.y
            && b.y <= self.max.y
            && b.z >= self.min.z
            && b.z <= self.max.z
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the region. An invalid name leaves the current one untouched.
    pub fn set_name(&mut self, name: &str) -> Result<(), RegionError> {
        validate_name(name)?;
        self.name = name.to_string();
        Ok(())
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn creator(&self) -> Option<Uuid> {
        self.creator
    }

    pub fn created_at(&self) -> DateTime<FixedOffset> {
        self.created_at
    }

    pub fn world(&self) -> &WorldId {
        &self.world
    }

    pub fn min_diagonal(&self) -> BlockLocation {
        BlockLocation::new(self.world.clone(), self.min)
    }

    pub fn max_diagonal(&self) -> BlockLocation {
        BlockLocation::new(self.world.clone(), self.max)
    }

    /// Replace the max corner and re-normalize against the current min corner.
    pub fn set_max_diagonal(&mut self, corner: &BlockLocation) -> Result<(), RegionError> {
        let other = self.min_diagonal();
        self.set_diagonals(corner, &other)
    }

    /// Replace the min corner and re-normalize against the current max corner.
    pub fn set_min_diagonal(&mut self, corner: &BlockLocation) -> Result<(), RegionError> {
        let other = self.max_diagonal();
        self.set_diagonals(corner, &other)
    }

    fn set_diagonals(
        &mut self,
        a: &BlockLocation,
        b: &BlockLocation,
    ) -> Result<(), RegionError> {
        if a.world != self.world {
            return Err(RegionError::InvalidRegion(format!(
                "diagonal must stay in world {}, got {}",
                self.world, a.world
            )));
        }

        let (min, max) = geometry::normalize(a, b)?;
        self.min = min.pos;
        self.max = max.pos;
        self.border = geometry::border(self.min, self.max);
        Ok(())
    }

    /// Edge points of this region, recomputed whenever a diagonal changes.
    pub fn border(&self) -> &HashSet<BlockPos> {
        &self.border
    }

    /// Compare every field except the id.
    pub fn is_similar(&self, other: &SoundRegion) -> bool {
        self.creator == other.creator
            && self.created_at == other.created_at
            && self.name == other.name
            && self.description == other.description
            && self.world == other.world
            && self.min == other.min
            && self.max == other.max
    }
}

impl PartialEq for SoundRegion {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SoundRegion {}

impl Hash for SoundRegion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
