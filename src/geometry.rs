/// Points, coordinate spaces and the box geometry used by sound regions.
use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RegionError;

/// Identity of a coordinate space (world or dimension).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(String);

impl WorldId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn min(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: BlockPos) -> BlockPos {
        BlockPos::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A block position inside a specific coordinate space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockLocation {
    pub world: WorldId,
    pub pos: BlockPos,
}

impl BlockLocation {
    pub fn new(world: WorldId, pos: BlockPos) -> Self {
        Self { world, pos }
    }
}

/// Offset relative to where a subject is facing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RelativeOffset {
    pub right: f64,
    pub up: f64,
    pub front: f64,
}

impl RelativeOffset {
    pub fn new(right: f64, up: f64, front: f64) -> Self {
        Self { right, up, front }
    }

    pub fn is_zero(&self) -> bool {
        self.right == 0.0 && self.up == 0.0 && self.front == 0.0
    }
}

/// A precise point in a coordinate space, with a facing direction.
///
/// `yaw` follows the host convention: 0 faces +Z, 90 faces -X.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub world: WorldId,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
}

impl Location {
    pub fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self {
            world,
            x,
            y,
            z,
            yaw: 0.0,
        }
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Block coordinates (floored, so -0.5 lands in block -1).
    pub fn block(&self) -> BlockPos {
        BlockPos::new(
            self.x.floor() as i32,
            self.y.floor() as i32,
            self.z.floor() as i32,
        )
    }

    pub fn block_location(&self) -> BlockLocation {
        BlockLocation::new(self.world.clone(), self.block())
    }

    pub fn translate(&self, dx: f64, dy: f64, dz: f64) -> Location {
        Location {
            world: self.world.clone(),
            x: self.x + dx,
            y: self.y + dy,
            z: self.z + dz,
            yaw: self.yaw,
        }
    }

    /// Move by an offset expressed in the frame of this location's yaw.
    pub fn offset_relative(&self, offset: &RelativeOffset) -> Location {
        let yaw = (self.yaw as f64).to_radians();
        let (sin, cos) = yaw.sin_cos();

        // front = (-sin, 0, cos), right = (-cos, 0, -sin)
        let dx = -sin * offset.front - cos * offset.right;
        let dz = cos * offset.front - sin * offset.right;

        self.translate(dx, offset.up, dz)
    }
}

/// Sort two corners into (min, max) componentwise.
///
/// Both corners must share a coordinate space.
pub fn normalize(
    a: &BlockLocation,
    b: &BlockLocation,
) -> Result<(BlockLocation, BlockLocation), RegionError> {
    if a.world != b.world {
        return Err(RegionError::InvalidRegion(format!(
            "diagonals are in different worlds ({} and {})",
            a.world, b.world
        )));
    }

    Ok((
        BlockLocation::new(a.world.clone(), a.pos.min(b.pos)),
        BlockLocation::new(a.world.clone(), a.pos.max(b.pos)),
    ))
}

/// Edge wireframe of the box spanned by `min` and `max`.
///
/// Iterates one unit past `max` on every axis and keeps the points that sit on
/// at least two axis extremes at once. A point on a single face is not kept.
/// O(volume).
pub fn border(min: BlockPos, max: BlockPos) -> HashSet<BlockPos> {
    let end = BlockPos::new(
        max.x.saturating_add(1),
        max.y.saturating_add(1),
        max.z.saturating_add(1),
    );
    let mut points = HashSet::new();

    for x in min.x..=end.x {
        let edge_x = x == min.x || x == end.x;
        for y in min.y..=end.y {
            let edge_y = y == min.y || y == end.y;
            for z in min.z..=end.z {
                let edge_z = z == min.z || z == end.z;

                if (edge_x && edge_y) || (edge_z && edge_y) || (edge_x && edge_z) {
                    points.insert(BlockPos::new(x, y, z));
                }
            }
        }
    }

    points
}
