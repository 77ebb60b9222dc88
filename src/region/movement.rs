use std::sync::Arc;

use crate::geometry::Location;

use super::{RegionRegistry, SoundRegion};

/// Regions a subject entered and left while moving between two points.
#[derive(Debug, Default, Clone)]
pub struct RegionTransitions {
    pub entered: Vec<Arc<SoundRegion>>,
    pub left: Vec<Arc<SoundRegion>>,
}

impl RegionTransitions {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.left.is_empty()
    }
}

/// Compare region membership of `from` and `to` against one registry snapshot.
///
/// Moves inside the same block never produce transitions.
pub fn region_transitions(
    registry: &RegionRegistry,
    from: &Location,
    to: &Location,
) -> RegionTransitions {
    if from.world == to.world && from.block() == to.block() {
        return RegionTransitions::default();
    }

    let snapshot = registry.snapshot();
    let mut transitions = RegionTransitions::default();

    for region in snapshot.iter() {
        match (region.contains(from), region.contains(to)) {
            (false, true) => transitions.entered.push(Arc::clone(region)),
            (true, false) => transitions.left.push(Arc::clone(region)),
            _ => {}
        }
    }

    transitions
}
