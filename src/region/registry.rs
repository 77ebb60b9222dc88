/// In-memory collection of sound regions.
///
/// Readers take a snapshot (`Arc` clone) and never block writers for longer
/// than the pointer swap. Writers copy the list, change the copy, and publish
/// it, so a reader sees either the old or the new set, never a mix.
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{LoadReport, RegionError, StoreError};
use crate::geometry::{BlockLocation, Location};

use super::{RegionRecord, RegionStore, SoundRegion, WorldLookup};

pub type RegionSnapshot = Arc<Vec<Arc<SoundRegion>>>;

#[derive(Default)]
pub struct RegionRegistry {
    regions: RwLock<RegionSnapshot>,
}

impl RegionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current set of regions.
    pub fn snapshot(&self) -> RegionSnapshot {
        Arc::clone(&self.regions.read())
    }

    pub fn len(&self) -> usize {
        self.regions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.read().is_empty()
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<Arc<SoundRegion>>) -> Result<T, RegionError>,
    ) -> Result<T, RegionError> {
        let mut guard = self.regions.write();
        let mut next: Vec<Arc<SoundRegion>> = guard.as_ref().clone();
        let out = f(&mut next)?;
        *guard = Arc::new(next);
        Ok(out)
    }

    pub fn add(&self, region: SoundRegion) -> Result<Arc<SoundRegion>, RegionError> {
        let region = Arc::new(region);
        self.mutate(|regions| {
            if regions.iter().any(|r| r.id() == region.id()) {
                return Err(RegionError::Duplicate(region.id()));
            }
            regions.push(Arc::clone(&region));
            Ok(())
        })?;

        tracing::info!("Registered region {} ({})", region.name(), region.id());
        Ok(region)
    }

    pub fn remove(&self, id: Uuid) -> Option<Arc<SoundRegion>> {
        let removed = self
            .mutate(|regions| {
                let idx = regions
                    .iter()
                    .position(|r| r.id() == id)
                    .ok_or(RegionError::NotFound(id))?;
                Ok(regions.remove(idx))
            })
            .ok()?;

        tracing::info!("Unregistered region {} ({})", removed.name(), id);
        Some(removed)
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<SoundRegion>> {
        self.regions.read().iter().find(|r| r.id() == id).cloned()
    }

    /// First region whose name matches, ignoring case.
    pub fn find_by_name(&self, name: &str) -> Option<Arc<SoundRegion>> {
        self.regions
            .read()
            .iter()
            .find(|r| r.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// Every region containing `location`. Linear scan, O(regions).
    pub fn find_containing(&self, location: &Location) -> Vec<Arc<SoundRegion>> {
        self.snapshot()
            .iter()
            .filter(|r| r.contains(location))
            .cloned()
            .collect()
    }

    /// Apply a change to one region, publishing the result only if it succeeds.
    pub fn update(
        &self,
        id: Uuid,
        change: impl FnOnce(&mut SoundRegion) -> Result<(), RegionError>,
    ) -> Result<Arc<SoundRegion>, RegionError> {
        self.mutate(|regions| {
            let slot = regions
                .iter_mut()
                .find(|r| r.id() == id)
                .ok_or(RegionError::NotFound(id))?;

            let mut edited = SoundRegion::clone(slot);
            change(&mut edited)?;
            *slot = Arc::new(edited);
            Ok(Arc::clone(slot))
        })
    }

    pub fn rename(&self, id: Uuid, name: &str) -> Result<Arc<SoundRegion>, RegionError> {
        self.update(id, |r| r.set_name(name))
    }

    pub fn set_description(
        &self,
        id: Uuid,
        description: Option<String>,
    ) -> Result<Arc<SoundRegion>, RegionError> {
        self.update(id, |r| {
            r.set_description(description);
            Ok(())
        })
    }

    pub fn set_min_diagonal(
        &self,
        id: Uuid,
        corner: &BlockLocation,
    ) -> Result<Arc<SoundRegion>, RegionError> {
        self.update(id, |r| r.set_min_diagonal(corner))
    }

    pub fn set_max_diagonal(
        &self,
        id: Uuid,
        corner: &BlockLocation,
    ) -> Result<Arc<SoundRegion>, RegionError> {
        self.update(id, |r| r.set_max_diagonal(corner))
    }

    /// Replace the whole set at once.
    pub fn replace_all(&self, regions: Vec<SoundRegion>) {
        let next: Vec<Arc<SoundRegion>> = regions.into_iter().map(Arc::new).collect();
        *self.regions.write() = Arc::new(next);
    }

    /// Load every stored record, then publish the loaded set in one step.
    ///
    /// Broken records are skipped and reported; they never stop the others.
    pub fn load_from(&self, store: &dyn RegionStore, worlds: &dyn WorldLookup) -> LoadReport {
        let mut report = LoadReport::new();
        let mut loaded = Vec::new();

        let ids = match store.list_ids() {
            Ok(ids) => ids,
            Err(e) => {
                report.push(e);
                Vec::new()
            }
        };

        for id in ids {
            let record = match store.read(id) {
                Ok(record) => record,
                Err(StoreError::Parse { source, .. }) => {
                    report.push(RegionError::invalid_data(id, source.to_string()));
                    continue;
                }
                Err(e) => {
                    report.push(e);
                    continue;
                }
            };

            match record.into_region(id, worlds) {
                Ok(region) => loaded.push(region),
                Err(e) => {
                    tracing::warn!("Skipping region {}: {}", id, e);
                    report.push(e);
                }
            }
        }

        report.loaded = loaded.len();
        self.replace_all(loaded);
        report
    }

    /// Write one region back to the store. Returns `false` if it is not registered.
    pub fn save(&self, store: &dyn RegionStore, id: Uuid) -> Result<bool, StoreError> {
        match self.get(id) {
            Some(region) => {
                store.write(id, &RegionRecord::from_region(&region))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unregister a region and delete its record.
    pub fn delete(
        &self,
        store: &dyn RegionStore,
        id: Uuid,
    ) -> Result<Option<Arc<SoundRegion>>, StoreError> {
        store.delete(id)?;
        Ok(self.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BlockPos, WorldId};
    use crate::region::{AnyWorld, JsonRegionStore};

    fn w() -> WorldId {
        WorldId::new("overworld")
    }

    fn region(name: &str, a: (f64, f64, f64), b: (f64, f64, f64)) -> SoundRegion {
        SoundRegion::new(
            name,
            &Location::new(w(), a.0, a.1, a.2),
            &Location::new(w(), b.0, b.1, b.2),
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn test_add_get_remove() {
        let registry = RegionRegistry::new();
        let r = registry.add(region("a", (0.0, 0.0, 0.0), (5.0, 5.0, 5.0))).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(r.id()).unwrap().name(), "a");
        assert_eq!(registry.find_by_name("A").unwrap().id(), r.id());

        assert!(registry.remove(r.id()).is_some());
        assert!(registry.get(r.id()).is_none());
        assert!(registry.remove(r.id()).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let registry = RegionRegistry::new();
        let r = region("a", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0));
        registry.add(r.clone()).unwrap();
        assert!(matches!(registry.add(r), Err(RegionError::Duplicate(_))));
    }

    #[test]
    fn test_find_containing_overlaps() {
        let registry = RegionRegistry::new();
        registry.add(region("big", (0.0, 0.0, 0.0), (10.0, 10.0, 10.0))).unwrap();
        registry.add(region("small", (2.0, 2.0, 2.0), (3.0, 3.0, 3.0))).unwrap();

        let inside_both = registry.find_containing(&Location::new(w(), 2.5, 2.5, 2.5));
        assert_eq!(inside_both.len(), 2);

        let inside_big = registry.find_containing(&Location::new(w(), 8.0, 8.0, 8.0));
        assert_eq!(inside_big.len(), 1);
        assert_eq!(inside_big[0].name(), "big");

        assert!(registry
            .find_containing(&Location::new(w(), 20.0, 0.0, 0.0))
            .is_empty());
    }

    #[test]
    fn test_snapshot_is_stable_across_mutation() {
        let registry = RegionRegistry::new();
        registry.add(region("a", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).unwrap();

        let before = registry.snapshot();
        registry.add(region("b", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn test_rename_failure_keeps_old_name() {
        let registry = RegionRegistry::new();
        let r = registry.add(region("a", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).unwrap();

        assert!(matches!(
            registry.rename(r.id(), "not valid"),
            Err(RegionError::InvalidRegionName(_))
        ));
        assert_eq!(registry.get(r.id()).unwrap().name(), "a");

        registry.rename(r.id(), "renamed").unwrap();
        assert_eq!(registry.get(r.id()).unwrap().name(), "renamed");
    }

    #[test]
    fn test_set_diagonal_through_registry() {
        let registry = RegionRegistry::new();
        let r = registry.add(region("a", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).unwrap();

        let updated = registry
            .set_max_diagonal(r.id(), &BlockLocation::new(w(), BlockPos::new(4, 4, 4)))
            .unwrap();
        assert_eq!(updated.max_diagonal().pos, BlockPos::new(4, 4, 4));
        assert!(registry
            .find_containing(&Location::new(w(), 3.0, 3.0, 3.0))
            .iter()
            .any(|x| x.id() == r.id()));
    }

    #[test]
    fn test_load_skips_broken_records() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRegionStore::new(dir.path());

        let good = region("good", (0.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        store
            .write(good.id(), &RegionRecord::from_region(&good))
            .unwrap();

        let mut no_world = RegionRecord::from_region(&region("nw", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0)));
        no_world.world = None;
        let broken_id = Uuid::new_v4();
        store.write(broken_id, &no_world).unwrap();

        let garbage_id = Uuid::new_v4();
        std::fs::write(dir.path().join(format!("{}.json", garbage_id)), "[1, 2").unwrap();

        let registry = RegionRegistry::new();
        let report = registry.load_from(&store, &AnyWorld);

        assert_eq!(report.loaded, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(broken_id).is_none());
        assert!(registry.get(good.id()).unwrap().is_similar(&good));
    }

    #[test]
    fn test_load_skips_out_of_range_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRegionStore::new(dir.path());

        let good = region("good", (0.0, 0.0, 0.0), (2.0, 2.0, 2.0));
        store
            .write(good.id(), &RegionRecord::from_region(&good))
            .unwrap();

        let mut far = RegionRecord::from_region(&region("far", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0)));
        if let Some(diagonals) = far.diagonals.as_mut() {
            for corner in [diagonals.first.as_mut(), diagonals.second.as_mut()].into_iter().flatten() {
                corner.x = Some(3e9);
            }
        }
        let far_id = Uuid::new_v4();
        store.write(far_id, &far).unwrap();

        let registry = RegionRegistry::new();
        let report = registry.load_from(&store, &AnyWorld);

        assert_eq!(report.loaded, 1);
        assert_eq!(report.failures.len(), 1);
        assert!(registry.get(far_id).is_none());
        assert!(registry.get(good.id()).is_some());
    }

    #[test]
    fn test_save_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonRegionStore::new(dir.path());
        let registry = RegionRegistry::new();
        let r = registry.add(region("a", (0.0, 0.0, 0.0), (1.0, 1.0, 1.0))).unwrap();

        assert!(registry.save(&store, r.id()).unwrap());
        assert!(!registry.save(&store, Uuid::new_v4()).unwrap());
        assert_eq!(store.list_ids().unwrap(), vec![r.id()]);

        assert!(registry.delete(&store, r.id()).unwrap().is_some());
        assert!(store.list_ids().unwrap().is_empty());
        assert!(registry.is_empty());
    }
}
