/// Sound regions: the box model, its persisted record form, the region store
/// and the in-memory registry queried during dispatch.
pub mod movement;
pub mod record;
pub mod registry;
pub mod sound_region;
pub mod store;

pub use movement::{region_transitions, RegionTransitions};
pub use record::{parse_creation_date, AnyWorld, KnownWorlds, RegionRecord, WorldLookup};
pub use registry::{RegionRegistry, RegionSnapshot};
pub use sound_region::{validate_name, SoundRegion};
pub use store::{JsonRegionStore, RegionStore};
