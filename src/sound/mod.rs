/// Sound configuration: descriptors, criteria, per-trigger bundles and the
/// snapshot loader.
pub mod category;
pub mod criteria;
pub mod descriptor;
pub mod loader;
pub mod rich_sound;

pub use category::SoundCategory;
pub use criteria::Criterion;
pub use descriptor::{SoundDescriptor, SoundId, SoundOptions, DEFAULT_PITCH, DEFAULT_VOLUME};
pub use loader::SoundSnapshot;
pub use rich_sound::{RichSound, RichSoundEntry, SoundGroup};
