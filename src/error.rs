use thiserror::Error;
use uuid::Uuid;

/// Domain errors for regions, sound configuration and persistence.
///
/// None of these ever escape dispatch: load-time failures are collected into a
/// [`LoadReport`], dispatch-time problems are logged as [`DispatchWarning`]s.

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegionError {
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Invalid region data for {id}: {reason}")]
    InvalidRegionData { id: String, reason: String },

    #[error("Invalid region name {0:?}: only letters, digits and underscores are allowed")]
    InvalidRegionName(String),

    #[error("Region not found: {0}")]
    NotFound(Uuid),

    #[error("Region already registered: {0}")]
    Duplicate(Uuid),
}

impl RegionError {
    pub(crate) fn invalid_data(id: impl ToString, reason: impl Into<String>) -> Self {
        RegionError::InvalidRegionData {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SoundConfigError {
    #[error("Invalid sound configuration at '{section}': {reason}")]
    InvalidSoundConfig { section: String, reason: String },
}

impl SoundConfigError {
    pub(crate) fn invalid(section: impl Into<String>, reason: impl Into<String>) -> Self {
        SoundConfigError::InvalidSoundConfig {
            section: section.into(),
            reason: reason.into(),
        }
    }
}

/// Non-fatal problems found while dispatching a single sound.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchWarning {
    #[error("Sound {sound} is not available on this engine version")]
    UnavailableSound { sound: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O failure on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse record {path}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize record {id}")]
    Serialize {
        id: Uuid,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One failed item of a load or reload pass.
#[derive(Debug)]
pub enum LoadFailure {
    Region(RegionError),
    Store(StoreError),
    Sound(SoundConfigError),
    Config(ConfigError),
}

impl std::fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadFailure::Region(e) => write!(f, "{}", e),
            LoadFailure::Store(e) => write!(f, "{}", e),
            LoadFailure::Sound(e) => write!(f, "{}", e),
            LoadFailure::Config(e) => write!(f, "{}", e),
        }
    }
}

impl From<RegionError> for LoadFailure {
    fn from(e: RegionError) -> Self {
        LoadFailure::Region(e)
    }
}

impl From<StoreError> for LoadFailure {
    fn from(e: StoreError) -> Self {
        LoadFailure::Store(e)
    }
}

impl From<SoundConfigError> for LoadFailure {
    fn from(e: SoundConfigError) -> Self {
        LoadFailure::Sound(e)
    }
}

impl From<ConfigError> for LoadFailure {
    fn from(e: ConfigError) -> Self {
        LoadFailure::Config(e)
    }
}

/// Errors collected during a load pass, reported together at the end.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, failure: impl Into<LoadFailure>) {
        self.failures.push(failure.into());
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn merge(&mut self, other: LoadReport) {
        self.loaded += other.loaded;
        self.failures.extend(other.failures);
    }

    /// Log every collected failure once.
    pub fn log(&self, what: &str) {
        if self.failures.is_empty() {
            tracing::info!("Loaded {} {} without errors", self.loaded, what);
            return;
        }

        tracing::error!(
            "Loaded {} {} with {} error(s):",
            self.loaded,
            what,
            self.failures.len()
        );
        for failure in &self.failures {
            tracing::error!("  {}", failure);
        }
    }
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;
