// Store configuration.
// Locates the database on disk and pins the schema version it is opened with.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Database name used by the application.
pub const DEFAULT_DB_NAME: &str = "sg";

/// Schema version written to the manifest on first open.
pub const DEFAULT_DB_VERSION: u32 = 1;

/// Where and how a [`FileKvStore`](crate::store::FileKvStore) keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory that contains the database directory.
    pub root: PathBuf,
    /// Database name; the database lives in `root/name`.
    pub name: String,
    /// Highest schema version this build understands.
    pub version: u32,
}

impl StoreConfig {
    /// Configuration rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            name: DEFAULT_DB_NAME.to_string(),
            version: DEFAULT_DB_VERSION,
        }
    }

    /// Configuration rooted at the platform cache directory (~/.cache/sgcache on Linux).
    pub fn from_default_location() -> Option<Self> {
        default_root().map(Self::new)
    }

    /// Use `root` when given, the platform cache directory otherwise.
    pub fn resolve(root: Option<PathBuf>) -> Option<Self> {
        match root {
            Some(root) => Some(Self::new(root)),
            None => Self::from_default_location(),
        }
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }
}

/// Get the base cache directory for the application.
pub fn default_root() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sgcache").map(|dirs| dirs.cache_dir().to_path_buf())
}
