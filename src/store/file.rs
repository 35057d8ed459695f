// Filesystem-backed record store.
// One JSON file per record, written atomically via temp file and rename.

use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::fs;
use tracing::{debug, trace, warn};

use super::paths::{self, COLLECTION};
use super::{KvStore, Record, StampClock};
use crate::config::StoreConfig;
use crate::error::{Result, SgError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Database manifest, written on first open.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    name: String,
    version: u32,
    stores: Vec<String>,
}

/// Durable store rooted at a [`StoreConfig`].
///
/// No connection is held between calls: every operation opens the database,
/// provisioning it if needed, and releases it before returning.
#[derive(Debug)]
pub struct FileKvStore {
    config: StoreConfig,
    clock: StampClock,
    connections: Arc<AtomicUsize>,
}

impl FileKvStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            clock: StampClock::default(),
            connections: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of connections currently open against the database.
    pub fn open_connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Delete the whole database directory. Missing databases are ignored.
    pub async fn destroy(&self) -> Result<()> {
        let dir = paths::database_dir(&self.config);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => {
                debug!(path = %dir.display(), "database destroyed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Open the database, creating or upgrading it on the way.
    async fn open(&self) -> Result<Connection> {
        let conn = Connection::acquire(&self.connections, paths::collection_dir(&self.config));

        fs::create_dir_all(&conn.collection)
            .await
            .map_err(|e| SgError::init(&conn.collection, e))?;

        let manifest_path = paths::manifest_path(&self.config);
        let existing = match fs::read_to_string(&manifest_path).await {
            Ok(contents) => Some(
                serde_json::from_str::<Manifest>(&contents)
                    .map_err(|e| SgError::init(&manifest_path, e))?,
            ),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(SgError::init(&manifest_path, e)),
        };

        let needs_write = match &existing {
            Some(manifest) if manifest.version > self.config.version => {
                return Err(SgError::init(
                    &manifest_path,
                    format!(
                        "database version {} is newer than supported version {}",
                        manifest.version, self.config.version
                    ),
                ));
            }
            Some(manifest) => {
                manifest.version < self.config.version
                    || !manifest.stores.iter().any(|s| s == COLLECTION)
            }
            None => true,
        };

        if needs_write {
            let manifest = Manifest {
                name: self.config.name.clone(),
                version: self.config.version,
                stores: vec![COLLECTION.to_string()],
            };
            let json = serde_json::to_vec_pretty(&manifest)?;
            write_atomic(&manifest_path, &json)
                .await
                .map_err(|e| SgError::init(&manifest_path, e))?;
            debug!(
                path = %manifest_path.display(),
                from = existing.map(|m| m.version),
                to = self.config.version,
                "database provisioned"
            );
        }

        trace!(open = self.open_connections(), "connection ready");
        Ok(conn)
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    async fn put(&self, key: &str, value: Value) -> Result<()> {
        let conn = self.open().await?;
        let path = conn.record_path(key);

        // A corrupted previous record is simply replaced.
        let previous = match read_record(&path, key).await {
            Ok(previous) => previous,
            Err(SgError::Corrupted { .. }) => None,
            Err(e) => return Err(e),
        };
        let record = Record {
            key: key.to_string(),
            value,
            updated_at: self
                .clock
                .next_after(previous.map(|record| record.updated_at)),
        };

        let json = serde_json::to_vec(&record)?;
        write_atomic(&path, &json).await?;
        debug!(key, updated_at = record.updated_at, "record written");
        Ok(())
    }

    async fn get_record(&self, key: &str) -> Result<Option<Record>> {
        let conn = self.open().await?;
        let record = read_record(&conn.record_path(key), key).await?;
        trace!(key, hit = record.is_some(), "record read");
        Ok(record)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let conn = self.open().await?;
        let mut entries = fs::read_dir(&conn.collection).await?;
        let mut stamped = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let file_name = entry.file_name();
            if !file_name.to_str().is_some_and(paths::is_record_file_name) {
                continue;
            }
            let path = entry.path();
            let record = match fs::read(&path).await {
                Ok(contents) => serde_json::from_slice::<Record>(&contents),
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            match record {
                Ok(record) => stamped.push((record.updated_at, record.key)),
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable record"),
            }
        }

        stamped.sort();
        Ok(stamped.into_iter().map(|(_, key)| key).collect())
    }
}

/// An open database handle. Released when dropped, including when the
/// owning future is abandoned mid-operation.
struct Connection {
    collection: PathBuf,
    gauge: Arc<AtomicUsize>,
}

impl Connection {
    fn acquire(gauge: &Arc<AtomicUsize>, collection: PathBuf) -> Self {
        gauge.fetch_add(1, Ordering::SeqCst);
        Self {
            collection,
            gauge: Arc::clone(gauge),
        }
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.collection.join(paths::record_file_name(key))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.gauge.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Read and parse the record for `key`. Returns None if the file does not
/// exist or holds a different key.
async fn read_record(path: &Path, key: &str) -> Result<Option<Record>> {
    let contents = match fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let record: Record =
        serde_json::from_slice(&contents).map_err(|source| SgError::Corrupted {
            key: key.to_string(),
            source,
        })?;
    if record.key != key {
        warn!(key, stored = %record.key, "record file holds another key");
        return Ok(None);
    }
    Ok(Some(record))
}

/// Write a file atomically via a uniquely named temp file in the same directory.
///
/// Runs on the blocking pool as one unit, so a caller that stops waiting
/// still gets either the old file or the new one and no stray temp file.
async fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let path = path.to_path_buf();
    let bytes = bytes.to_vec();

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let mut temp = PendingFile::beside(&path);

        let mut file = std::fs::File::create(&temp.path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp.path, &path)?;
        temp.committed = true;
        Ok(())
    })
    .await
    .map_err(io::Error::other)?
}

/// Temp file that removes itself unless it was renamed into place.
struct PendingFile {
    path: PathBuf,
    committed: bool,
}

impl PendingFile {
    fn beside(target: &Path) -> Self {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = target
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(format!(".{}.{}.tmp", std::process::id(), n));
        Self {
            path: target.with_file_name(name),
            committed: false,
        }
    }
}

impl Drop for PendingFile {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}
