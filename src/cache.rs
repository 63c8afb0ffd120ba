//! Persistent storage for resolved build-tool classpaths.
//!
//! Uses LMDB (via heed). Resolvers see it only through the `Storage` trait and
//! receive it as `Option<Arc<dyn Storage>>`; `None` means no caching.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions, RoTxn};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::classpath::{ClassPath, ClassPathEntry};
use crate::error::ResolveResult;

pub const CLASSPATHS_DB: &str = "classpaths";

const DEFAULT_MAP_SIZE: usize = 256 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

type StrDb = Database<Str, Str>;

/// Key-value persistence shared by the build-tool resolvers.
pub trait Storage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn store(&self, key: &str, value: &str) -> Result<()>;
}

pub type StorageHandle = Option<Arc<dyn Storage>>;

#[derive(Debug)]
pub struct PersistentCache {
    env: Arc<Env>,
    db_path: PathBuf,
    classpaths: StrDb,
}

impl PersistentCache {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create cache directory: {}", parent.display())
            })?;
        }

        let env = Arc::new(open_env(&db_path)?);

        let mut wtxn = env.write_txn()?;
        let classpaths = env.create_database::<Str, Str>(&mut wtxn, Some(CLASSPATHS_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_path,
            classpaths,
        })
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let rtxn = self.env.read_txn()?;
        Ok(CacheStats {
            db_path: self.db_path.to_string_lossy().to_string(),
            classpath_entries: table_len(&self.classpaths, &rtxn)?,
        })
    }
}

impl Storage for PersistentCache {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let rtxn = self.env.read_txn()?;
        Ok(self.classpaths.get(&rtxn, key)?.map(|v| v.to_string()))
    }

    fn store(&self, key: &str, value: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.classpaths.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

pub fn clear_db(db_path: &Path) -> Result<()> {
    remove_file_if_exists(db_path, "db")?;
    remove_file_if_exists(&lmdb_lock_path(db_path), "db lock")?;
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedClasspath {
    fingerprint: String,
    entries: Vec<ClassPathEntry>,
}

pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    hex::encode(hasher.finalize())
}

/// Fingerprint of a build descriptor: hash of its contents.
pub fn descriptor_fingerprint(path: &Path) -> Option<String> {
    std::fs::read(path).ok().map(|bytes| hash_content(&bytes))
}

/// Returns the stored classpath for `key` when its fingerprint still matches,
/// otherwise runs `resolve` and stores the result.
///
/// Storage failures are logged and never fail the resolution.
pub fn cached_classpath(
    storage: &StorageHandle,
    key: &str,
    fingerprint: Option<&str>,
    resolve: impl FnOnce() -> ResolveResult<ClassPath>,
) -> ResolveResult<ClassPath> {
    let (Some(storage), Some(fingerprint)) = (storage, fingerprint) else {
        return resolve();
    };

    match storage.load(key) {
        Ok(Some(raw)) => match serde_json::from_str::<CachedClasspath>(&raw) {
            Ok(cached) if cached.fingerprint == fingerprint => {
                debug!(key, entries = cached.entries.len(), "Using cached classpath");
                return Ok(cached.entries.into_iter().collect());
            }
            Ok(_) => debug!(key, "Cached classpath is stale"),
            Err(err) => warn!(key, error = %err, "Ignoring unreadable cache entry"),
        },
        Ok(None) => {}
        Err(err) => warn!(key, error = %err, "Failed to read classpath cache"),
    }

    let classpath = resolve()?;
    let row = CachedClasspath {
        fingerprint: fingerprint.to_string(),
        entries: classpath.iter().cloned().collect(),
    };
    let stored = serde_json::to_string(&row)
        .map_err(anyhow::Error::from)
        .and_then(|json| storage.store(key, &json));
    if let Err(err) = stored {
        warn!(key, error = %err, "Failed to write classpath cache");
    }
    Ok(classpath)
}

fn open_env(db_path: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: We do not use NO_LOCK and keep default LMDB locking guarantees.
    // NO_SUB_DIR keeps the single-file layout addressed by --db.
    unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options
            .open(db_path)
            .with_context(|| format!("Failed to create/open db env: {}", db_path.display()))
    }
}

fn table_len(db: &StrDb, rtxn: &RoTxn<'_>) -> Result<u64> {
    let mut count = 0u64;
    for item in db.iter(rtxn)? {
        let _ = item?;
        count += 1;
    }
    Ok(count)
}

fn lmdb_lock_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_os_string();
    os.push("-lock");
    PathBuf::from(os)
}

fn remove_file_if_exists(path: &Path, kind: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {kind} file: {}", path.display()))?;
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CacheStats {
    pub db_path: String,
    pub classpath_entries: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveError;
    use std::cell::Cell;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_db_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "workspace_classpath_test_{}_{}_{}.lmdb",
            std::process::id(),
            nanos,
            name
        ))
    }

    fn sample() -> ClassPath {
        [ClassPathEntry::new("/repo/a.jar")].into_iter().collect()
    }

    #[test]
    fn cached_classpath_reuses_matching_fingerprint() -> Result<()> {
        let db_path = temp_db_path("reuse");
        let storage: StorageHandle = Some(Arc::new(PersistentCache::open(db_path.clone())?));
        let calls = Cell::new(0);

        for _ in 0..2 {
            let cp = cached_classpath(&storage, "maven::/ws/pom.xml", Some("abc"), || {
                calls.set(calls.get() + 1);
                Ok(sample())
            })?;
            assert_eq!(cp, sample());
        }
        assert_eq!(calls.get(), 1);

        cached_classpath(&storage, "maven::/ws/pom.xml", Some("changed"), || {
            calls.set(calls.get() + 1);
            Ok(sample())
        })?;
        assert_eq!(calls.get(), 2);

        drop(storage);
        clear_db(&db_path)?;
        Ok(())
    }

    #[test]
    fn absent_storage_always_resolves() -> Result<()> {
        let calls = Cell::new(0);
        for _ in 0..2 {
            cached_classpath(&None, "k", Some("f"), || {
                calls.set(calls.get() + 1);
                Ok(sample())
            })?;
        }
        assert_eq!(calls.get(), 2);
        Ok(())
    }

    #[test]
    fn failures_are_not_cached() -> Result<()> {
        let db_path = temp_db_path("failure");
        let cache = Arc::new(PersistentCache::open(db_path.clone())?);
        let storage: StorageHandle = Some(cache.clone());

        let result = cached_classpath(&storage, "gradle::/ws/build.gradle", Some("f"), || {
            Err(ResolveError::StdlibNotFound { searched: 0 })
        });
        assert!(result.is_err());
        assert_eq!(cache.stats()?.classpath_entries, 0);

        drop(storage);
        drop(cache);
        clear_db(&db_path)?;
        Ok(())
    }
}
