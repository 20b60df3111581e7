use crate::stations::catalog::Catalog;
use crate::stations::error::CacheError;
use crate::utils::ensure_cache_dir_exists;
use async_trait::async_trait;
use bincode::config::{Configuration, Fixint, LittleEndian};
use log::debug;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const CACHE_FILE_NAME: &str = "zamg_catalog.bin";
const CACHE_FORMAT_VERSION: u32 = 1;
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// Storage for the station catalog that outlives a single client.
#[async_trait]
pub trait CatalogCache: Send + Sync {
    /// `Ok(None)` when nothing has been stored yet.
    async fn load(&self) -> Result<Option<Catalog>, CacheError>;

    async fn store(&self, catalog: &Catalog) -> Result<(), CacheError>;

    /// Removes an unusable entry so the next [`store`](CatalogCache::store) starts clean.
    async fn discard(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Keeps nothing; every client fetches the catalog once from the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl CatalogCache for NoCache {
    async fn load(&self) -> Result<Option<Catalog>, CacheError> {
        Ok(None)
    }

    async fn store(&self, _catalog: &Catalog) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEnvelope {
    version: u32,
    catalog: Catalog,
}

/// Stores the catalog as a bincode file in a directory.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE_NAME)
    }

    fn decode(path: &Path, bytes: &[u8]) -> Result<Catalog, CacheError> {
        let (envelope, _) =
            bincode::serde::decode_from_slice::<CacheEnvelope, _>(bytes, BINCODE_CONFIG)
                .map_err(|e| CacheError::CacheDecode(path.to_path_buf(), Box::new(e)))?;
        if envelope.version != CACHE_FORMAT_VERSION {
            return Err(CacheError::VersionMismatch {
                path: path.to_path_buf(),
                found: envelope.version,
                expected: CACHE_FORMAT_VERSION,
            });
        }
        Ok(envelope.catalog)
    }
}

#[async_trait]
impl CatalogCache for DiskCache {
    async fn load(&self) -> Result<Option<Catalog>, CacheError> {
        let path = self.path();
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::CacheRead(path, e)),
        };
        let catalog =
            tokio::task::spawn_blocking(move || Self::decode(&path, &bytes)).await??;
        debug!(
            "Loaded {} stations from {}",
            catalog.stations().len(),
            self.path().display()
        );
        Ok(Some(catalog))
    }

    async fn store(&self, catalog: &Catalog) -> Result<(), CacheError> {
        ensure_cache_dir_exists(&self.dir)
            .await
            .map_err(|e| CacheError::CacheDirCreation(self.dir.clone(), e))?;

        let envelope = CacheEnvelope {
            version: CACHE_FORMAT_VERSION,
            catalog: catalog.clone(),
        };
        let dir = self.dir.clone();
        let path = self.path();
        tokio::task::spawn_blocking(move || {
            let bytes = bincode::serde::encode_to_vec(&envelope, BINCODE_CONFIG)
                .map_err(|e| CacheError::CacheEncode(Box::new(e)))?;
            // Write next to the target and rename, so readers never see a partial file.
            let mut file = NamedTempFile::new_in(&dir)
                .map_err(|e| CacheError::CacheWrite(path.clone(), e))?;
            file.write_all(&bytes)
                .map_err(|e| CacheError::CacheWrite(path.clone(), e))?;
            file.persist(&path)
                .map_err(|e| CacheError::CacheWrite(path.clone(), e.error))?;
            Ok::<(), CacheError>(())
        })
        .await??;
        debug!("Wrote station catalog cache to {}", self.path().display());
        Ok(())
    }

    async fn discard(&self) -> Result<(), CacheError> {
        let path = self.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::CacheWrite(path, e)),
        }
    }
}
