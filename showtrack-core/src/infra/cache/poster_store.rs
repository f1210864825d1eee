use std::{
    fmt,
    path::{Path, PathBuf},
};

use cacache::Integrity;

use crate::error::CacheError;

/// Root directory managed by `cacache` (index + content-addressed blobs).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PosterCacheRoot(PathBuf);

impl PosterCacheRoot {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for PosterCacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PosterCacheRoot").field(&self.0).finish()
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PosterCacheKey(String);

impl PosterCacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PosterCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PosterCacheKey").field(&self.0).finish()
    }
}

impl fmt::Display for PosterCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Versioned key for a poster path at a given TMDB size bucket.
pub fn poster_cache_key_for(size: &str, poster_path: &str) -> PosterCacheKey {
    let mut key =
        String::with_capacity("posters/v1/".len() + size.len() + poster_path.len() + 1);
    key.push_str("posters/v1/");
    key.push_str(size);
    if !poster_path.starts_with('/') {
        key.push('/');
    }
    key.push_str(poster_path);
    PosterCacheKey(key)
}

#[derive(Debug, Clone)]
pub struct StoredPosterBlob {
    pub integrity: Integrity,
    pub byte_len: usize,
}

/// A thin typed wrapper over `cacache` for poster blobs.
#[derive(Clone, Debug)]
pub struct PosterBlobStore {
    root: PosterCacheRoot,
}

impl PosterBlobStore {
    pub fn new(root: PosterCacheRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &PosterCacheRoot {
        &self.root
    }

    /// `Ok(None)` on a cache miss.
    pub async fn read(
        &self,
        key: &PosterCacheKey,
    ) -> Result<Option<Vec<u8>>, CacheError> {
        match cacache::read(self.root.as_path(), key.as_str()).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(cacache::Error::EntryNotFound(_, _)) => Ok(None),
            Err(cacache::Error::IntegrityError(err)) => Err(CacheError::Corrupt(
                format!("{key} ({err})"),
            )),
            Err(cacache::Error::SizeMismatch(wanted, actual)) => {
                Err(CacheError::Corrupt(format!(
                    "size mismatch: key={key}, wanted={wanted}, actual={actual}"
                )))
            }
            Err(other) => Err(CacheError::Internal(format!(
                "cacache read failed: {other}"
            ))),
        }
    }

    pub async fn write(
        &self,
        key: &PosterCacheKey,
        bytes: &[u8],
    ) -> Result<StoredPosterBlob, CacheError> {
        let integrity = cacache::write(self.root.as_path(), key.as_str(), bytes)
            .await
            .map_err(|e| {
                CacheError::Internal(format!("cacache write failed: {e}"))
            })?;

        Ok(StoredPosterBlob {
            integrity,
            byte_len: bytes.len(),
        })
    }

    pub async fn remove(&self, key: &PosterCacheKey) -> Result<(), CacheError> {
        cacache::index::RemoveOpts::new()
            .remove_fully(true)
            .remove(self.root.as_path(), key.as_str())
            .await
            .map_err(|e| {
                CacheError::Internal(format!("cacache remove failed: {e}"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poster_cache_key_is_stable_and_versioned() {
        assert_eq!(
            poster_cache_key_for("w342", "/abc.jpg").as_str(),
            "posters/v1/w342/abc.jpg"
        );
        assert_eq!(
            poster_cache_key_for("w342", "abc.jpg").as_str(),
            "posters/v1/w342/abc.jpg"
        );
    }

    #[tokio::test]
    async fn write_then_read_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            PosterBlobStore::new(PosterCacheRoot::new(dir.path().to_path_buf()));
        let key = poster_cache_key_for("w92", "/p.png");

        assert!(store.read(&key).await.unwrap().is_none());
        let stored = store.write(&key, b"png-bytes").await.unwrap();
        assert_eq!(stored.byte_len, 9);
        assert_eq!(store.read(&key).await.unwrap().as_deref(), Some(&b"png-bytes"[..]));

        store.remove(&key).await.unwrap();
        assert!(store.read(&key).await.unwrap().is_none());
    }
}
