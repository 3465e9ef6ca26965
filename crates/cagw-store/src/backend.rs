// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Key/value storage backends.
//!
//! Keys are `/`-separated paths such as `config/web` or `issue/web/123456`.
//! Values are opaque byte blobs. [`StorageBackend::list`] returns the
//! immediate children of a prefix; children that have further descendants are
//! reported with a trailing `/`.
//!
//! # Example
//!
//! ```rust,ignore
//! use cagw_store::{MemoryStorage, StorageBackend};
//!
//! let storage = MemoryStorage::new();
//! storage.put("config/web", b"{}".to_vec()).await?;
//! assert_eq!(storage.list("config/").await?, vec!["web"]);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace};

use cagw_core::error::StorageError;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// File extension for value files written by [`FileSystemStorage`].
pub const ENTRY_EXTENSION: &str = "entry";

// =============================================================================
// StorageBackend Trait
// =============================================================================

/// Byte-blob storage keyed by path.
///
/// Implementations must be atomic per key for `get` and `put`.
#[async_trait]
pub trait StorageBackend: Send + Sync + Debug {
    /// Returns the value stored under `key`, if any.
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()>;

    /// Removes the value under `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Lists the immediate children of `prefix`, sorted.
    ///
    /// `prefix` is empty or ends with `/`.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Returns the backend name for logging.
    fn name(&self) -> &'static str;
}

/// Checks a key for empty segments, traversal and absolute paths.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::invalid_key(key, "key is empty"));
    }
    if key.starts_with('/') {
        return Err(StorageError::invalid_key(key, "key must be relative"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(StorageError::invalid_key(key, "key has an empty segment")),
            "." | ".." => {
                return Err(StorageError::invalid_key(key, "key must not traverse directories"));
            }
            _ if segment.contains('\\') => {
                return Err(StorageError::invalid_key(key, "key must not contain '\\'"));
            }
            _ => {}
        }
    }
    Ok(())
}

fn validate_prefix(prefix: &str) -> StorageResult<()> {
    if prefix.is_empty() {
        return Ok(());
    }
    if !prefix.ends_with('/') {
        return Err(StorageError::invalid_key(prefix, "list prefix must end with '/'"));
    }
    validate_key(prefix.trim_end_matches('/'))
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// Process-local storage. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl StorageBackend for MemoryStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().insert(key.to_string(), value);
        trace!(key, "Stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.write().remove(key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        validate_prefix(prefix)?;
        let entries = self.entries.read();

        let children: BTreeSet<String> = entries
            .range(prefix.to_string()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .map(|key| {
                let rest = &key[prefix.len()..];
                match rest.split_once('/') {
                    Some((dir, _)) => format!("{}/", dir),
                    None => rest.to_string(),
                }
            })
            .collect();

        Ok(children.into_iter().collect())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

// =============================================================================
// FileSystemStorage
// =============================================================================

/// Storage under a root directory, one file per key.
///
/// The key `config/web` is stored as `<root>/config/web.entry`, leaving
/// `<root>/config/web/` free for descendants such as profile records.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    root: PathBuf,
}

impl FileSystemStorage {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the root directory if it does not exist.
    pub async fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let storage = Self::new(root);
        tokio::fs::create_dir_all(&storage.root)
            .await
            .map_err(|e| StorageError::io(storage.root.display().to_string(), e))?;
        debug!(root = %storage.root.display(), "Opened filesystem storage");
        Ok(storage)
    }

    /// Returns the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        let mut path = self.root.clone();
        path.extend(key.split('/'));
        let mut file_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        file_name.push(".");
        file_name.push(ENTRY_EXTENSION);
        path.set_file_name(file_name);
        Ok(path)
    }

    fn dir_path(&self, prefix: &str) -> StorageResult<PathBuf> {
        validate_prefix(prefix)?;
        let mut path = self.root.clone();
        path.extend(prefix.split('/').filter(|s| !s.is_empty()));
        Ok(path)
    }
}

#[async_trait]
impl StorageBackend for FileSystemStorage {
    async fn get(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let path = self.entry_path(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::io(key, e))?;
        }

        // Write-then-rename keeps readers from observing a partial value.
        let tmp = path.with_extension(format!("{}.tmp", ENTRY_EXTENSION));
        tokio::fs::write(&tmp, &value)
            .await
            .map_err(|e| StorageError::io(key, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::io(key, e))?;

        trace!(key, bytes = value.len(), "Stored entry");
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::io(key, e)),
        }
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let dir = self.dir_path(prefix)?;
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(prefix, e)),
        };

        let suffix = format!(".{}", ENTRY_EXTENSION);
        let mut children = BTreeSet::new();
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| StorageError::io(prefix, e))?
        {
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| StorageError::io(prefix, e))?;

            if file_type.is_dir() {
                children.insert(format!("{}/", name));
            } else if let Some(stem) = name.strip_suffix(&suffix) {
                children.insert(stem.to_string());
            }
        }

        Ok(children.into_iter().collect())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    async fn exercise(storage: &dyn StorageBackend) {
        assert_eq!(storage.get("config/web").await.unwrap(), None);

        storage.put("config/web", b"role".to_vec()).await.unwrap();
        storage
            .put("config/web/profiles/p1", b"profile".to_vec())
            .await
            .unwrap();
        storage.put("config/api", b"role2".to_vec()).await.unwrap();

        assert_eq!(storage.get("config/web").await.unwrap(), Some(b"role".to_vec()));
        assert_eq!(
            storage.list("config/").await.unwrap(),
            vec!["api".to_string(), "web".to_string(), "web/".to_string()]
        );
        assert_eq!(
            storage.list("config/web/profiles/").await.unwrap(),
            vec!["p1".to_string()]
        );
        assert!(storage.list("issue/").await.unwrap().is_empty());

        storage.delete("config/web").await.unwrap();
        storage.delete("config/web").await.unwrap();
        assert_eq!(storage.get("config/web").await.unwrap(), None);
        assert_eq!(
            storage.get("config/web/profiles/p1").await.unwrap(),
            Some(b"profile".to_vec())
        );
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let storage = MemoryStorage::new();
        exercise(&storage).await;
        assert_eq!(storage.len(), 2);
    }

    #[tokio::test]
    async fn test_filesystem_storage() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::open(dir.path().join("data")).await.unwrap();
        exercise(&storage).await;
        assert!(dir.path().join("data/config/api.entry").exists());
    }

    #[tokio::test]
    async fn test_overwrite_replaces_value() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        storage.put("config/web", b"one".to_vec()).await.unwrap();
        storage.put("config/web", b"two".to_vec()).await.unwrap();
        assert_eq!(storage.get("config/web").await.unwrap(), Some(b"two".to_vec()));
        assert_eq!(storage.list("config/").await.unwrap(), vec!["web".to_string()]);
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("issue/web/123").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("config/../secret").is_err());
        assert!(validate_key("config//web").is_err());
        assert!(validate_key("config\\web").is_err());
    }

    #[tokio::test]
    async fn test_list_requires_trailing_slash() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            storage.list("config").await,
            Err(StorageError::InvalidKey { .. })
        ));
        assert!(storage.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filesystem_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSystemStorage::new(dir.path());
        assert!(storage.put("../escape", Vec::new()).await.is_err());
        assert!(storage.get("a/./b").await.is_err());
    }
}
