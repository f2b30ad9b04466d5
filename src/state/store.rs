use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::fs;

use crate::error::{CanvasFlowError, Result};

/// 键值存储 trait
#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
}

/// 内存存储实现
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.inner.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().remove(key);
        Ok(())
    }
}

/// One JSON file per key inside a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

#[async_trait]
impl ContextStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CanvasFlowError::Storage(err.to_string())),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        atomic_write(&self.path_for(key), value.as_bytes())
            .await
            .map_err(|e| CanvasFlowError::Storage(e.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(CanvasFlowError::Storage(err.to_string())),
        }
    }
}

/// Write to a sibling temp file, then rename over the target.
async fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await
}

#[cfg(feature = "redis-store")]
pub mod redis {
    use super::*;
    use ::redis::AsyncCommands;

    /// One Redis string per key.
    pub struct RedisStore {
        client: ::redis::Client,
    }

    impl RedisStore {
        pub fn new(client: ::redis::Client) -> Self {
            Self { client }
        }

        pub fn open(url: &str) -> Result<Self> {
            ::redis::Client::open(url)
                .map(Self::new)
                .map_err(|e| CanvasFlowError::Config(format!("invalid redis url `{url}`: {e}")))
        }

        async fn connection(&self) -> Result<::redis::aio::MultiplexedConnection> {
            self.client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| CanvasFlowError::Storage(e.to_string()))
        }
    }

    #[async_trait]
    impl ContextStore for RedisStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            let mut conn = self.connection().await?;
            let value: Option<String> = conn
                .get(key)
                .await
                .map_err(|e| CanvasFlowError::Storage(e.to_string()))?;
            Ok(value)
        }

        async fn set(&self, key: &str, value: String) -> Result<()> {
            let mut conn = self.connection().await?;
            conn.set::<_, _, ()>(key, value)
                .await
                .map_err(|e| CanvasFlowError::Storage(e.to_string()))?;
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            let mut conn = self.connection().await?;
            conn.del::<_, ()>(key)
                .await
                .map_err(|e| CanvasFlowError::Storage(e.to_string()))?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::state::FlowStore;
        use std::sync::Arc;

        // nothing listens on port 1
        const UNREACHABLE: &str = "redis://127.0.0.1:1/";

        #[test]
        fn rejects_malformed_url() {
            assert!(matches!(
                RedisStore::open("not a url"),
                Err(CanvasFlowError::Config(_))
            ));
        }

        #[tokio::test]
        async fn unreachable_server_is_a_storage_error() {
            let store = RedisStore::open(UNREACHABLE).unwrap();
            assert!(matches!(store.get("flows").await, Err(CanvasFlowError::Storage(_))));
            assert!(matches!(
                store.set("flows", "[]".to_string()).await,
                Err(CanvasFlowError::Storage(_))
            ));
        }

        #[tokio::test]
        async fn flow_store_over_unreachable_server_starts_empty() {
            let backend = Arc::new(RedisStore::open(UNREACHABLE).unwrap());
            let store = FlowStore::open(backend, FlowStore::DEFAULT_KEY).await;
            assert!(store.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_round_trips_and_deletes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));

        assert_eq!(store.get("flows").await.unwrap(), None);
        store.set("flows", "[]".to_string()).await.unwrap();
        assert_eq!(store.get("flows").await.unwrap().as_deref(), Some("[]"));

        store.delete("flows").await.unwrap();
        store.delete("flows").await.unwrap();
        assert_eq!(store.get("flows").await.unwrap(), None);
    }

    #[test]
    fn keys_are_sanitized_into_file_names() {
        let store = FileStore::new("/tmp/x");
        assert_eq!(store.path_for("a/b c"), PathBuf::from("/tmp/x/a_b_c.json"));
    }
}
