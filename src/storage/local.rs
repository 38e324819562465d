use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use super::{ObjectStore, StorageError};

/// Stores blobs under a directory and serves them from `public_base_url`.
pub struct LocalObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalObjectStore {
    pub async fn new(
        root: impl AsRef<Path>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, StorageError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn resolve(&self, public_id: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(public_id);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::Rejected(format!(
                "invalid object id '{}'",
                public_id
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn upload(&self, data: Bytes, folder: &str) -> Result<String, StorageError> {
        let public_id = format!("{}/{}", folder.trim_matches('/'), Uuid::new_v4());
        let path = self.resolve(&public_id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, &data).await?;
        debug!(path = %path.display(), "Stored object on disk");
        Ok(format!("{}/{}", self.public_base_url, public_id))
    }

    async fn delete(&self, public_id: &str) -> Result<(), StorageError> {
        let path = self.resolve(public_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(public_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn public_id(&self, url: &str) -> Option<String> {
        url.strip_prefix(&self.public_base_url)
            .map(|rest| rest.trim_start_matches('/').to_string())
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_and_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://localhost:8080/uploads/")
            .await
            .unwrap();

        let url = store
            .upload(Bytes::from_static(b"image"), "vendorsCustomer/id_cards")
            .await
            .unwrap();
        assert!(url.starts_with("http://localhost:8080/uploads/vendorsCustomer/id_cards/"));

        let public_id = store.public_id(&url).unwrap();
        let on_disk = dir.path().join(&public_id);
        assert_eq!(std::fs::read(&on_disk).unwrap(), b"image");

        store.delete(&public_id).await.unwrap();
        assert!(!on_disk.exists());
        assert!(matches!(
            store.delete(&public_id).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalObjectStore::new(dir.path(), "http://host").await.unwrap();
        assert!(matches!(
            store.delete("../etc/passwd").await,
            Err(StorageError::Rejected(_))
        ));
    }
}
