//! Filesystem-backed `ImageStore` adapter.
//!
//! Writes uploaded profile images into a local directory served statically
//! under `/uploads` and returns the public URL clients will fetch.

use std::path::PathBuf;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{ImageStore, ImageStoreError, ImageUpload};

/// Filesystem implementation of the [`ImageStore`] port.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    directory: PathBuf,
    public_base_url: String,
}

impl FsImageStore {
    /// Create a store writing into `directory` and serving from
    /// `public_base_url` (e.g. `http://localhost:8080`).
    #[must_use]
    pub fn new(directory: PathBuf, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_owned();
        Self {
            directory,
            public_base_url,
        }
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, upload: ImageUpload) -> Result<String, ImageStoreError> {
        let filename = format!("profile-{}.{}", Uuid::new_v4(), upload.extension);

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?;
        tokio::fs::write(self.directory.join(&filename), &upload.bytes)
            .await
            .map_err(|err| ImageStoreError::io(err.to_string()))?;

        Ok(format!("{}/uploads/{filename}", self.public_base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_the_bytes_and_returns_a_public_url() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = FsImageStore::new(dir.path().to_path_buf(), "http://localhost:8080/");

        let url = store
            .save(ImageUpload {
                extension: "png",
                bytes: vec![0x89, 0x50, 0x4e, 0x47],
            })
            .await
            .expect("save succeeds");

        assert!(url.starts_with("http://localhost:8080/uploads/profile-"));
        assert!(url.ends_with(".png"));

        let filename = url.rsplit('/').next().expect("filename in url");
        let stored = std::fs::read(dir.path().join(filename)).expect("file exists");
        assert_eq!(stored, vec![0x89, 0x50, 0x4e, 0x47]);
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_io_error() {
        let store = FsImageStore::new(
            PathBuf::from("/proc/definitely-not-writable"),
            "http://localhost:8080",
        );
        let error = store
            .save(ImageUpload {
                extension: "jpg",
                bytes: vec![1],
            })
            .await
            .expect_err("write must fail");
        assert!(matches!(error, ImageStoreError::Io { .. }));
    }
}
