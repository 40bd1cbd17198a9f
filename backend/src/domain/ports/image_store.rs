//! Port for profile-image storage.

use async_trait::async_trait;

use super::macros::define_port_error;

define_port_error! {
    /// Errors raised by image store adapters.
    pub enum ImageStoreError {
        /// The image could not be written.
        Io { message: String } =>
            "image could not be stored: {message}",
    }
}

/// A validated image upload ready for storage.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    /// File extension derived from the validated content type.
    pub extension: &'static str,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
}

/// Port for persisting uploaded profile images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return its public URL.
    async fn save(&self, upload: ImageUpload) -> Result<String, ImageStoreError>;
}
