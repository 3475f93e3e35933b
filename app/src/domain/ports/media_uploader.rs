//! Port for hosting user-supplied images.

use async_trait::async_trait;

use super::define_port_error;

/// Folder images land in when the caller does not choose one.
pub const DEFAULT_IMAGE_FOLDER: &str = "findMyJob/Images";

define_port_error! {
    /// Errors raised while uploading media.
    pub enum MediaUploadError {
        /// The image was empty or otherwise unusable.
        InvalidImage { message: String } => "invalid image: {message}",
        /// The upload did not complete.
        UploadFailed { message: String } => "image upload failed: {message}",
    }
}

/// Image bytes plus where to put them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, used for the multipart part.
    pub file_name: String,
    /// MIME type such as `image/jpeg`.
    pub content_type: String,
    /// Raw image bytes.
    pub bytes: Vec<u8>,
    /// Destination folder.
    pub folder: String,
}

impl ImageUpload {
    /// Upload into [`DEFAULT_IMAGE_FOLDER`].
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
            folder: DEFAULT_IMAGE_FOLDER.to_owned(),
        }
    }
}

/// Image hosting service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Upload `image` and return its public HTTPS URL.
    async fn upload_image(&self, image: &ImageUpload) -> Result<String, MediaUploadError>;
}
