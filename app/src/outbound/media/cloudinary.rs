//! Unsigned image uploads to a Cloudinary-style endpoint.
//!
//! The upload is a multipart form with `file`, `upload_preset`, `folder`,
//! and `resource_type=image`. The hosted address comes back in the JSON
//! response's `secure_url` member.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, error};

use crate::domain::ports::{ImageUpload, MediaUploadError, MediaUploader};

const RESOURCE_TYPE: &str = "image";

/// Uploads images with an unsigned preset.
pub struct CloudinaryUploader {
    client: Client,
    endpoint: Url,
    upload_preset: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl CloudinaryUploader {
    /// Build an uploader posting to `endpoint` with `upload_preset`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        upload_preset: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            upload_preset: upload_preset.into(),
        })
    }

    fn form(&self, image: &ImageUpload) -> Result<Form, MediaUploadError> {
        validate(image)?;
        let file = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|err| MediaUploadError::invalid_image(format!("bad content type: {err}")))?;
        Ok(Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", image.folder.clone())
            .text("resource_type", RESOURCE_TYPE))
    }
}

fn validate(image: &ImageUpload) -> Result<(), MediaUploadError> {
    if image.bytes.is_empty() {
        return Err(MediaUploadError::invalid_image("image is empty"));
    }
    if !image.content_type.starts_with("image/") {
        return Err(MediaUploadError::invalid_image(format!(
            "{} is not an image type",
            image.content_type
        )));
    }
    if image.file_name.trim().is_empty() {
        return Err(MediaUploadError::invalid_image("file name is required"));
    }
    Ok(())
}

fn upload_failed(err: impl std::fmt::Display) -> MediaUploadError {
    error!(error = %err, "image upload failed");
    MediaUploadError::upload_failed(err.to_string())
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload_image(&self, image: &ImageUpload) -> Result<String, MediaUploadError> {
        let form = self.form(image)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(upload_failed)?;

        let status = response.status();
        if !status.is_success() {
            return Err(upload_failed(format!("status {}", status.as_u16())));
        }
        let UploadResponse { secure_url } = response.json().await.map_err(upload_failed)?;
        debug!(file_name = %image.file_name, "image uploaded");
        Ok(secure_url)
    }
}
