//! Hosted media uploads.

mod cloudinary;

pub use cloudinary::CloudinaryUploader;
