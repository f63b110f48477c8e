use thiserror::Error;

use crate::api::FormField;

/// Accepted image types for project images and avatars
const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Maximum upload size (5 MB)
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Local input problems caught before any request is sent
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Please upload a valid image (JPEG, PNG, or WebP)")]
    UnsupportedImageType(String),

    #[error("Image size must be 5MB or smaller")]
    ImageTooLarge(usize),
}

pub(crate) fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// An image file destined for a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    file_name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, mime: &str, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let mime = mime.trim().to_ascii_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
            return Err(ValidationError::UnsupportedImageType(mime));
        }
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(ValidationError::ImageTooLarge(bytes.len()));
        }
        Ok(Self {
            file_name: file_name.into(),
            mime,
            bytes,
        })
    }

    /// Infer the mime type from the file extension
    pub fn from_file_name(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let ext = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = match ext.as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "webp" => "image/webp",
            _ => return Err(ValidationError::UnsupportedImageType(ext)),
        };
        Self::new(file_name, mime, bytes)
    }

    pub(crate) fn into_field(self, name: &str) -> FormField {
        FormField::File {
            name: name.to_string(),
            file_name: self.file_name,
            mime: self.mime,
            bytes: self.bytes,
        }
    }
}
