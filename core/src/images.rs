// core/src/images.rs

//! Uploaded product images. Where the bytes end up is the [`ImageStore`]'s concern.

use crate::error::{CatalogResult, ValidationErrors};
use crate::identity::UserId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
  Png,
  Jpeg,
  Gif,
  Webp,
}

impl ImageKind {
  pub fn extension(self) -> &'static str {
    match self {
      ImageKind::Png => "png",
      ImageKind::Jpeg => "jpg",
      ImageKind::Gif => "gif",
      ImageKind::Webp => "webp",
    }
  }

  /// Identifies the format from the file signature; the declared content type is not trusted.
  pub fn sniff(bytes: &[u8]) -> Option<Self> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
      Some(ImageKind::Png)
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
      Some(ImageKind::Jpeg)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
      Some(ImageKind::Gif)
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
      Some(ImageKind::Webp)
    } else {
      None
    }
  }
}

#[derive(Clone)]
pub struct ImageUpload {
  pub filename: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ImageUpload")
      .field("filename", &self.filename)
      .field("content_type", &self.content_type)
      .field("len", &self.bytes.len())
      .finish()
  }
}

impl ImageUpload {
  pub fn validate(&self) -> Result<ImageKind, ValidationErrors> {
    if self.bytes.is_empty() {
      return Err(ValidationErrors::single("image", "the submitted file is empty"));
    }
    ImageKind::sniff(&self.bytes).ok_or_else(|| {
      ValidationErrors::single(
        "image",
        "upload a valid image; the file you uploaded was either not an image or a corrupted image",
      )
    })
  }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
  /// Persists an already-validated upload and returns its path relative to the media root.
  async fn save(&self, owner: UserId, upload: &ImageUpload, kind: ImageKind) -> CatalogResult<String>;
}

/// Keeps uploads in memory, keyed by the returned path.
#[derive(Debug, Default)]
pub struct MemoryImageStore {
  files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn read(&self, path: &str) -> Option<Vec<u8>> {
    self.files.lock().get(path).cloned()
  }

  pub fn len(&self) -> usize {
    self.files.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.lock().is_empty()
  }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
  async fn save(&self, owner: UserId, upload: &ImageUpload, kind: ImageKind) -> CatalogResult<String> {
    let mut files = self.files.lock();
    let path = format!("products/{}-{}.{}", owner, files.len() + 1, kind.extension());
    files.insert(path.clone(), upload.bytes.clone());
    Ok(path)
  }
}
