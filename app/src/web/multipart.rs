// app/src/web/multipart.rs

//! Buffers a `multipart/form-data` body into text fields and files.

use crate::errors::Result as AppResult;
use actix_multipart::Multipart;
use futures_util::StreamExt;
use std::collections::HashMap;
use stockroom::{CatalogError, ImageUpload, ProductInput};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub filename: String,
  pub content_type: Option<String>,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  /// Browsers submit an empty, unnamed part when no file was chosen.
  pub fn is_absent(&self) -> bool {
    self.filename.is_empty() && self.bytes.is_empty()
  }
}

#[derive(Debug, Default)]
pub struct FormData {
  pub fields: HashMap<String, String>,
  pub files: HashMap<String, UploadedFile>,
}

impl FormData {
  pub fn text(&self, name: &str) -> String {
    self.fields.get(name).cloned().unwrap_or_default()
  }

  /// Checkbox-style flag: any non-empty value except `false` or `0` (case-insensitive) is set.
  pub fn flag(&self, name: &str) -> bool {
    self
      .fields
      .get(name)
      .map(|v| {
        let v = v.trim().to_ascii_lowercase();
        !v.is_empty() && v != "false" && v != "0"
      })
      .unwrap_or(false)
  }

  pub fn file(&self, name: &str) -> Option<&UploadedFile> {
    self.files.get(name).filter(|f| !f.is_absent())
  }

  pub fn product_input(&self) -> ProductInput {
    ProductInput {
      name: self.text("name"),
      category: self.text("category"),
      price: self.text("price"),
      stock: self.text("stock"),
      description: self.text("description"),
      image_url: self.text("image_url"),
    }
  }

  pub fn image(&self) -> Option<ImageUpload> {
    self.file("image").map(|f| ImageUpload {
      filename: f.filename.clone(),
      content_type: f.content_type.clone(),
      bytes: f.bytes.clone(),
    })
  }
}

/// Reads every part, failing once the parts together exceed `max_bytes`.
pub async fn collect(mut payload: Multipart, max_bytes: usize) -> AppResult<FormData> {
  let mut form = FormData::default();
  let mut received = 0usize;

  while let Some(item) = payload.next().await {
    let mut field = item?;
    let name = field.name().map(str::to_string);
    let filename = field
      .content_disposition()
      .and_then(|cd| cd.get_filename())
      .map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.to_string());

    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
      let chunk = chunk?;
      received += chunk.len();
      if received > max_bytes {
        return Err(CatalogError::UnreadableUpload(format!("upload exceeds {} bytes", max_bytes)).into());
      }
      bytes.extend_from_slice(&chunk);
    }

    let Some(name) = name else {
      continue;
    };
    match filename {
      Some(filename) => {
        form.files.insert(
          name,
          UploadedFile {
            filename,
            content_type,
            bytes,
          },
        );
      }
      None => {
        form.fields.insert(name, String::from_utf8_lossy(&bytes).into_owned());
      }
    }
  }

  debug!(
    fields = form.fields.len(),
    files = form.files.len(),
    bytes = received,
    "Multipart body collected."
  );
  Ok(form)
}
