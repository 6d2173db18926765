// app/src/services/image_storage.rs

use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;
use stockroom::{CatalogResult, ImageKind, ImageStore, ImageUpload, UserId};
use tracing::{info, instrument};
use uuid::Uuid;

const PRODUCT_IMAGE_DIR: &str = "products";

/// Writes product images under `<media_root>/products/` with generated names.
#[derive(Debug, Clone)]
pub struct LocalImageStore {
  root: PathBuf,
}

impl LocalImageStore {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }
}

#[async_trait]
impl ImageStore for LocalImageStore {
  #[instrument(name = "image_storage::save", skip(self, owner, upload), fields(len = upload.bytes.len()), err(Display))]
  async fn save(&self, owner: UserId, upload: &ImageUpload, kind: ImageKind) -> CatalogResult<String> {
    let dir = self.root.join(PRODUCT_IMAGE_DIR);
    tokio::fs::create_dir_all(&dir)
      .await
      .with_context(|| format!("creating image directory {}", dir.display()))?;

    // The client filename is never trusted for the stored name.
    let file_name = format!("{}.{}", Uuid::new_v4(), kind.extension());
    let target = dir.join(&file_name);
    tokio::fs::write(&target, &upload.bytes)
      .await
      .with_context(|| format!("writing image {}", target.display()))?;

    let relative = format!("{}/{}", PRODUCT_IMAGE_DIR, file_name);
    info!(owner = %owner, path = %relative, original = %upload.filename, "Stored product image.");
    Ok(relative)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

  #[tokio::test]
  async fn saves_under_products_dir_with_sniffed_extension() {
    let root = std::env::temp_dir().join(format!("stockroom-media-{}", Uuid::new_v4()));
    let store = LocalImageStore::new(&root);
    let upload = ImageUpload {
      filename: "../../etc/passwd.png".to_string(),
      content_type: Some("image/png".to_string()),
      bytes: PNG_BYTES.to_vec(),
    };

    let path = store.save(UserId(3), &upload, ImageKind::Png).await.unwrap();
    assert!(path.starts_with("products/"));
    assert!(path.ends_with(".png"));
    assert_eq!(tokio::fs::read(root.join(&path)).await.unwrap(), PNG_BYTES);

    let _ = tokio::fs::remove_dir_all(&root).await;
  }
}
