// core/src/catalog.rs

//! Ownership-scoped product operations.
//!
//! Every operation takes the caller's [`Identity`] explicitly. Products of
//! other users are reported as `NotFound`, exactly like ids that never existed.

use crate::error::{CatalogError, CatalogResult, ValidationErrors};
use crate::identity::{Identity, UserId};
use crate::images::{ImageStore, ImageUpload};
use crate::model::{validate_product, ImageChange, Product, ProductFields, ProductId, ProductInput};
use crate::page::{Page, PageWindow};
use crate::query::{ListQuery, ProductQuery};
use crate::store::ProductStore;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct CatalogService {
  store: Arc<dyn ProductStore>,
  images: Arc<dyn ImageStore>,
}

impl CatalogService {
  pub fn new(store: Arc<dyn ProductStore>, images: Arc<dyn ImageStore>) -> Self {
    Self { store, images }
  }

  /// Filters, sorts and paginates the caller's products. Never fails on odd parameters.
  #[instrument(
    name = "catalog::list",
    skip(self, identity, query),
    fields(q = %query.q, sort = %query.sort, per_page = query.per_page),
    err(Display)
  )]
  pub async fn list(&self, identity: &Identity, query: &ListQuery) -> CatalogResult<Page<Product>> {
    let owner = identity.require_user()?;
    let search = query.search().map(str::to_string);

    let total = self.store.count(owner, search.as_deref()).await?;
    let window = PageWindow::locate(total, query.per_page, query.page);
    let items = self
      .store
      .fetch(&ProductQuery {
        owner,
        search,
        sort: query.sort,
        offset: window.offset(),
        limit: Some(window.limit()),
      })
      .await?;

    debug!(
      total,
      page = window.number,
      pages = window.total_pages,
      "Listed {} products.",
      items.len()
    );
    Ok(Page::new(items, window))
  }

  #[instrument(name = "catalog::get", skip(self, identity), err(Display))]
  pub async fn get(&self, identity: &Identity, id: ProductId) -> CatalogResult<Product> {
    let owner = identity.require_user()?;
    self.owned(owner, id).await
  }

  #[instrument(name = "catalog::create", skip(self, identity, input, image), err(Display))]
  pub async fn create(
    &self,
    identity: &Identity,
    input: &ProductInput,
    image: Option<&ImageUpload>,
  ) -> CatalogResult<Product> {
    let owner = identity.require_user()?;
    let (fields, image_path) = self.prepare(owner, input, image).await?;
    let product = self.store.insert(owner, &fields, image_path).await?;
    info!(product_id = product.id, owner = %owner, "Product \"{}\" created.", product.name);
    Ok(product)
  }

  /// Re-validates every field. Without a new upload the stored image is kept.
  #[instrument(name = "catalog::update", skip(self, identity, input, image), err(Display))]
  pub async fn update(
    &self,
    identity: &Identity,
    id: ProductId,
    input: &ProductInput,
    image: Option<&ImageUpload>,
  ) -> CatalogResult<Product> {
    let owner = identity.require_user()?;
    self.owned(owner, id).await?;

    let (fields, image_path) = self.prepare(owner, input, image).await?;
    let change = match image_path {
      Some(path) => ImageChange::Replace(path),
      None => ImageChange::Keep,
    };
    let product = self
      .store
      .update(owner, id, &fields, change)
      .await?
      .ok_or(CatalogError::NotFound { id })?;
    info!(product_id = id, owner = %owner, "Product \"{}\" updated.", product.name);
    Ok(product)
  }

  /// Permanently removes the product and returns what was deleted.
  #[instrument(name = "catalog::delete", skip(self, identity), err(Display))]
  pub async fn delete(&self, identity: &Identity, id: ProductId) -> CatalogResult<Product> {
    let owner = identity.require_user()?;
    let product = self.store.delete(owner, id).await?.ok_or_else(|| {
      warn!(product_id = id, owner = %owner, "Delete of unknown or foreign product.");
      CatalogError::NotFound { id }
    })?;
    info!(product_id = id, owner = %owner, "Product \"{}\" deleted.", product.name);
    Ok(product)
  }

  async fn owned(&self, owner: UserId, id: ProductId) -> CatalogResult<Product> {
    self.store.get(owner, id).await?.ok_or_else(|| {
      debug!(product_id = id, owner = %owner, "Product not visible to caller.");
      CatalogError::NotFound { id }
    })
  }

  // Field and image errors are reported together; nothing is stored unless both pass.
  async fn prepare(
    &self,
    owner: UserId,
    input: &ProductInput,
    image: Option<&ImageUpload>,
  ) -> CatalogResult<(ProductFields, Option<String>)> {
    let mut errors = ValidationErrors::new();
    let fields = validate_product(input).map_err(|e| errors.extend(e)).ok();
    let kind = image.and_then(|upload| upload.validate().map_err(|e| errors.extend(e)).ok());

    let fields = match fields {
      Some(fields) if errors.is_empty() => fields,
      _ => return Err(CatalogError::Validation(errors)),
    };

    let image_path = match (image, kind) {
      (Some(upload), Some(kind)) => Some(self.images.save(owner, upload, kind).await?),
      _ => None,
    };
    Ok((fields, image_path))
  }
}
