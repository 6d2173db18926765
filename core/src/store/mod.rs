// core/src/store/mod.rs

//! The record store seam.
//!
//! Every method is scoped by an owner; a store must never return or touch a
//! record belonging to someone else.

pub mod memory;

use crate::error::CatalogResult;
use crate::identity::UserId;
use crate::model::{ImageChange, Product, ProductFields, ProductId};
use crate::query::ProductQuery;
use async_trait::async_trait;

pub use memory::MemoryProductStore;

/// Outcome of an upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
  pub created: usize,
  pub updated: usize,
}

#[async_trait]
pub trait ProductStore: Send + Sync {
  /// Number of `owner`'s products matching `search` (all of them when `None`).
  async fn count(&self, owner: UserId, search: Option<&str>) -> CatalogResult<u64>;

  async fn fetch(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>>;

  async fn get(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>>;

  async fn insert(&self, owner: UserId, fields: &ProductFields, image: Option<String>) -> CatalogResult<Product>;

  /// `None` when no product `id` belongs to `owner`. Refreshes `updated_at`.
  async fn update(
    &self,
    owner: UserId,
    id: ProductId,
    fields: &ProductFields,
    image: ImageChange,
  ) -> CatalogResult<Option<Product>>;

  /// Removes and returns the product, `None` when `owner` has no such product.
  async fn delete(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>>;

  /// Creates or updates one product per row, keyed by `(owner, name)`, in a single atomic transaction.
  ///
  /// An existing match gets category, price, stock, description and image_url
  /// overwritten and `updated_at` refreshed; when several products share the
  /// name, the oldest one is updated. Rows are applied in order, so a name
  /// repeated within the batch creates once and then updates. Either every
  /// row is applied or none is.
  async fn upsert_by_name(&self, owner: UserId, rows: &[ProductFields]) -> CatalogResult<UpsertCounts>;
}
