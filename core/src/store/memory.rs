// core/src/store/memory.rs

//! In-process [`ProductStore`], used by tests and local runs.

use super::{ProductStore, UpsertCounts};
use crate::error::CatalogResult;
use crate::identity::UserId;
use crate::model::{ImageChange, Product, ProductFields, ProductId};
use crate::query::{ProductQuery, SortField, SortKey};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::{event, Level};

#[derive(Debug, Clone, Default)]
struct Tables {
  next_id: ProductId,
  products: BTreeMap<ProductId, Product>,
  last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
  // Strictly increasing, so "updated after" is observable even within one clock tick.
  fn now(&mut self) -> DateTime<Utc> {
    let mut now = Utc::now();
    if let Some(last) = self.last_timestamp {
      if now <= last {
        now = last + chrono::Duration::microseconds(1);
      }
    }
    self.last_timestamp = Some(now);
    now
  }

  fn insert(&mut self, owner: UserId, fields: &ProductFields, image: Option<String>) -> Product {
    self.next_id += 1;
    let now = self.now();
    let product = Product {
      id: self.next_id,
      owner,
      name: fields.name.clone(),
      category: fields.category.clone(),
      price: fields.price,
      stock: fields.stock,
      description: fields.description.clone(),
      image,
      image_url: fields.image_url.clone(),
      created_at: now,
      updated_at: now,
    };
    self.products.insert(product.id, product.clone());
    product
  }

  fn owned_mut(&mut self, owner: UserId, id: ProductId) -> Option<&mut Product> {
    self.products.get_mut(&id).filter(|p| p.owner == owner)
  }
}

#[derive(Debug, Default)]
pub struct MemoryProductStore {
  tables: RwLock<Tables>,
}

impl MemoryProductStore {
  pub fn new() -> Self {
    Self::default()
  }
}

fn matches_search(product: &Product, needle_lower: &str) -> bool {
  [&product.name, &product.category, &product.description]
    .iter()
    .any(|field| field.to_lowercase().contains(needle_lower))
}

fn compare(a: &Product, b: &Product, sort: SortKey) -> Ordering {
  let by_field = match sort.field {
    SortField::Name => a.name.cmp(&b.name),
    SortField::Price => a.price.cmp(&b.price),
    SortField::Stock => a.stock.cmp(&b.stock),
    SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    SortField::CreatedAt => a.created_at.cmp(&b.created_at),
  };
  let ordering = by_field.then(a.id.cmp(&b.id));
  if sort.descending {
    ordering.reverse()
  } else {
    ordering
  }
}

fn owned_matching<'a>(tables: &'a Tables, owner: UserId, search: Option<&str>) -> Vec<&'a Product> {
  let needle = search.map(str::to_lowercase);
  tables
    .products
    .values()
    .filter(|p| p.owner == owner)
    .filter(|p| needle.as_deref().map_or(true, |n| matches_search(p, n)))
    .collect()
}

#[async_trait]
impl ProductStore for MemoryProductStore {
  async fn count(&self, owner: UserId, search: Option<&str>) -> CatalogResult<u64> {
    let tables = self.tables.read();
    Ok(owned_matching(&tables, owner, search).len() as u64)
  }

  async fn fetch(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
    let tables = self.tables.read();
    let mut rows = owned_matching(&tables, query.owner, query.search.as_deref());
    rows.sort_by(|a, b| compare(a, b, query.sort));
    let limit = query.limit.map_or(usize::MAX, |l| l as usize);
    Ok(
      rows
        .into_iter()
        .skip(query.offset as usize)
        .take(limit)
        .cloned()
        .collect(),
    )
  }

  async fn get(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>> {
    let tables = self.tables.read();
    Ok(tables.products.get(&id).filter(|p| p.owner == owner).cloned())
  }

  async fn insert(&self, owner: UserId, fields: &ProductFields, image: Option<String>) -> CatalogResult<Product> {
    Ok(self.tables.write().insert(owner, fields, image))
  }

  async fn update(
    &self,
    owner: UserId,
    id: ProductId,
    fields: &ProductFields,
    image: ImageChange,
  ) -> CatalogResult<Option<Product>> {
    let mut tables = self.tables.write();
    let now = tables.now();
    let Some(product) = tables.owned_mut(owner, id) else {
      return Ok(None);
    };
    product.apply(fields);
    if let ImageChange::Replace(path) = image {
      product.image = Some(path);
    }
    product.updated_at = now;
    Ok(Some(product.clone()))
  }

  async fn delete(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>> {
    let mut tables = self.tables.write();
    if tables.owned_mut(owner, id).is_none() {
      return Ok(None);
    }
    Ok(tables.products.remove(&id))
  }

  async fn upsert_by_name(&self, owner: UserId, rows: &[ProductFields]) -> CatalogResult<UpsertCounts> {
    let mut guard = self.tables.write();
    // Work on a copy and swap it in at the end: readers never see a half-applied batch.
    let mut staged = guard.clone();
    let mut counts = UpsertCounts::default();

    for row in rows {
      let existing = staged
        .products
        .values()
        .filter(|p| p.owner == owner && p.name == row.name)
        .map(|p| p.id)
        .min();
      match existing {
        Some(id) => {
          let now = staged.now();
          if let Some(product) = staged.products.get_mut(&id) {
            product.apply(row);
            product.updated_at = now;
          }
          counts.updated += 1;
        }
        None => {
          staged.insert(owner, row, None);
          counts.created += 1;
        }
      }
    }

    *guard = staged;
    event!(Level::DEBUG, owner = %owner, created = counts.created, updated = counts.updated, "Upsert batch applied.");
    Ok(counts)
  }
}
