// core/src/model/product.rs

use crate::identity::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type ProductId = i64;

/// A catalog record. Exactly one owner; invisible to every other user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
  pub id: ProductId,
  pub owner: UserId,
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub stock: i32,
  pub description: String,
  /// Stored path of an uploaded image, relative to the media root.
  pub image: Option<String>,
  pub image_url: String,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Product fields exactly as submitted, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductInput {
  pub name: String,
  pub category: String,
  pub price: String,
  pub stock: String,
  pub description: String,
  pub image_url: String,
}

/// Validated, typed product fields ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
  pub name: String,
  pub category: String,
  pub price: Decimal,
  pub stock: i32,
  pub description: String,
  pub image_url: String,
}

/// Which stored image a write should leave on the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChange {
  Keep,
  Replace(String),
}

impl Product {
  /// Copies validated fields onto the record. `updated_at` is the caller's business.
  pub fn apply(&mut self, fields: &ProductFields) {
    self.name = fields.name.clone();
    self.category = fields.category.clone();
    self.price = fields.price;
    self.stock = fields.stock;
    self.description = fields.description.clone();
    self.image_url = fields.image_url.clone();
  }
}
