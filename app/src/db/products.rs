// app/src/db/products.rs

use super::store_error;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use stockroom::model::ImageChange;
use stockroom::query::{ProductQuery, SortKey};
use stockroom::{CatalogResult, Product, ProductFields, ProductId, ProductStore, UpsertCounts, UserId};
use tracing::{event, instrument, Level};

const COLUMNS: &str =
  "id, owner_id, name, category, price, stock, description, image, image_url, created_at, updated_at";

// The search pattern is either NULL (no filter) or an escaped `%needle%`.
const OWNER_AND_SEARCH: &str = "owner_id = $1 AND ($2::TEXT IS NULL \
   OR name ILIKE $2 ESCAPE '\\' \
   OR category ILIKE $2 ESCAPE '\\' \
   OR description ILIKE $2 ESCAPE '\\')";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: i64,
  owner_id: i64,
  name: String,
  category: String,
  price: Decimal,
  stock: i32,
  description: String,
  image: Option<String>,
  image_url: String,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      owner: UserId(row.owner_id),
      name: row.name,
      category: row.category,
      price: row.price,
      stock: row.stock,
      description: row.description,
      image: row.image,
      image_url: row.image_url,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

/// `%`, `_` and `\` in user input match literally.
pub fn like_pattern(needle: &str) -> String {
  let mut escaped = String::with_capacity(needle.len() + 2);
  escaped.push('%');
  for c in needle.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

/// ORDER BY clause for a sort key; ties are broken by id in the same direction.
pub fn order_clause(sort: SortKey) -> String {
  let dir = if sort.descending { "DESC" } else { "ASC" };
  format!("{} {dir}, id {dir}", sort.field.column())
}

#[derive(Clone)]
pub struct PgProductStore {
  pool: PgPool,
}

impl PgProductStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ProductStore for PgProductStore {
  async fn count(&self, owner: UserId, search: Option<&str>) -> CatalogResult<u64> {
    let sql = format!("SELECT COUNT(*) FROM products WHERE {OWNER_AND_SEARCH}");
    let total: i64 = sqlx::query_scalar(&sql)
      .bind(owner.0)
      .bind(search.map(like_pattern))
      .fetch_one(&self.pool)
      .await
      .map_err(|e| store_error("counting products", e))?;
    Ok(total.max(0) as u64)
  }

  #[instrument(name = "pg_store::fetch", skip(self, query), fields(owner = %query.owner, sort = %query.sort))]
  async fn fetch(&self, query: &ProductQuery) -> CatalogResult<Vec<Product>> {
    let sql = format!(
      "SELECT {COLUMNS} FROM products WHERE {OWNER_AND_SEARCH} ORDER BY {} LIMIT $3 OFFSET $4",
      order_clause(query.sort)
    );
    let rows: Vec<ProductRow> = sqlx::query_as(&sql)
      .bind(query.owner.0)
      .bind(query.search.as_deref().map(like_pattern))
      .bind(query.limit.map(|l| l as i64))
      .bind(query.offset as i64)
      .fetch_all(&self.pool)
      .await
      .map_err(|e| store_error("listing products", e))?;
    event!(Level::DEBUG, rows = rows.len(), "Fetched product rows.");
    Ok(rows.into_iter().map(Product::from).collect())
  }

  async fn get(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>> {
    let sql = format!("SELECT {COLUMNS} FROM products WHERE owner_id = $1 AND id = $2");
    let row: Option<ProductRow> = sqlx::query_as(&sql)
      .bind(owner.0)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("fetching a product", e))?;
    Ok(row.map(Product::from))
  }

  async fn insert(&self, owner: UserId, fields: &ProductFields, image: Option<String>) -> CatalogResult<Product> {
    let sql = format!(
      "INSERT INTO products (owner_id, name, category, price, stock, description, image, image_url) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
    );
    let row: ProductRow = sqlx::query_as(&sql)
      .bind(owner.0)
      .bind(&fields.name)
      .bind(&fields.category)
      .bind(fields.price)
      .bind(fields.stock)
      .bind(&fields.description)
      .bind(image)
      .bind(&fields.image_url)
      .fetch_one(&self.pool)
      .await
      .map_err(|e| store_error("creating a product", e))?;
    Ok(row.into())
  }

  async fn update(
    &self,
    owner: UserId,
    id: ProductId,
    fields: &ProductFields,
    image: ImageChange,
  ) -> CatalogResult<Option<Product>> {
    let replacement = match image {
      ImageChange::Keep => None,
      ImageChange::Replace(path) => Some(path),
    };
    let sql = format!(
      "UPDATE products SET name = $3, category = $4, price = $5, stock = $6, description = $7, \
       image_url = $8, image = COALESCE($9, image), updated_at = NOW() \
       WHERE owner_id = $1 AND id = $2 RETURNING {COLUMNS}"
    );
    let row: Option<ProductRow> = sqlx::query_as(&sql)
      .bind(owner.0)
      .bind(id)
      .bind(&fields.name)
      .bind(&fields.category)
      .bind(fields.price)
      .bind(fields.stock)
      .bind(&fields.description)
      .bind(&fields.image_url)
      .bind(replacement)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("updating a product", e))?;
    Ok(row.map(Product::from))
  }

  async fn delete(&self, owner: UserId, id: ProductId) -> CatalogResult<Option<Product>> {
    let sql = format!("DELETE FROM products WHERE owner_id = $1 AND id = $2 RETURNING {COLUMNS}");
    let row: Option<ProductRow> = sqlx::query_as(&sql)
      .bind(owner.0)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(|e| store_error("deleting a product", e))?;
    Ok(row.map(Product::from))
  }

  #[instrument(name = "pg_store::upsert_by_name", skip(self, owner, rows), fields(owner = %owner, rows = rows.len()))]
  async fn upsert_by_name(&self, owner: UserId, rows: &[ProductFields]) -> CatalogResult<UpsertCounts> {
    let mut tx = self
      .pool
      .begin()
      .await
      .map_err(|e| store_error("starting the import transaction", e))?;
    let mut counts = UpsertCounts::default();

    for row in rows {
      let updated = sqlx::query(
        "UPDATE products SET category = $3, price = $4, stock = $5, description = $6, image_url = $7, \
         updated_at = NOW() \
         WHERE id = (SELECT id FROM products WHERE owner_id = $1 AND name = $2 ORDER BY id LIMIT 1)",
      )
      .bind(owner.0)
      .bind(&row.name)
      .bind(&row.category)
      .bind(row.price)
      .bind(row.stock)
      .bind(&row.description)
      .bind(&row.image_url)
      .execute(&mut *tx)
      .await
      .map_err(|e| store_error("updating an imported row", e))?;

      if updated.rows_affected() > 0 {
        counts.updated += 1;
        continue;
      }

      sqlx::query(
        "INSERT INTO products (owner_id, name, category, price, stock, description, image_url) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
      )
      .bind(owner.0)
      .bind(&row.name)
      .bind(&row.category)
      .bind(row.price)
      .bind(row.stock)
      .bind(&row.description)
      .bind(&row.image_url)
      .execute(&mut *tx)
      .await
      .map_err(|e| store_error("inserting an imported row", e))?;
      counts.created += 1;
    }

    // Dropping `tx` on any early return above rolls the whole batch back.
    tx.commit()
      .await
      .map_err(|e| store_error("committing the import transaction", e))?;
    event!(Level::INFO, created = counts.created, updated = counts.updated, "Import transaction committed.");
    Ok(counts)
  }
}
