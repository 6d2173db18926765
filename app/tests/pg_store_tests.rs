// tests/pg_store_tests.rs
//! Runs against a throwaway PostgreSQL database provisioned by `sqlx::test` (needs `DATABASE_URL`).

use rust_decimal::Decimal;
use sqlx::PgPool;
use stockroom::query::ProductQuery;
use stockroom::{ProductFields, ProductStore, SortField, SortKey, UserId};
use stockroom_app::db::PgProductStore;

async fn seed_user(pool: &PgPool, username: &str) -> UserId {
  let id: i64 = sqlx::query_scalar("INSERT INTO users (username, password_hash) VALUES ($1, 'x') RETURNING id")
    .bind(username)
    .fetch_one(pool)
    .await
    .expect("seed user");
  UserId(id)
}

fn fields(name: &str, cents: i64) -> ProductFields {
  ProductFields {
    name: name.to_string(),
    category: "Lighting".to_string(),
    price: Decimal::new(cents, 2),
    stock: 1,
    description: String::new(),
    image_url: String::new(),
  }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_failed_row_rolls_back_whole_upsert(pool: PgPool) {
  let owner = seed_user(&pool, "sara").await;
  let store = PgProductStore::new(pool);

  // The second row cannot be stored: name is VARCHAR(120).
  let batch = [fields("Desk Lamp", 1850), fields(&"n".repeat(121), 100)];
  let result = store.upsert_by_name(owner, &batch).await;

  assert!(result.is_err());
  assert_eq!(store.count(owner, None).await.unwrap(), 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upsert_updates_existing_and_creates_new(pool: PgPool) {
  let owner = seed_user(&pool, "sara").await;
  let store = PgProductStore::new(pool);
  store.insert(owner, &fields("Desk Lamp", 1000), None).await.unwrap();

  let counts = store
    .upsert_by_name(owner, &[fields("Desk Lamp", 1850), fields("Floor Lamp", 4900)])
    .await
    .unwrap();
  assert_eq!((counts.created, counts.updated), (1, 1));

  let all = store.fetch(&ProductQuery::all(owner, SortKey::asc(SortField::Name))).await.unwrap();
  let prices: Vec<String> = all.iter().map(|p| p.price.to_string()).collect();
  assert_eq!(prices, vec!["18.50", "49.00"]);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_search_matches_wildcards_literally(pool: PgPool) {
  let owner = seed_user(&pool, "sara").await;
  let store = PgProductStore::new(pool);
  for name in ["50% off tee", "500 off tee", "a_b cap", "axb cap"] {
    store.insert(owner, &fields(name, 100), None).await.unwrap();
  }

  assert_eq!(store.count(owner, Some("50%")).await.unwrap(), 1);
  assert_eq!(store.count(owner, Some("a_b")).await.unwrap(), 1);
  assert_eq!(store.count(owner, Some("OFF TEE")).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_equal_sort_values_are_ordered_by_id(pool: PgPool) {
  let owner = seed_user(&pool, "sara").await;
  let other = seed_user(&pool, "omar").await;
  let store = PgProductStore::new(pool);
  let mut ids = Vec::new();
  for name in ["Cap", "Tee", "Hoodie"] {
    ids.push(store.insert(owner, &fields(name, 1500), None).await.unwrap().id);
  }
  store.insert(other, &fields("Foreign", 1500), None).await.unwrap();

  let asc = store.fetch(&ProductQuery::all(owner, SortKey::asc(SortField::Price))).await.unwrap();
  assert_eq!(asc.iter().map(|p| p.id).collect::<Vec<_>>(), ids);

  let desc = store.fetch(&ProductQuery::all(owner, SortKey::desc(SortField::Price))).await.unwrap();
  let mut reversed = ids.clone();
  reversed.reverse();
  assert_eq!(desc.iter().map(|p| p.id).collect::<Vec<_>>(), reversed);
}
