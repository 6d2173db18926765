// tests/common/mod.rs
#![allow(dead_code)] // Allow unused code in this common test module

use once_cell::sync::Lazy;
use std::sync::Arc;
use stockroom::{
  CatalogService, CsvExchange, Identity, MemoryImageStore, MemoryProductStore, ProductInput, ProductStore, UserId,
};
use tracing::Level;

// --- Fixture wiring the services to in-memory stores ---
pub struct Fixture {
  pub store: Arc<MemoryProductStore>,
  pub images: Arc<MemoryImageStore>,
  pub catalog: CatalogService,
  pub exchange: CsvExchange,
}

pub fn fixture() -> Fixture {
  let store = Arc::new(MemoryProductStore::new());
  let images = Arc::new(MemoryImageStore::new());
  let catalog = CatalogService::new(store.clone(), images.clone());
  let exchange = CsvExchange::new(store.clone());
  Fixture {
    store,
    images,
    catalog,
    exchange,
  }
}

impl Fixture {
  pub async fn count(&self, who: &Identity) -> u64 {
    let owner = who.require_user().expect("fixture identity must be a user");
    self.store.count(owner, None).await.expect("count")
  }
}

// --- Identities ---
pub fn alice() -> Identity {
  Identity::user(UserId(1), "alice")
}

pub fn bob() -> Identity {
  Identity::user(UserId(2), "bob")
}

pub fn product_input(name: &str, price: &str, stock: &str) -> ProductInput {
  ProductInput {
    name: name.to_string(),
    price: price.to_string(),
    stock: stock.to_string(),
    ..Default::default()
  }
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

// --- Helper for Tracing Setup (call once per test run if needed) ---
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer() // Important for tests to capture output
    .try_init()
    .ok(); // Allow multiple initializations in tests (ok if fails)
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
