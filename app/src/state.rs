// app/src/state.rs
use crate::config::AppConfig;
use std::sync::Arc;
use stockroom::{CatalogService, CsvExchange, IdentityProvider, ImageStore, ProductStore};

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<CatalogService>,
  pub exchange: Arc<CsvExchange>,
  pub identity: Arc<dyn IdentityProvider>,
  pub config: Arc<AppConfig>, // Share loaded config
}

impl AppState {
  /// Wires the catalog and CSV exchange over one shared product store.
  pub fn assemble(
    config: Arc<AppConfig>,
    products: Arc<dyn ProductStore>,
    images: Arc<dyn ImageStore>,
    identity: Arc<dyn IdentityProvider>,
  ) -> Self {
    AppState {
      catalog: Arc::new(CatalogService::new(products.clone(), images)),
      exchange: Arc::new(CsvExchange::new(products)),
      identity,
      config,
    }
  }
}
