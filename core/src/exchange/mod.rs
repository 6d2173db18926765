// core/src/exchange/mod.rs

//! CSV export, template download and import for a user's catalog.

pub mod export;
pub mod import;
pub mod template;

use crate::error::CatalogResult;
use crate::identity::Identity;
use crate::query::{ProductQuery, SortField, SortKey};
use crate::store::ProductStore;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub use import::{ImportMode, ImportSummary, RowError, ValidatedRows};

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// A downloadable CSV file.
#[derive(Debug, Clone)]
pub struct CsvDocument {
  pub filename: &'static str,
  pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct CsvExchange {
  store: Arc<dyn ProductStore>,
}

impl CsvExchange {
  pub fn new(store: Arc<dyn ProductStore>) -> Self {
    Self { store }
  }

  /// All of the caller's products, sorted by name.
  #[instrument(name = "csv::export", skip(self, identity), err(Display))]
  pub async fn export(&self, identity: &Identity) -> CatalogResult<CsvDocument> {
    let owner = identity.require_user()?;
    let products = self
      .store
      .fetch(&ProductQuery::all(owner, SortKey::asc(SortField::Name)))
      .await?;
    info!(owner = %owner, rows = products.len(), "Exporting products as CSV.");
    export::export_document(&products)
  }

  #[instrument(name = "csv::template", skip(self, identity), err(Display))]
  pub async fn template(&self, identity: &Identity, include_sample: bool) -> CatalogResult<CsvDocument> {
    identity.require_user()?;
    template::template(include_sample)
  }

  /// Validates the whole upload first, then upserts the clean rows by `(owner, name)` atomically.
  ///
  /// Missing required columns or an unreadable upload abort with no writes.
  /// In strict mode a single bad row does the same.
  #[instrument(name = "csv::import", skip(self, identity, upload), fields(upload_len = upload.len()), err(Display))]
  pub async fn import(&self, identity: &Identity, upload: &[u8], mode: ImportMode) -> CatalogResult<ImportSummary> {
    let owner = identity.require_user()?;

    let validated = import::validate_upload(upload)?;
    if let Err(abort) = import::enforce_policy(mode, &validated) {
      warn!(owner = %owner, errors = validated.errors.len(), "Strict CSV import aborted.");
      return Err(abort);
    }

    let counts = self.store.upsert_by_name(owner, &validated.clean).await?;
    let summary = ImportSummary {
      mode,
      created: counts.created,
      updated: counts.updated,
      skipped: import::skipped_rows(mode, &validated),
    };
    info!(
      owner = %owner,
      strict = mode.is_strict(),
      created = summary.created,
      updated = summary.updated,
      skipped = summary.skipped,
      "CSV import committed."
    );
    Ok(summary)
  }
}
