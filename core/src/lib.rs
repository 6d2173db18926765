// src/lib.rs

//! Stockroom: a per-user inventory catalog.
//!
//! Stockroom keeps each user's products private to them and offers:
//!  - Listing with case-insensitive search, ten sort orders and clamped pagination.
//!  - Single-record create/read/update/delete, scoped to the record's owner.
//!  - CSV export, a downloadable import template, and CSV import with
//!    strict (all-or-nothing) or lenient (skip bad rows) policies, upserting by
//!    `(owner, name)` inside one transaction.
//!
//! Storage, image files and authentication are reached through the
//! [`ProductStore`], [`ImageStore`] and [`IdentityProvider`] traits. In-memory
//! implementations of the first two ship with the crate.

pub mod catalog;
pub mod error;
pub mod exchange;
pub mod identity;
pub mod images;
pub mod model;
pub mod page;
pub mod query;
pub mod store;

// --- Re-exports for the Public API ---

pub use crate::catalog::CatalogService;
pub use crate::error::{CatalogError, CatalogResult, FieldError, ValidationErrors};
pub use crate::exchange::{CsvDocument, CsvExchange, ImportMode, ImportSummary, CSV_CONTENT_TYPE};
pub use crate::identity::{
  validate_signup, Credentials, Identity, IdentityProvider, Session, SessionToken, SignupForm, UserAccount, UserId,
};
pub use crate::images::{ImageKind, ImageStore, ImageUpload, MemoryImageStore};
pub use crate::model::{validate_product, Product, ProductFields, ProductId, ProductInput};
pub use crate::page::Page;
pub use crate::query::{ListQuery, SortField, SortKey};
pub use crate::store::{MemoryProductStore, ProductStore, UpsertCounts};
