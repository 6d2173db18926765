// core/src/model/mod.rs

//! The Product record and its validation rules.

pub mod product;
pub mod validation;

pub use product::{ImageChange, Product, ProductFields, ProductId, ProductInput};
pub use validation::validate_product;
