// core/src/exchange/template.rs

use super::export::{csv_writer, finish};
use super::CsvDocument;
use crate::error::CatalogResult;

pub const TEMPLATE_HEADER: [&str; 6] = ["name", "category", "price", "stock", "description", "image_url"];

pub const SAMPLE_ROWS: [[&str; 6]; 3] = [
  ["Atlas Tee", "T-Shirts", "25.00", "42", "Soft cotton t-shirt", "https://example.com/tee.jpg"],
  ["Dune Hoodie", "Hoodies", "59.00", "12", "Comfy hoodie", ""],
  ["Zellige Cap", "Accessories", "19.00", "73", "Adjustable cap", "https://example.com/cap.jpg"],
];

/// The import header, optionally followed by three illustrative rows.
pub fn template(include_sample: bool) -> CatalogResult<CsvDocument> {
  let mut writer = csv_writer(Vec::new());
  writer.write_record(TEMPLATE_HEADER).map_err(anyhow::Error::from)?;
  if include_sample {
    for row in SAMPLE_ROWS {
      writer.write_record(row).map_err(anyhow::Error::from)?;
    }
  }
  Ok(CsvDocument {
    filename: if include_sample {
      "products_template_sample.csv"
    } else {
      "products_template.csv"
    },
    bytes: finish(writer)?,
  })
}
