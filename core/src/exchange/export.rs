// core/src/exchange/export.rs

use super::CsvDocument;
use crate::error::CatalogResult;
use crate::model::Product;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io;

pub const EXPORT_FILENAME: &str = "products.csv";

pub const EXPORT_HEADER: [&str; 8] = [
  "name",
  "category",
  "price",
  "stock",
  "description",
  "image_url",
  "created_at",
  "updated_at",
];

pub(crate) fn csv_writer<W: io::Write>(out: W) -> csv::Writer<W> {
  csv::WriterBuilder::new()
    .terminator(csv::Terminator::CRLF)
    .from_writer(out)
}

pub(crate) fn finish<W: io::Write>(writer: csv::Writer<W>) -> CatalogResult<W> {
  writer
    .into_inner()
    .map_err(|e| anyhow::anyhow!("flushing CSV output failed: {}", e.error()).into())
}

/// One line per record: carriage returns and newlines in descriptions become spaces.
fn single_line(text: &str) -> String {
  text.replace(['\r', '\n'], " ")
}

fn timestamp(at: &DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Writes `products` in the given order under the fixed export header.
pub fn write_export<W: io::Write>(products: &[Product], out: W) -> CatalogResult<W> {
  let mut writer = csv_writer(out);
  writer.write_record(EXPORT_HEADER).map_err(anyhow::Error::from)?;
  for p in products {
    writer
      .write_record([
        p.name.as_str(),
        p.category.as_str(),
        p.price.to_string().as_str(),
        p.stock.to_string().as_str(),
        single_line(&p.description).as_str(),
        p.image_url.as_str(),
        timestamp(&p.created_at).as_str(),
        timestamp(&p.updated_at).as_str(),
      ])
      .map_err(anyhow::Error::from)?;
  }
  finish(writer)
}

pub(crate) fn export_document(products: &[Product]) -> CatalogResult<CsvDocument> {
  let bytes = write_export(products, Vec::new())?;
  Ok(CsvDocument {
    filename: EXPORT_FILENAME,
    bytes,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::identity::UserId;
  use chrono::TimeZone;
  use rust_decimal::Decimal;

  #[test]
  fn renders_fixed_columns_on_one_line() {
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 5).unwrap();
    let product = Product {
      id: 1,
      owner: UserId(1),
      name: "Dune Hoodie".to_string(),
      category: "Hoodies".to_string(),
      price: Decimal::new(5900, 2),
      stock: 12,
      description: "Comfy\r\nhoodie, warm".to_string(),
      image: None,
      image_url: String::new(),
      created_at: at,
      updated_at: at,
    };
    let bytes = write_export(&[product], Vec::new()).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(
      text,
      "name,category,price,stock,description,image_url,created_at,updated_at\r\n\
       Dune Hoodie,Hoodies,59.00,12,\"Comfy  hoodie, warm\",,2025-03-01T09:30:05+00:00,2025-03-01T09:30:05+00:00\r\n"
    );
  }
}
