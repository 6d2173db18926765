// core/src/exchange/import.rs

//! CSV import, validated in full before anything is written.
//!
//! Stages:
//!  1. decode the upload (invalid UTF-8 sequences are dropped),
//!  2. check the header for the required columns,
//!  3. validate every row, splitting clean rows from row errors,
//!  4. apply the strict/lenient policy,
//!  5. upsert the clean rows in one transaction.
//!
//! Stages 1 to 3 are pure and live in [`validate_upload`]; the store is only
//! reached in stage 5.

use crate::error::{CatalogError, CatalogResult};
use crate::model::validation::{check_category_length, check_name_length, check_price, check_stock, IMAGE_URL_MAX_CHARS};
use crate::model::ProductFields;
use csv::StringRecord;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, event, Level};

pub const REQUIRED_COLUMNS: [&str; 3] = ["name", "price", "stock"];

/// How many row errors a strict-mode abort message quotes.
pub const ABORT_PREVIEW_ROWS: usize = 5;

const UTF8_BOM: char = '\u{feff}';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImportMode {
  /// Skip invalid rows, commit the rest.
  #[default]
  Lenient,
  /// Any invalid row aborts the whole import; nothing is written.
  Strict,
}

impl ImportMode {
  pub fn from_flag(strict: bool) -> Self {
    if strict {
      ImportMode::Strict
    } else {
      ImportMode::Lenient
    }
  }

  pub fn is_strict(self) -> bool {
    self == ImportMode::Strict
  }
}

/// All problems found on one data row. `line` counts the header as line 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
  pub line: usize,
  pub reasons: Vec<String>,
}

impl fmt::Display for RowError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Row {}: {}", self.line, self.reasons.join("; "))
  }
}

/// Result of the validate-only pass.
#[derive(Debug, Clone, Default)]
pub struct ValidatedRows {
  pub total_rows: usize,
  pub clean: Vec<ProductFields>,
  pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
  pub mode: ImportMode,
  pub created: usize,
  pub updated: usize,
  /// Always 0 in strict mode.
  pub skipped: usize,
}

impl ImportSummary {
  pub fn message(&self) -> String {
    let mut msg = format!("Import complete: {} created, {} updated", self.created, self.updated);
    if !self.mode.is_strict() {
      msg.push_str(&format!(", {} skipped", self.skipped));
    }
    msg.push('.');
    msg
  }
}

/// Decodes as UTF-8, dropping invalid byte sequences and a leading byte-order mark.
pub fn decode_upload(bytes: &[u8]) -> String {
  let mut text = String::with_capacity(bytes.len());
  for chunk in bytes.utf8_chunks() {
    text.push_str(chunk.valid());
  }
  match text.strip_prefix(UTF8_BOM) {
    Some(rest) => rest.to_string(),
    None => text,
  }
}

/// Column positions by trimmed header name. A repeated name resolves to its last occurrence.
struct Columns(HashMap<String, usize>);

impl Columns {
  fn from_header(header: &StringRecord) -> Self {
    let mut map = HashMap::new();
    for (idx, name) in header.iter().enumerate() {
      map.insert(name.trim().to_string(), idx);
    }
    Columns(map)
  }

  fn missing_required(&self) -> Vec<String> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
      .iter()
      .filter(|c| !self.0.contains_key(**c))
      .map(|c| c.to_string())
      .collect();
    missing.sort();
    missing
  }

  /// Trimmed cell value; absent columns and short rows read as empty.
  fn cell<'r>(&self, record: &'r StringRecord, column: &str) -> &'r str {
    self
      .0
      .get(column)
      .and_then(|idx| record.get(*idx))
      .unwrap_or("")
      .trim()
  }
}

fn validate_row(columns: &Columns, record: &StringRecord) -> Result<ProductFields, Vec<String>> {
  let mut reasons = Vec::new();

  let name = columns.cell(record, "name");
  let category = columns.cell(record, "category");
  let description = columns.cell(record, "description");
  let image_url = columns.cell(record, "image_url");
  // Thousands separators are tolerated: "1,299.00" reads as 1299.00.
  let price_cleaned = columns.cell(record, "price").replace(',', "");
  let price_raw = price_cleaned.trim();
  let stock_raw = columns.cell(record, "stock");

  if name.is_empty() {
    reasons.push("name is required".to_string());
  } else if let Err(msg) = check_name_length(name) {
    reasons.push(msg);
  }
  if let Err(msg) = check_category_length(category) {
    reasons.push(msg);
  }
  let price = check_price(price_raw).map_err(|msg| reasons.push(msg)).ok();
  let stock = check_stock(stock_raw).map_err(|msg| reasons.push(msg)).ok();
  if image_url.chars().count() > IMAGE_URL_MAX_CHARS {
    reasons.push(format!("image_url must be at most {} characters", IMAGE_URL_MAX_CHARS));
  }

  match (price, stock) {
    (Some(price), Some(stock)) if reasons.is_empty() => Ok(ProductFields {
      name: name.to_string(),
      category: category.to_string(),
      price,
      stock,
      description: description.to_string(),
      image_url: image_url.to_string(),
    }),
    _ => Err(reasons),
  }
}

/// Stages 1 to 3: decode, check the header, validate every row. Writes nothing.
///
/// File-level problems (missing required columns, malformed CSV) are errors;
/// row-level problems are collected in [`ValidatedRows::errors`].
pub fn validate_upload(bytes: &[u8]) -> CatalogResult<ValidatedRows> {
  let text = decode_upload(bytes);
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(text.as_bytes());

  let header = reader
    .headers()
    .map_err(|e| CatalogError::UnreadableUpload(e.to_string()))?
    .clone();
  let columns = Columns::from_header(&header);
  let missing = columns.missing_required();
  if !missing.is_empty() {
    event!(Level::WARN, missing = ?missing, "CSV import rejected: required columns absent.");
    return Err(CatalogError::MissingColumns { columns: missing });
  }

  let mut validated = ValidatedRows::default();
  for (idx, record) in reader.records().enumerate() {
    let record = record.map_err(|e| CatalogError::UnreadableUpload(e.to_string()))?;
    let line = idx + 2;
    validated.total_rows += 1;
    match validate_row(&columns, &record) {
      Ok(fields) => validated.clean.push(fields),
      Err(reasons) => {
        debug!(line, "CSV row rejected: {}", reasons.join("; "));
        validated.errors.push(RowError { line, reasons });
      }
    }
  }
  Ok(validated)
}

/// `"Import aborted: N error(s). <first five>"`, with `" (+M more)"` when truncated.
pub fn abort_message(errors: &[RowError]) -> String {
  let preview: Vec<String> = errors.iter().take(ABORT_PREVIEW_ROWS).map(RowError::to_string).collect();
  let more = if errors.len() > ABORT_PREVIEW_ROWS {
    format!(" (+{} more)", errors.len() - ABORT_PREVIEW_ROWS)
  } else {
    String::new()
  };
  format!("Import aborted: {} error(s). {}{}", errors.len(), preview.join("; "), more)
}

/// Stage 4: the strict-mode gate.
pub fn enforce_policy(mode: ImportMode, validated: &ValidatedRows) -> CatalogResult<()> {
  if mode.is_strict() && !validated.errors.is_empty() {
    return Err(CatalogError::ImportAborted {
      error_count: validated.errors.len(),
      message: abort_message(&validated.errors),
    });
  }
  Ok(())
}

/// Rows excluded from the commit. Counted from the row totals, not from the error list.
pub fn skipped_rows(mode: ImportMode, validated: &ValidatedRows) -> usize {
  if mode.is_strict() {
    0
  } else {
    validated.total_rows - validated.clean.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decode_drops_invalid_bytes_and_bom() {
    let bytes = b"\xEF\xBB\xBFname\xFF,price\n";
    assert_eq!(decode_upload(bytes), "name,price\n");
  }

  #[test]
  fn missing_columns_are_named_and_sorted() {
    let err = validate_upload(b"name,category\nFoo,Bar\n").unwrap_err();
    match err {
      CatalogError::MissingColumns { columns } => assert_eq!(columns, vec!["price", "stock"]),
      other => panic!("expected MissingColumns, got {:?}", other),
    }
  }

  #[test]
  fn empty_upload_misses_every_required_column() {
    let err = validate_upload(b"").unwrap_err();
    assert_eq!(err.to_string(), "Missing required columns: name, price, stock");
  }

  #[test]
  fn header_names_are_trimmed() {
    let validated = validate_upload(b" name , price ,stock\nFoo,1,2\n").unwrap();
    assert_eq!(validated.clean.len(), 1);
    assert_eq!(validated.clean[0].name, "Foo");
  }

  #[test]
  fn row_errors_carry_line_numbers_and_all_reasons() {
    let csv = b"name,category,price,stock,description,image_url\nFoo,Bar,10.00,5,,\n,Baz,-1,x,,\n";
    let validated = validate_upload(csv).unwrap();
    assert_eq!(validated.total_rows, 2);
    assert_eq!(validated.clean.len(), 1);
    assert_eq!(
      validated.errors[0].to_string(),
      "Row 3: name is required; price must be ≥ 0; invalid stock 'x'"
    );
  }

  #[test]
  fn price_thousands_separator_and_whitespace() {
    let csv = "name,price,stock\n  Lamp  ,\"1,299.50\", 3 \n";
    let validated = validate_upload(csv.as_bytes()).unwrap();
    let row = &validated.clean[0];
    assert_eq!(row.name, "Lamp");
    assert_eq!(row.price.to_string(), "1299.50");
    assert_eq!(row.stock, 3);
  }

  #[test]
  fn invalid_price_quotes_the_raw_value() {
    let validated = validate_upload(b"name,price,stock\nFoo,ten,1\n").unwrap();
    assert_eq!(validated.errors[0].reasons, vec!["invalid price 'ten'"]);
  }

  #[test]
  fn short_rows_read_missing_cells_as_empty() {
    let validated = validate_upload(b"name,price,stock,category\nFoo,1\n").unwrap();
    assert_eq!(validated.errors[0].reasons, vec!["invalid stock ''"]);
  }

  #[test]
  fn abort_message_truncates_after_five() {
    let errors: Vec<RowError> = (2..9)
      .map(|line| RowError {
        line,
        reasons: vec!["name is required".to_string()],
      })
      .collect();
    let msg = abort_message(&errors);
    assert!(msg.starts_with("Import aborted: 7 error(s). Row 2: name is required; Row 3"));
    assert!(msg.contains("Row 6: name is required (+2 more)"));
    assert!(!msg.contains("Row 7"));
  }

  #[test]
  fn summary_messages() {
    let lenient = ImportSummary {
      mode: ImportMode::Lenient,
      created: 1,
      updated: 2,
      skipped: 3,
    };
    assert_eq!(lenient.message(), "Import complete: 1 created, 2 updated, 3 skipped.");
    let strict = ImportSummary {
      mode: ImportMode::Strict,
      ..lenient
    };
    assert_eq!(strict.message(), "Import complete: 1 created, 2 updated.");
  }
}
