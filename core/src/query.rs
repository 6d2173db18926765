// core/src/query.rs

//! List parameters: search text, sort key, page and page size.
//!
//! Parsing here never fails. Anything unrecognized falls back to a default so
//! a hand-edited query string still yields a listing.

use crate::identity::UserId;
use std::fmt;

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const MAX_PER_PAGE: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
  Name,
  Price,
  Stock,
  UpdatedAt,
  CreatedAt,
}

impl SortField {
  pub fn column(self) -> &'static str {
    match self {
      SortField::Name => "name",
      SortField::Price => "price",
      SortField::Stock => "stock",
      SortField::UpdatedAt => "updated_at",
      SortField::CreatedAt => "created_at",
    }
  }

  fn param(self) -> &'static str {
    match self {
      SortField::Name => "name",
      SortField::Price => "price",
      SortField::Stock => "stock",
      SortField::UpdatedAt => "updated",
      SortField::CreatedAt => "created",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortKey {
  pub field: SortField,
  pub descending: bool,
}

impl Default for SortKey {
  fn default() -> Self {
    SortKey::desc(SortField::UpdatedAt)
  }
}

impl SortKey {
  pub const fn asc(field: SortField) -> Self {
    SortKey {
      field,
      descending: false,
    }
  }

  pub const fn desc(field: SortField) -> Self {
    SortKey {
      field,
      descending: true,
    }
  }

  /// Accepts `name`, `-price`, `updated`, `-created_at`, ...; anything else means `-updated`.
  pub fn parse(raw: &str) -> Self {
    let raw = raw.trim();
    let (descending, name) = match raw.strip_prefix('-') {
      Some(rest) => (true, rest),
      None => (false, raw),
    };
    let field = match name {
      "name" => SortField::Name,
      "price" => SortField::Price,
      "stock" => SortField::Stock,
      "updated" | "updated_at" => SortField::UpdatedAt,
      "created" | "created_at" => SortField::CreatedAt,
      _ => return SortKey::default(),
    };
    SortKey { field, descending }
  }
}

impl fmt::Display for SortKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.descending {
      f.write_str("-")?;
    }
    f.write_str(self.field.param())
  }
}

/// A requested page number, resolved against the page count only once it is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
  Number(i64),
  NotAnInteger,
}

impl Default for PageSelector {
  fn default() -> Self {
    PageSelector::Number(1)
  }
}

impl PageSelector {
  pub fn parse(raw: Option<&str>) -> Self {
    match raw.map(str::trim) {
      None | Some("") => PageSelector::default(),
      Some(s) => s
        .parse::<i64>()
        .map(PageSelector::Number)
        .unwrap_or(PageSelector::NotAnInteger),
    }
  }

  /// Non-integers land on page 1; anything outside `1..=total_pages` lands on the last page.
  pub fn resolve(self, total_pages: u64) -> u64 {
    match self {
      PageSelector::NotAnInteger => 1,
      PageSelector::Number(n) if n >= 1 && (n as u64) <= total_pages => n as u64,
      PageSelector::Number(_) => total_pages,
    }
  }
}

/// Page size from a raw parameter: non-integers mean 10, then clamped to `1..=50`.
pub fn parse_per_page(raw: Option<&str>) -> u32 {
  let requested = raw
    .and_then(|s| s.trim().parse::<i64>().ok())
    .unwrap_or(DEFAULT_PER_PAGE as i64);
  requested.clamp(1, MAX_PER_PAGE as i64) as u32
}

/// A caller's listing request, already normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
  pub q: String,
  pub sort: SortKey,
  pub page: PageSelector,
  pub per_page: u32,
}

impl Default for ListQuery {
  fn default() -> Self {
    ListQuery {
      q: String::new(),
      sort: SortKey::default(),
      page: PageSelector::default(),
      per_page: DEFAULT_PER_PAGE,
    }
  }
}

impl ListQuery {
  pub fn from_params(q: Option<&str>, sort: Option<&str>, page: Option<&str>, per_page: Option<&str>) -> Self {
    ListQuery {
      q: q.map(str::trim).unwrap_or_default().to_string(),
      sort: sort.map(SortKey::parse).unwrap_or_default(),
      page: PageSelector::parse(page),
      per_page: parse_per_page(per_page),
    }
  }

  pub fn search(&self) -> Option<&str> {
    if self.q.is_empty() {
      None
    } else {
      Some(&self.q)
    }
  }
}

/// The filter/sort/window handed to the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
  pub owner: UserId,
  /// Case-insensitive substring matched against name, category or description.
  pub search: Option<String>,
  pub sort: SortKey,
  pub offset: u64,
  /// `None` fetches everything from `offset` on.
  pub limit: Option<u64>,
}

impl ProductQuery {
  /// Every product of `owner`, in `sort` order.
  pub fn all(owner: UserId, sort: SortKey) -> Self {
    ProductQuery {
      owner,
      search: None,
      sort,
      offset: 0,
      limit: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sort_keys_round_trip_through_params() {
    for raw in ["name", "-name", "price", "-price", "stock", "-stock", "updated", "-updated", "created", "-created"] {
      assert_eq!(SortKey::parse(raw).to_string(), raw);
    }
    assert_eq!(SortKey::parse("-updated_at"), SortKey::desc(SortField::UpdatedAt));
    assert_eq!(SortKey::parse("created_at"), SortKey::asc(SortField::CreatedAt));
  }

  #[test]
  fn unknown_sort_falls_back_to_newest_update() {
    assert_eq!(SortKey::parse("owner"), SortKey::desc(SortField::UpdatedAt));
    assert_eq!(SortKey::parse(""), SortKey::desc(SortField::UpdatedAt));
    assert_eq!(SortKey::parse("--name"), SortKey::desc(SortField::UpdatedAt));
  }

  #[test]
  fn per_page_is_clamped() {
    assert_eq!(parse_per_page(None), 10);
    assert_eq!(parse_per_page(Some("abc")), 10);
    assert_eq!(parse_per_page(Some("1000")), 50);
    assert_eq!(parse_per_page(Some("0")), 1);
    assert_eq!(parse_per_page(Some("-4")), 1);
    assert_eq!(parse_per_page(Some(" 25 ")), 25);
  }

  #[test]
  fn page_selector_resolution() {
    assert_eq!(PageSelector::parse(Some("x")).resolve(4), 1);
    assert_eq!(PageSelector::parse(Some("3")).resolve(4), 3);
    assert_eq!(PageSelector::parse(Some("9")).resolve(4), 4);
    assert_eq!(PageSelector::parse(Some("0")).resolve(4), 4);
    assert_eq!(PageSelector::parse(None).resolve(1), 1);
  }
}
