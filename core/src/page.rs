// core/src/page.rs

use crate::query::PageSelector;
use serde::Serialize;

/// Where a requested page falls once the total is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
  pub number: u64,
  pub per_page: u32,
  pub total_items: u64,
  pub total_pages: u64,
}

impl PageWindow {
  /// An empty listing still has one (empty) page.
  pub fn locate(total_items: u64, per_page: u32, selector: PageSelector) -> Self {
    let per_page = per_page.max(1);
    let total_pages = total_items.div_ceil(per_page as u64).max(1);
    PageWindow {
      number: selector.resolve(total_pages),
      per_page,
      total_items,
      total_pages,
    }
  }

  pub fn offset(&self) -> u64 {
    (self.number - 1) * self.per_page as u64
  }

  pub fn limit(&self) -> u64 {
    self.per_page as u64
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub number: u64,
  pub per_page: u32,
  pub total_items: u64,
  pub total_pages: u64,
  pub has_next: bool,
  pub has_previous: bool,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, window: PageWindow) -> Self {
    Page {
      items,
      number: window.number,
      per_page: window.per_page,
      total_items: window.total_items,
      total_pages: window.total_pages,
      has_next: window.number < window.total_pages,
      has_previous: window.number > 1,
    }
  }
}
