//! Page-number pagination.

use serde::{Deserialize, Serialize};

/// One page of a larger result. Pages are 1-based; a request past the end
/// yields an empty page that still reports the true totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
  pub items:        Vec<T>,
  pub current_page: usize,
  pub total_pages:  usize,
  pub total:        usize,
}

impl<T> Page<T> {
  /// Assemble a page whose items were already sliced (e.g. by a store).
  pub fn from_parts(items: Vec<T>, page: usize, per_page: usize, total: usize) -> Self {
    Self {
      items,
      current_page: page.max(1),
      total_pages: total.div_ceil(per_page.max(1)),
      total,
    }
  }

  pub fn empty() -> Self { Self::from_parts(Vec::new(), 1, 1, 0) }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items:        self.items.into_iter().map(f).collect(),
      current_page: self.current_page,
      total_pages:  self.total_pages,
      total:        self.total,
    }
  }
}

/// Index of the first item on `page`. Page 0 is treated as page 1.
pub fn offset(page: usize, per_page: usize) -> usize {
  (page.max(1) - 1).saturating_mul(per_page.max(1))
}

/// Slice an in-memory list.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
  let total = items.len();
  let per_page = per_page.max(1);
  let items = items
    .into_iter()
    .skip(offset(page, per_page))
    .take(per_page)
    .collect();
  Page::from_parts(items, page, per_page, total)
}
