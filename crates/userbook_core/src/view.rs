//! Client-side ordering and paging of a record list.
//!
//! # Responsibility
//! - Order records by one of the sortable table columns.
//! - Slice an ordered list into fixed-size pages.
//!
//! # Invariants
//! - Sorting is stable in both directions: equal keys keep their input order.
//! - Pages are 1-based; a page past the end is empty, never an error.
//! - Page size is clamped into `1..=PAGE_SIZE_MAX`; `0` selects the default.

use crate::date::compare_dates;
use crate::model::user::UserRecord;
use std::cmp::Ordering;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const PAGE_SIZE_MAX: usize = 100;

/// Table column a record list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Id,
    FirstName,
    LastName,
    Age,
    /// Calendar order of the availability date; unknown dates first.
    Availability,
}

impl SortColumn {
    /// Sorts `records` by this column, ascending unless `descending`.
    pub fn sort(self, records: &mut [UserRecord], descending: bool) {
        records.sort_by(|a, b| {
            let ordering = self.compare(a, b);
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    fn compare(self, a: &UserRecord, b: &UserRecord) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::FirstName => a.first_name.to_lowercase().cmp(&b.first_name.to_lowercase()),
            Self::LastName => a.last_name.to_lowercase().cmp(&b.last_name.to_lowercase()),
            Self::Age => a.age.cmp(&b.age),
            Self::Availability => {
                compare_dates(&a.availability_date, &b.availability_date)
            }
        }
    }
}

/// One page of a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    number: usize,
    size: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Builds a page, normalizing a zero number to `1` and clamping the size.
    pub fn new(number: usize, size: usize) -> Self {
        Self {
            number: number.max(1),
            size: normalize_page_size(size),
        }
    }

    /// 1-based page number.
    pub fn number(&self) -> usize {
        self.number
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the slice of `items` on this page.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.number - 1).saturating_mul(self.size);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.size).min(items.len());
        &items[start..end]
    }

    /// Number of pages needed for `total` items; an empty list has none.
    pub fn count(&self, total: usize) -> usize {
        total.div_ceil(self.size)
    }
}

/// Normalizes a requested page size.
pub fn normalize_page_size(size: usize) -> usize {
    match size {
        0 => DEFAULT_PAGE_SIZE,
        value if value > PAGE_SIZE_MAX => PAGE_SIZE_MAX,
        value => value,
    }
}
