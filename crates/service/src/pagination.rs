//! Pagination utilities for service layer
//!
//! Page numbers are 1-based and unbounded; arithmetic saturates so that any
//! input produces an offset/limit a SQL driver can bind.

/// Largest value bound as a signed 64-bit SQL parameter.
const SQL_MAX: u64 = i64::MAX as u64;

/// Pagination parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page index; 0 is read as 1
    pub page_number: u64,
    /// items per page; 0 yields an empty page
    pub page_size: u64,
}

impl PageRequest {
    pub fn new(page_number: u64, page_size: u64) -> Self {
        Self { page_number, page_size }
    }

    /// Rows skipped before this page: `(page_number - 1) * page_size`.
    pub fn offset(self) -> u64 {
        self.page_number
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(SQL_MAX)
    }

    pub fn limit(self) -> u64 {
        self.page_size.min(SQL_MAX)
    }
}

impl Default for PageRequest {
    fn default() -> Self { Self { page_number: 1, page_size: 10 } }
}
