use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const MAX_PAGE_SIZE: u64 = 100;

/// 1-indexed page request, as read from `?page=&size=`.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_size")]
    pub size: u64,
}

fn default_page() -> u64 { 1 }
fn default_size() -> u64 { 10 }

impl PaginationParams {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    /// Rejects `page < 1` and sizes outside `1..=100`.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page < 1 {
            return Err(AppError::Validation("page must be at least 1".into()));
        }
        if self.size < 1 || self.size > MAX_PAGE_SIZE {
            return Err(AppError::Validation(format!(
                "size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        Ok(())
    }

    /// Rows to skip. Pages too far out to address clamp to `u64::MAX`, which is
    /// past the end of any result set.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .checked_mul(self.size)
            .unwrap_or(u64::MAX)
    }

    pub fn limit(&self) -> u64 {
        self.size.min(MAX_PAGE_SIZE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: default_page(), size: default_size() }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub size: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let size = params.limit();
        Self {
            items,
            total,
            page: params.page,
            size,
            has_next: params.offset().saturating_add(size) < total,
            has_prev: params.page > 1,
        }
    }
}
