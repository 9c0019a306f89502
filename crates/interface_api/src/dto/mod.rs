//! Request/response data transfer objects

pub mod auth;
pub mod claims;
pub mod payments;
pub mod policies;
pub mod premiums;
pub mod users;

use serde::Deserialize;

/// Common pagination query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

impl Pagination {
    /// Rows per page, clamped to a sane ceiling
    pub fn limit(&self) -> i64 {
        self.per_page.clamp(1, 100)
    }

    /// Rows to skip
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_inputs() {
        let p = Pagination {
            page: 0,
            per_page: 10_000,
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);

        let p = Pagination {
            page: 3,
            per_page: 20,
        };
        assert_eq!(p.offset(), 40);
    }
}
