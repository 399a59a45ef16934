use serde::{Deserialize, Serialize};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 200;

/// Offset/limit query parameters for list endpoints. The limit defaults to
/// 20 and is capped at 200 regardless of what the client asks for.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

/// Paginated list payload: total row count plus the requested slice.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: i64, results: Vec<T>) -> Self {
        Page { count, results }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 20);
    }

    #[test]
    fn limit_is_capped() {
        let p = Pagination {
            offset: Some(40),
            limit: Some(300),
        };
        assert_eq!(p.offset(), 40);
        assert_eq!(p.limit(), 200);
    }

    #[test]
    fn nonsense_values_are_clamped() {
        let p = Pagination {
            offset: Some(-5),
            limit: Some(0),
        };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 1);
    }
}
