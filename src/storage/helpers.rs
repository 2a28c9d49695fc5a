//! Shared storage helper functions.
//!
//! Search and paging arithmetic used by both the SQL backends and the
//! in-memory store so they agree on edge cases.

use crate::interfaces::ITEMS_PER_PAGE;

/// Row offset of a 1-based page. Pages below 1 are treated as page 1.
pub fn page_offset(page: u64) -> u64 {
    page.max(1).saturating_sub(1) * ITEMS_PER_PAGE
}

/// Number of pages needed to show `count` rows.
pub fn total_pages(count: u64) -> u64 {
    count.div_ceil(ITEMS_PER_PAGE)
}

/// Trim a slice fetched with `limit + 1` rows down to `limit` and compute
/// the cursor of the following slice. `None` once the final slice has been
/// returned.
pub fn split_page<T>(mut rows: Vec<T>, offset: u64, limit: u64) -> (Vec<T>, Option<u64>) {
    if rows.len() as u64 > limit {
        rows.truncate(limit as usize);
        (rows, Some(offset + limit))
    } else {
        (rows, None)
    }
}

/// Sum of invoice amounts, `None` on `i64` overflow.
pub fn checked_total(amounts: impl IntoIterator<Item = i64>) -> Option<i64> {
    amounts.into_iter().try_fold(0i64, i64::checked_add)
}

/// Case-insensitive literal substring test, the in-memory counterpart of
/// `SqlDatabase::contains_ci`.
pub fn matches_ci(haystack: &str, query: &str) -> bool {
    haystack.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offset_clamps_to_first_page() {
        assert_eq!(page_offset(0), 0);
        assert_eq!(page_offset(1), 0);
        assert_eq!(page_offset(3), 12);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(6), 1);
        assert_eq!(total_pages(7), 2);
        assert_eq!(total_pages(13), 3);
    }

    #[test]
    fn test_split_page() {
        let (rows, next) = split_page((0..11).collect::<Vec<_>>(), 0, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(next, Some(10));

        let (rows, next) = split_page((0..10).collect::<Vec<_>>(), 20, 10);
        assert_eq!(rows.len(), 10);
        assert_eq!(next, None);
    }

    #[test]
    fn test_checked_total() {
        assert_eq!(checked_total([1, 2, 3]), Some(6));
        assert_eq!(checked_total([]), Some(0));
        assert_eq!(checked_total([i64::MAX, 1]), None);
    }

    #[test]
    fn test_matches_ci() {
        assert!(matches_ci("Delba de Oliveira", "OLIV"));
        assert!(!matches_ci("Lee Robinson", "delba"));
    }
}
