use serde::Serialize;

/// Page metadata returned with every paginated listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Pagination {
    pub page: u32,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: i64) -> Self {
        Pagination {
            page,
            pages: total_pages(total, limit),
            total,
        }
    }
}

/// Parses a 1-based page number from raw query text. Non-numeric or
/// non-positive input falls back to page 1.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

/// Parses a page size from raw query text, falling back to the endpoint's
/// default when parsing fails or the value is non-positive.
pub fn parse_limit(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|limit| *limit >= 1)
        .unwrap_or(default)
}

pub fn offset(page: u32, limit: u32) -> i64 {
    (page as i64 - 1) * limit as i64
}

pub fn total_pages(total: i64, limit: u32) -> i64 {
    if limit == 0 {
        return 0;
    }
    (total + limit as i64 - 1) / limit as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_to_one() {
        assert_eq!(parse_page(None), 1);
        assert_eq!(parse_page(Some("0")), 1);
        assert_eq!(parse_page(Some("-3")), 1);
        assert_eq!(parse_page(Some("abc")), 1);
        assert_eq!(parse_page(Some("4")), 4);
    }

    #[test]
    fn limit_falls_back_to_endpoint_default() {
        assert_eq!(parse_limit(None, 12), 12);
        assert_eq!(parse_limit(Some("not-a-number"), 10), 10);
        assert_eq!(parse_limit(Some("0"), 10), 10);
        assert_eq!(parse_limit(Some("25"), 12), 25);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        assert_eq!(offset(1, 12), 0);
        assert_eq!(offset(3, 10), 20);
    }

    #[test]
    fn pages_is_ceiling_of_total_over_limit() {
        assert_eq!(total_pages(25, 12), 3);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 10), 1);
    }

    #[test]
    fn page_past_the_end_keeps_accurate_metadata() {
        // 25 records, limit 12, page 9: offset lands past the data but the
        // metadata still reports the true totals.
        let meta = Pagination::new(9, 12, 25);
        assert_eq!(meta, Pagination { page: 9, pages: 3, total: 25 });
        assert_eq!(offset(9, 12), 96);
    }
}
