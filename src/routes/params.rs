use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

/// Pagination plus the free-text `search` filter the list endpoints share.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub search: Option<String>,
}

impl SearchQuery {
    /// `ILIKE` pattern for the search term, or None when the filter is off.
    pub fn like_pattern(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{s}%"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_clamps_bounds() {
        let p = Pagination {
            page: Some(0),
            per_page: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100, 0));
    }

    #[test]
    fn blank_search_is_no_filter() {
        let q = SearchQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            search: Some("   ".into()),
        };
        assert_eq!(q.like_pattern(), None);
    }

    #[test]
    fn search_becomes_ilike_pattern() {
        let q = SearchQuery {
            pagination: Pagination {
                page: None,
                per_page: None,
            },
            search: Some("shampoo".into()),
        };
        assert_eq!(q.like_pattern().as_deref(), Some("%shampoo%"));
    }
}
