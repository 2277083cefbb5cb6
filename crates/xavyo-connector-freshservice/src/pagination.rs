//! Page-number pagination.
//!
//! Freshservice pages with `page` / `per_page` query parameters and signals
//! the next page through a `Link: <...?page=N>; rel="next"` header. There is
//! no total count.

use xavyo_connector::error::{ConnectorError, ConnectorResult};
use xavyo_connector::pagination::Bag;

/// Largest `per_page` the API accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Page request for a list call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: MAX_PAGE_SIZE,
        }
    }
}

impl PageOptions {
    /// Page 0 becomes 1; page size is clamped with [`clamp_page_size`].
    #[must_use]
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: clamp_page_size(per_page),
        }
    }

    /// Options for the page a sync token points at.
    pub fn from_token(token: &str, per_page: u32) -> ConnectorResult<Self> {
        Ok(Self::new(parse_page(token)?, per_page))
    }

    pub(crate) fn query(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("per_page", self.per_page.to_string()),
        ]
    }
}

/// Zero and anything above [`MAX_PAGE_SIZE`] become [`MAX_PAGE_SIZE`].
#[must_use]
pub fn clamp_page_size(size: u32) -> u32 {
    if size == 0 || size > MAX_PAGE_SIZE {
        MAX_PAGE_SIZE
    } else {
        size
    }
}

/// Page number stored in a page-state token; empty means the first page.
pub fn parse_page(token: &str) -> ConnectorResult<u32> {
    if token.is_empty() {
        return Ok(1);
    }
    token
        .parse::<u32>()
        .map_err(|_| ConnectorError::InvalidPageToken {
            message: format!("expected a page number, got '{token}'"),
        })
}

/// Next page number from a `Link` header, if it has a `rel="next"` entry.
#[must_use]
pub fn next_page_from_link(header: &str) -> Option<u32> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts
            .next()?
            .trim()
            .trim_start_matches('<')
            .trim_end_matches('>');
        let is_next = parts.any(|param| {
            let param = param.trim();
            param
                .strip_prefix("rel=")
                .map(|rel| rel.trim_matches('"') == "next")
                .unwrap_or(false)
        });
        if !is_next {
            return None;
        }

        let url = url::Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
    })
}

/// Vendor page the bag's current state points at.
pub(crate) fn current_page(bag: &Bag, per_page: u32) -> ConnectorResult<PageOptions> {
    let token = bag.current().map(|s| s.token.as_str()).unwrap_or_default();
    PageOptions::from_token(token, per_page)
}

/// Move the bag on to `next_page`, popping the state when there is none,
/// and encode it as the next sync token.
pub(crate) fn advance(mut bag: Bag, next_page: Option<u32>) -> ConnectorResult<String> {
    let next = next_page.map(|p| p.to_string()).unwrap_or_default();
    bag.next(&next);
    bag.marshal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_page_size() {
        assert_eq!(clamp_page_size(0), 100);
        assert_eq!(clamp_page_size(1), 1);
        assert_eq!(clamp_page_size(100), 100);
        assert_eq!(clamp_page_size(150), 100);
    }

    #[test]
    fn test_page_options_normalize() {
        let opts = PageOptions::new(0, 150);
        assert_eq!(opts, PageOptions { page: 1, per_page: 100 });
        assert_eq!(PageOptions::default(), PageOptions::new(1, 0));
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("").unwrap(), 1);
        assert_eq!(parse_page("7").unwrap(), 7);
        let err = parse_page("seven").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PAGE_TOKEN");
    }

    #[test]
    fn test_next_page_from_link() {
        let link = r#"<https://acme.freshservice.com/api/v2/agents?per_page=100&page=3>; rel="next""#;
        assert_eq!(next_page_from_link(link), Some(3));
    }

    #[test]
    fn test_link_without_next() {
        let link = r#"<https://acme.freshservice.com/api/v2/agents?page=1>; rel="prev""#;
        assert_eq!(next_page_from_link(link), None);
        assert_eq!(next_page_from_link(""), None);
    }

    #[test]
    fn test_link_with_several_relations() {
        let link = concat!(
            r#"<https://acme.freshservice.com/api/v2/groups?page=1>; rel="prev", "#,
            r#"<https://acme.freshservice.com/api/v2/groups?page=3>; rel=next"#
        );
        assert_eq!(next_page_from_link(link), Some(3));
    }

    #[test]
    fn test_bag_walk() {
        let bag = Bag::resume("", "agent").unwrap();
        assert_eq!(current_page(&bag, 0).unwrap(), PageOptions::new(1, 100));

        let token = advance(bag, Some(2)).unwrap();
        let bag = Bag::resume(&token, "agent").unwrap();
        assert_eq!(current_page(&bag, 25).unwrap(), PageOptions::new(2, 25));

        assert_eq!(advance(bag, None).unwrap(), "");
    }
}
