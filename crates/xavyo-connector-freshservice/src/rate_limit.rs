//! Rate-limit header parsing.
//!
//! Freshservice reports its per-minute quota on every response. The
//! connector never throttles itself; it hands the numbers to the
//! orchestrator as a [`RateLimitDescription`] annotation.

use chrono::{Duration, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use xavyo_connector::annotations::{RateLimitDescription, RateLimitStatus};

pub const HEADER_TOTAL: &str = "X-RateLimit-Total";
pub const HEADER_REMAINING: &str = "X-RateLimit-Remaining";
pub const HEADER_RETRY_AFTER: &str = "Retry-After";

/// Parses a `Retry-After` header in its delay-seconds form.
///
/// HTTP-date values are not used by Freshservice and yield `None`.
#[must_use]
pub fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
}

/// Seconds until the quota resets, from `Retry-After`.
#[must_use]
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(HEADER_RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after)
}

/// Build a rate-limit description from response headers.
///
/// Returns `None` when the response carries no quota headers at all.
#[must_use]
pub fn extract_rate_limit(headers: &HeaderMap, status: StatusCode) -> Option<RateLimitDescription> {
    let limit = header_u64(headers, HEADER_TOTAL);
    let remaining = header_u64(headers, HEADER_REMAINING);
    let retry_after = retry_after_secs(headers);

    if limit.is_none() && remaining.is_none() && retry_after.is_none() {
        return None;
    }

    let remaining = remaining.unwrap_or(0);
    let overlimit = status == StatusCode::TOO_MANY_REQUESTS || (limit.is_some() && remaining == 0);

    Some(RateLimitDescription {
        status: if overlimit {
            RateLimitStatus::Overlimit
        } else {
            RateLimitStatus::Ok
        },
        limit: limit.unwrap_or(0),
        remaining,
        reset_at: retry_after
            .and_then(|secs| i64::try_from(secs).ok())
            .map(|secs| Utc::now() + Duration::seconds(secs)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(parse_retry_after("30"), Some(30));
        assert_eq!(parse_retry_after(" 5 "), Some(5));
        assert_eq!(parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"), None);
    }

    #[test]
    fn test_no_headers_no_description() {
        assert!(extract_rate_limit(&HeaderMap::new(), StatusCode::OK).is_none());
    }

    #[test]
    fn test_quota_headers() {
        let h = headers(&[
            ("x-ratelimit-total", "140"),
            ("x-ratelimit-remaining", "139"),
        ]);
        let desc = extract_rate_limit(&h, StatusCode::OK).unwrap();
        assert_eq!(desc.status, RateLimitStatus::Ok);
        assert_eq!(desc.limit, 140);
        assert_eq!(desc.remaining, 139);
        assert!(desc.reset_at.is_none());
    }

    #[test]
    fn test_throttled_response() {
        let h = headers(&[
            ("x-ratelimit-total", "140"),
            ("x-ratelimit-remaining", "0"),
            ("retry-after", "39"),
        ]);
        let before = Utc::now();
        let desc = extract_rate_limit(&h, StatusCode::TOO_MANY_REQUESTS).unwrap();

        assert_eq!(desc.status, RateLimitStatus::Overlimit);
        let reset = desc.reset_at.unwrap();
        assert!(reset >= before + Duration::seconds(39));
        assert!(reset <= Utc::now() + Duration::seconds(39));
        assert_eq!(retry_after_secs(&h), Some(39));
    }
}
