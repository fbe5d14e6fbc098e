//! Rate limit response headers
//!
//! The gateway is authoritative for the three `X-RateLimit-*` headers: they
//! overwrite anything a handler set.

use actix_web::{
    http::header::{HeaderMap, HeaderName, HeaderValue},
    HttpResponse,
};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::ErrorBody;
use crate::keys::RateLimitDecision;

/// Rate limit headers
pub const RATE_LIMIT_LIMIT: &str = "X-RateLimit-Limit";
pub const RATE_LIMIT_REMAINING: &str = "X-RateLimit-Remaining";
pub const RATE_LIMIT_RESET: &str = "X-RateLimit-Reset";
pub const RETRY_AFTER: &str = "Retry-After";

/// ISO-8601 reset time, e.g. `2024-05-01T12:00:00Z`
pub fn format_reset(reset_at: &DateTime<Utc>) -> String {
    reset_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn set_header(headers: &mut HeaderMap, name: &str, value: String) {
    if let (Ok(name), Ok(val)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
        headers.insert(name, val);
    }
}

/// Write limit, remaining and reset headers
pub fn add_rate_limit_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    set_header(headers, RATE_LIMIT_LIMIT, decision.limit.to_string());
    set_header(headers, RATE_LIMIT_REMAINING, decision.remaining.max(0).to_string());
    set_header(headers, RATE_LIMIT_RESET, format_reset(&decision.reset_at));
}

/// 429 response with quota headers and `Retry-After`
pub fn rate_limit_exceeded_response(
    limit: i32,
    reset_at: DateTime<Utc>,
    message: &str,
) -> HttpResponse {
    let seconds_until_reset = (reset_at - Utc::now()).num_seconds().max(1);

    let mut response = HttpResponse::TooManyRequests().json(ErrorBody::new(message));
    let headers = response.headers_mut();
    add_rate_limit_headers(headers, &RateLimitDecision {
        allowed: false,
        limit,
        remaining: 0,
        reset_at,
    });
    set_header(headers, RETRY_AFTER, seconds_until_reset.to_string());

    response
}
