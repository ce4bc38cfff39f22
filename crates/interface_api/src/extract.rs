//! Request extraction helpers

use axum::http::HeaderMap;
use tracing::warn;

use core_kernel::Timezone;

/// Header carrying the caller's IANA timezone name
pub const TIMEZONE_HEADER: &str = "x-timezone";

/// Resolves the caller's timezone from the `x-timezone` header.
///
/// An absent or unparseable header falls back to the default timezone with
/// a warning rather than failing the request; date arithmetic must always
/// have a zone to work in.
pub fn timezone_from_headers(headers: &HeaderMap) -> Timezone {
    match headers.get(TIMEZONE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(name) => match name.parse::<Timezone>() {
            Ok(tz) => tz,
            Err(_) => {
                warn!(timezone = name, "unrecognized timezone header, using default");
                Timezone::default()
            }
        },
        None => Timezone::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_valid_header_is_used() {
        let mut headers = HeaderMap::new();
        headers.insert(TIMEZONE_HEADER, HeaderValue::from_static("America/Chicago"));
        let tz = timezone_from_headers(&headers);
        assert_eq!(tz.0, chrono_tz::America::Chicago);
    }

    #[test]
    fn test_missing_header_falls_back_to_default() {
        let tz = timezone_from_headers(&HeaderMap::new());
        assert_eq!(tz, Timezone::default());
    }

    #[test]
    fn test_garbage_header_falls_back_to_default() {
        let mut headers = HeaderMap::new();
        headers.insert(TIMEZONE_HEADER, HeaderValue::from_static("Mars/Olympus"));
        let tz = timezone_from_headers(&headers);
        assert_eq!(tz, Timezone::default());
    }
}
