use time::{
    OffsetDateTime, PrimitiveDateTime,
    format_description::well_known::{Iso8601, Rfc3339},
};

use crate::ApiClient;

impl ApiClient {
    /// Browser-usable URL of a backend asset (generated image, template preview).
    ///
    /// Absolute `http(s)` URLs are returned untouched. Relative paths are resolved against the
    /// base URL; `version` (epoch milliseconds or an ISO 8601 timestamp) is appended as `?v=`
    /// so a regenerated image isn't served from cache. Unparsable versions are dropped.
    pub fn asset_url(&self, path: &str, version: Option<&str>) -> String {
        let path = path.trim();
        if path.is_empty() {
            return String::new();
        }
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        let base = self.base_url().as_str().trim_end_matches('/');
        let mut url = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };

        if let Some(v) = version.and_then(cache_version) {
            url.push_str(&format!("?v={v}"));
        }
        url
    }
}

/// Epoch milliseconds of a version stamp.
///
/// Timestamps without an offset are taken as UTC.
pub fn cache_version(stamp: &str) -> Option<i64> {
    let stamp = stamp.trim();
    if stamp.is_empty() {
        return None;
    }
    if let Ok(ms) = stamp.parse::<i64>() {
        return Some(ms);
    }

    let at = OffsetDateTime::parse(stamp, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(stamp, &Iso8601::DEFAULT))
        .or_else(|_| PrimitiveDateTime::parse(stamp, &Iso8601::DEFAULT).map(|p| p.assume_utc()))
        .ok()?;
    i64::try_from(at.unix_timestamp_nanos() / 1_000_000).ok()
}
