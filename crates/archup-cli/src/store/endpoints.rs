//! API endpoint URL builders
//!
//! Archive names contain '/', so they are percent-encoded into a single path
//! segment.

/// Build archive collection URL
pub fn archives_url(base_url: &str) -> String {
    format!("{}/api/v1/archives", base_url.trim_end_matches('/'))
}

/// Build single archive URL
pub fn archive_url(base_url: &str, name: &str) -> String {
    format!("{}/{}", archives_url(base_url), urlencoding::encode(name))
}

/// Build archive tags URL
pub fn archive_tags_url(base_url: &str, name: &str) -> String {
    format!("{}/tags", archive_url(base_url, name))
}

/// Build archive versions URL
pub fn archive_versions_url(base_url: &str, name: &str) -> String {
    format!("{}/versions", archive_url(base_url, name))
}
