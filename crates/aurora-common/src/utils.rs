//! Common utility functions used across Aurora components

use chrono::{Local, Utc};
use url::Url;
use uuid::Uuid;

/// Generate a short ID for display purposes (8 characters)
pub fn generate_short_id() -> String {
    Uuid::new_v4().to_string()[..8].to_string()
}

/// Generate a `<prefix>-<millis>-<suffix>` ID, the shape used for links, categories and engines
pub fn generate_timestamped_id(prefix: &str) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}-{}", prefix, current_timestamp_millis(), &suffix[..5])
}

/// Get current UTC timestamp as milliseconds
pub fn current_timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Local wall-clock time as `HH:MM:SS`
pub fn local_time_string() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

/// De-duplication key for links: trimmed, one trailing slash removed
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    trimmed.strip_suffix('/').unwrap_or(trimmed).to_string()
}

/// Case-insensitive key used when screening generated links
pub fn normalize_url_loose(url: &str) -> String {
    let lowered = url.to_lowercase();
    lowered.strip_suffix('/').unwrap_or(&lowered).to_string()
}

/// Prepend `https://` to anything that does not already look like an http(s) URL
pub fn ensure_scheme(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Host name of a URL, if it parses and has one
pub fn hostname(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .filter(|h| !h.is_empty())
}

/// `host + path` with one trailing slash removed; the raw URL when unparsable
pub fn site_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => {
            let path = parsed.path();
            format!(
                "{}{}",
                parsed.host_str().unwrap_or_default(),
                path.strip_suffix('/').unwrap_or(path)
            )
        }
        _ => url.to_string(),
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ids() {
        let short_id = generate_short_id();
        assert_eq!(short_id.len(), 8);

        let timestamped = generate_timestamped_id("cat");
        let parts: Vec<&str> = timestamped.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "cat");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 5);
        assert_ne!(timestamped, generate_timestamped_id("cat"));
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url(" https://github.com/ "), "https://github.com");
        assert_eq!(normalize_url("https://github.com//"), "https://github.com/");
        assert_eq!(normalize_url("https://github.com"), "https://github.com");
        assert_eq!(normalize_url_loose("https://GitHub.com/"), "https://github.com");
    }

    #[test]
    fn test_ensure_scheme() {
        assert_eq!(ensure_scheme("example.com"), "https://example.com");
        assert_eq!(ensure_scheme("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_site_key() {
        assert_eq!(site_key("https://github.com/"), "github.com");
        assert_eq!(site_key("https://github.com/rust-lang/"), "github.com/rust-lang");
        assert_eq!(site_key("not a url"), "not a url");
        assert_eq!(hostname("https://www.bing.com/x").as_deref(), Some("www.bing.com"));
        assert_eq!(hostname("nope"), None);
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("云端同步失败", 2), "云端");
        assert_eq!(truncate_chars("ok", 10), "ok");
    }
}
