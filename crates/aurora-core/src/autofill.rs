//! Form autofill heuristics for search engines and social links

use aurora_common::ensure_scheme;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEngine {
    pub name: String,
    pub base_url: String,
    pub search_url_pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedPlatform {
    pub platform: String,
    pub icon: String,
}

const KNOWN_ENGINES: &[(&str, &str, &str)] = &[
    ("google", "Google", "https://www.google.com/search?q="),
    ("baidu", "Baidu", "https://www.baidu.com/s?wd="),
    ("bing", "Bing", "https://www.bing.com/search?q="),
    ("duckduckgo", "DuckDuckGo", "https://duckduckgo.com/?q="),
    ("sogou", "Sogou", "https://www.sogou.com/web?query="),
    ("yahoo", "Yahoo", "https://search.yahoo.com/search?p="),
];

const KNOWN_PLATFORMS: &[(&[&str], &str, &str)] = &[
    (&["github"], "GitHub", "Github"),
    (&["twitter", "x.com"], "X (Twitter)", "Twitter"),
    (&["youtube"], "YouTube", "Youtube"),
    (&["linkedin"], "LinkedIn", "Linkedin"),
    (&["instagram"], "Instagram", "Instagram"),
    (&["facebook"], "Facebook", "Facebook"),
    (&["wechat", "weixin"], "WeChat", "MessageCircle"),
    (&["mail"], "Email", "Mail"),
];

fn parse_host(url: &str) -> Option<(Url, String)> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = Url::parse(&ensure_scheme(trimmed)).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    Some((parsed, host))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Guess a search engine's name and query pattern from any URL on its site
pub fn detect_search_engine(url: &str) -> Option<DetectedEngine> {
    let (parsed, host) = parse_host(url)?;
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let origin = parsed.origin().ascii_serialization();

    let (name, pattern) = KNOWN_ENGINES
        .iter()
        .find(|(needle, _, _)| host.contains(needle))
        .map(|(_, name, pattern)| (name.to_string(), pattern.to_string()))
        .unwrap_or_else(|| {
            let label = host.split('.').next().unwrap_or_default();
            (capitalize(label), format!("{}/search?q=", origin))
        });

    Some(DetectedEngine {
        name,
        base_url: origin,
        search_url_pattern: pattern,
    })
}

/// Guess the platform name and icon for a social profile URL
pub fn detect_social_platform(url: &str) -> Option<DetectedPlatform> {
    let (_, host) = parse_host(url)?;

    let (platform, icon) = KNOWN_PLATFORMS
        .iter()
        .find(|(needles, _, _)| needles.iter().any(|n| host.contains(n)))
        .map(|(_, platform, icon)| (platform.to_string(), icon.to_string()))
        .unwrap_or_else(|| (String::new(), "Link".to_string()));

    Some(DetectedPlatform { platform, icon })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_engines() {
        let ddg = detect_search_engine("duckduckgo.com").unwrap();
        assert_eq!(ddg.name, "DuckDuckGo");
        assert_eq!(ddg.base_url, "https://duckduckgo.com");
        assert_eq!(ddg.search_url_pattern, "https://duckduckgo.com/?q=");

        let baidu = detect_search_engine("https://www.baidu.com/s?wd=rust").unwrap();
        assert_eq!(baidu.name, "Baidu");
        assert_eq!(baidu.base_url, "https://www.baidu.com");
    }

    #[test]
    fn test_unknown_engine_fallback() {
        let engine = detect_search_engine("https://www.kagi.com/whatever").unwrap();
        assert_eq!(engine.name, "Kagi");
        assert_eq!(engine.search_url_pattern, "https://www.kagi.com/search?q=");
        assert!(detect_search_engine("   ").is_none());
    }

    #[test]
    fn test_social_platforms() {
        let x = detect_social_platform("https://x.com/someone").unwrap();
        assert_eq!(x.platform, "X (Twitter)");
        assert_eq!(x.icon, "Twitter");

        let wechat = detect_social_platform("weixin.qq.com/abc").unwrap();
        assert_eq!(wechat.icon, "MessageCircle");

        let other = detect_social_platform("https://blog.example.org").unwrap();
        assert_eq!(other.platform, "");
        assert_eq!(other.icon, "Link");
    }
}
