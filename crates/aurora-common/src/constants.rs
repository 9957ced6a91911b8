//! Common constants used across Aurora

/// Fixed keys shared by the local store and the remote key-value store
pub mod storage_keys {
    pub const CATEGORIES: &str = "aurora_data_v1";
    pub const SETTINGS: &str = "aurora_settings_v1";
    pub const SEARCH_ENGINES: &str = "aurora_engines_v1";
    pub const GREETING: &str = "aurora_greeting_v7";
}

/// The derived "common recommendations" category
pub mod recommendations {
    pub const CATEGORY_ID: &str = "rec-1";
    pub const CATEGORY_TITLE: &str = "常用推荐";
    pub const CATEGORY_ICON: &str = "Flame";
    pub const LINK_ID_PREFIX: &str = "rec-";
    pub const MAX_LINKS: usize = 8;
}

/// Activity log ring buffer capacity
pub const MAX_LOG_ENTRIES: usize = 100;

/// Longest error message kept from a failed cloud sync call
pub const SYNC_ERROR_MAX_CHARS: usize = 150;

/// Icon used when nothing better is known
pub const DEFAULT_ICON: &str = "Folder";

/// Fallback color for links without a brand color
pub const DEFAULT_LINK_COLOR: &str = "#666";

/// How many excluded URLs are quoted in a link generation prompt
pub const MAX_EXCLUDED_URLS: usize = 10;

/// Greeting cache lifetime (4 hours)
pub const GREETING_TTL_MILLIS: i64 = 4 * 60 * 60 * 1000;

/// Common model identifiers
pub mod models {
    pub const GEMINI_2_5_FLASH: &str = "gemini-2.5-flash";
    pub const GEMINI_3_PRO_PREVIEW: &str = "gemini-3-pro-preview";
    pub const GPT_4O: &str = "gpt-4o";
    pub const GPT_3_5_TURBO: &str = "gpt-3.5-turbo";
    pub const LONGCAT_FLASH: &str = "longcat-flash";
}

/// Environment variable names read at startup
pub mod env_vars {
    pub const ADMIN_PASSWORD: &str = "ADMIN_PASSWORD";
    pub const DEFAULT_API_KEY: &str = "API_KEY";
    pub const CUSTOM_API_KEY_SLOTS: [&str; 5] = [
        "CUSTOM_API_KEY_1",
        "CUSTOM_API_KEY_2",
        "CUSTOM_API_KEY_3",
        "CUSTOM_API_KEY_4",
        "CUSTOM_API_KEY_5",
    ];
    pub const KV_REST_API_URL: &str = "KV_REST_API_URL";
    pub const KV_REST_API_TOKEN: &str = "KV_REST_API_TOKEN";
    pub const CF_ACCOUNT_ID: &str = "CF_ACCOUNT_ID";
    pub const CF_NAMESPACE_ID: &str = "CF_NAMESPACE_ID";
    pub const CF_API_TOKEN: &str = "CF_API_TOKEN";
}

/// Remote endpoints
pub mod endpoints {
    pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";
    pub const FAVICON_SERVICE: &str = "https://www.google.com/s2/favicons";
}

/// Default timeout values in seconds
pub mod timeouts {
    pub const DEFAULT_HTTP_TIMEOUT: u64 = 30;
    pub const DEFAULT_LLM_TIMEOUT: u64 = 120;
    pub const FAVICON_PROBE_TIMEOUT: u64 = 3;
}
