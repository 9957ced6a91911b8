//! Data model shared by storage, sync and the HTTP API
//!
//! Every record serializes with camelCase keys so the stored JSON matches
//! what browser clients already keep in local storage.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::recommendations;

/// Treat an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn social_links_or_default<'de, D>(deserializer: D) -> Result<Vec<SocialLink>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SocialLink>>::deserialize(deserializer)?
        .unwrap_or_else(crate::defaults::default_social_links))
}

/// A single bookmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Hex brand color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub click_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pros: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cons: Option<String>,
}

impl LinkItem {
    pub fn clicks(&self) -> u64 {
        self.click_count.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub title: String,
    /// Lucide icon name
    pub icon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<LinkItem>,
}

impl Category {
    /// Whether this is the derived "common recommendations" category
    pub fn is_recommendations(&self) -> bool {
        self.id == recommendations::CATEGORY_ID
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEngine {
    pub id: String,
    pub name: String,
    /// Site origin, used for the favicon
    pub base_url: String,
    /// Prefix the encoded query is appended to, e.g. `https://www.google.com/search?q=`
    pub search_url_pattern: String,
}

impl SearchEngine {
    pub fn search_url(&self, query: &str) -> String {
        format!("{}{}", self.search_url_pattern, urlencoding::encode(query))
    }
}

/// Which transport an AI provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Gemini generate-content API
    Google,
    /// Any OpenAI-compatible chat completions endpoint
    OpenAi,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Google => write!(f, "google"),
            ProviderKind::OpenAi => write!(f, "openai"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiProviderConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub base_url: String,
    /// Manually entered key
    #[serde(default, deserialize_with = "null_as_default")]
    pub api_key: String,
    /// Environment credential slot, e.g. `CUSTOM_API_KEY_1`; preferred over `api_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_slot: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLink {
    pub id: String,
    /// Display name
    pub platform: String,
    pub url: String,
    pub icon: String,
    /// Image URL or data URL; clicking shows the code instead of navigating
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    /// light -> dark -> system -> light
    pub fn next(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoMode {
    Icon,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundMode {
    Aurora,
    Monotone,
    Custom,
}

/// Application settings
///
/// Missing fields are filled from [`AppSettings::default`], which is the
/// only reconciliation applied to settings written by older versions. A
/// stored field that no longer parses also falls back to its default
/// without discarding the rest of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", default, rename_all = "camelCase")]
pub struct AppSettings {
    // Identity
    pub app_name: String,
    pub app_icon: String,
    pub logo_mode: LogoMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_logo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    // Behavior
    pub theme: Theme,
    pub open_in_new_tab: bool,
    pub active_search_engine_id: String,

    // AI
    #[serde(deserialize_with = "null_as_default")]
    pub ai_configs: Vec<AiProviderConfig>,

    // Appearance
    pub card_opacity: u32,
    pub background_mode: BackgroundMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_background_image: Option<String>,
    pub background_blur: u32,
    pub background_mask_opacity: u32,
    pub enable_ai_greeting: bool,

    // Content
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_html: Option<String>,
    #[serde(deserialize_with = "social_links_or_default")]
    pub social_links: Vec<SocialLink>,
}

impl Serialize for AppSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        AppSettings::serialize(self, serializer)
    }
}

impl<'de> Deserialize<'de> for AppSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let incoming = Map::<String, Value>::deserialize(deserializer)?;

        let mut settings = AppSettings::default();
        let mut accepted = match serde_json::to_value(&settings) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        // Overlay one stored field at a time; a field that fails keeps the default
        for (key, value) in incoming {
            let mut trial = accepted.clone();
            trial.insert(key, value);
            if let Ok(parsed) = AppSettings::deserialize(Value::Object(trial.clone())) {
                settings = parsed;
                accepted = trial;
            }
        }
        Ok(settings)
    }
}

impl AppSettings {
    /// The provider flagged active, else the first one configured
    pub fn active_ai_config(&self) -> Option<&AiProviderConfig> {
        self.ai_configs
            .iter()
            .find(|c| c.is_active)
            .or_else(|| self.ai_configs.first())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// One line of the in-app diagnostics log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    /// Local wall-clock time, `HH:MM:SS`
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// What the model returns when asked to describe a URL
///
/// Only a JSON object with a non-empty `title` is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalysis {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_url_pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<String>,
}

#[derive(Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct LinkAnalysisFields {
    #[serde(deserialize_with = "null_as_default")]
    title: String,
    #[serde(deserialize_with = "null_as_default")]
    description: String,
    category_suggestion: Option<String>,
    brand_color: Option<String>,
    search_url_pattern: Option<String>,
    pros: Option<String>,
    cons: Option<String>,
}

impl<'de> Deserialize<'de> for LinkAnalysis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        let fields = LinkAnalysisFields::deserialize(Value::Object(map)).map_err(D::Error::custom)?;
        if fields.title.trim().is_empty() {
            return Err(D::Error::custom("link analysis without a title"));
        }
        Ok(LinkAnalysis {
            title: fields.title,
            description: fields.description,
            category_suggestion: fields.category_suggestion,
            brand_color: fields.brand_color,
            search_url_pattern: fields.search_url_pattern,
            pros: fields.pros,
            cons: fields.cons,
        })
    }
}

/// A link candidate produced by generation, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedLink {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub pros: Option<String>,
    pub cons: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionTestResult {
    pub success: bool,
    pub message: String,
}

/// Where a click should take the browser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationTarget {
    pub url: String,
    pub new_tab: bool,
}

/// All three collections at once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub categories: Vec<Category>,
    pub settings: AppSettings,
    pub search_engines: Vec<SearchEngine>,
}
