//! Out-of-the-box data used when nothing has been stored yet

use crate::constants::{models, recommendations};
use crate::types::{
    AiProviderConfig, AppSettings, BackgroundMode, Category, LinkItem, LogoMode, ProviderKind,
    SearchEngine, SocialLink, Theme,
};

fn engine(id: &str, name: &str, base_url: &str, pattern: &str) -> SearchEngine {
    SearchEngine {
        id: id.to_string(),
        name: name.to_string(),
        base_url: base_url.to_string(),
        search_url_pattern: pattern.to_string(),
    }
}

pub fn initial_search_engines() -> Vec<SearchEngine> {
    vec![
        engine(
            "se-google",
            "Google",
            "https://www.google.com",
            "https://www.google.com/search?q=",
        ),
        engine(
            "se-baidu",
            "Baidu",
            "https://www.baidu.com",
            "https://www.baidu.com/s?wd=",
        ),
        engine(
            "se-bing",
            "Bing",
            "https://www.bing.com",
            "https://www.bing.com/search?q=",
        ),
    ]
}

pub fn default_ai_configs() -> Vec<AiProviderConfig> {
    vec![
        AiProviderConfig {
            id: "ai-google-env".to_string(),
            name: "Google Gemini (Env)".to_string(),
            kind: ProviderKind::Google,
            base_url: String::new(),
            // Empty: falls back to the API_KEY environment credential
            api_key: String::new(),
            env_slot: None,
            model: models::GEMINI_2_5_FLASH.to_string(),
            is_active: true,
        },
        AiProviderConfig {
            id: "ai-longcat".to_string(),
            name: "美团龙猫 (Longcat)".to_string(),
            kind: ProviderKind::OpenAi,
            base_url: "https://api.longcat.chat/openai".to_string(),
            api_key: String::new(),
            env_slot: None,
            model: models::LONGCAT_FLASH.to_string(),
            is_active: false,
        },
    ]
}

/// Template for a provider added from the admin panel
pub fn new_ai_provider(id: String) -> AiProviderConfig {
    AiProviderConfig {
        id,
        name: "New Provider".to_string(),
        kind: ProviderKind::OpenAi,
        base_url: "https://api.openai.com/v1".to_string(),
        api_key: String::new(),
        env_slot: None,
        model: models::GPT_3_5_TURBO.to_string(),
        is_active: false,
    }
}

/// Provider used when settings list none at all
pub fn fallback_ai_config() -> AiProviderConfig {
    AiProviderConfig {
        id: "default".to_string(),
        name: "Default".to_string(),
        kind: ProviderKind::Google,
        base_url: String::new(),
        api_key: String::new(),
        env_slot: None,
        model: models::GEMINI_2_5_FLASH.to_string(),
        is_active: true,
    }
}

pub fn default_social_links() -> Vec<SocialLink> {
    vec![
        SocialLink {
            id: "sl-1".to_string(),
            platform: "GitHub".to_string(),
            url: "https://github.com".to_string(),
            icon: "Github".to_string(),
            qr_code: None,
        },
        SocialLink {
            id: "sl-2".to_string(),
            platform: "Email".to_string(),
            url: "mailto:hello@example.com".to_string(),
            icon: "Mail".to_string(),
            qr_code: None,
        },
    ]
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_name: "Aurora Pro".to_string(),
            app_icon: "Zap".to_string(),
            logo_mode: LogoMode::Icon,
            custom_logo_url: None,
            user_name: None,
            theme: Theme::System,
            open_in_new_tab: true,
            active_search_engine_id: "se-google".to_string(),
            ai_configs: default_ai_configs(),
            card_opacity: 80,
            background_mode: BackgroundMode::Aurora,
            custom_background_image: None,
            background_blur: 0,
            background_mask_opacity: 0,
            enable_ai_greeting: true,
            footer_html: Some("© 2024 Aurora Pro Navigation. Designed for Geeks.".to_string()),
            social_links: default_social_links(),
        }
    }
}

fn link(id: &str, title: &str, url: &str, description: &str, color: &str, clicks: u64) -> LinkItem {
    LinkItem {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        description: description.to_string(),
        color: Some(color.to_string()),
        click_count: Some(clicks),
        pros: None,
        cons: None,
    }
}

fn with_notes(mut item: LinkItem, pros: &str, cons: &str) -> LinkItem {
    item.pros = Some(pros.to_string());
    item.cons = Some(cons.to_string());
    item
}

pub fn initial_categories() -> Vec<Category> {
    vec![
        Category {
            id: recommendations::CATEGORY_ID.to_string(),
            title: recommendations::CATEGORY_TITLE.to_string(),
            icon: recommendations::CATEGORY_ICON.to_string(),
            links: vec![
                with_notes(
                    link("l-1", "GitHub", "https://github.com", "代码托管平台", "#181717", 10),
                    "开源社区",
                    "门槛较高",
                ),
                with_notes(
                    link("l-2", "ChatGPT", "https://chat.openai.com", "AI 助手", "#10A37F", 8),
                    "智能强大",
                    "需魔法",
                ),
                with_notes(
                    link("l-3", "Vercel", "https://vercel.com", "前端部署神器", "#000000", 6),
                    "免费额度",
                    "国内稍慢",
                ),
                with_notes(
                    link("l-4", "YouTube", "https://youtube.com", "视频娱乐", "#FF0000", 5),
                    "内容丰富",
                    "广告多",
                ),
            ],
        },
        Category {
            id: "dev-1".to_string(),
            title: "开发工具".to_string(),
            icon: "Laptop".to_string(),
            links: vec![
                link("l-5", "Stack Overflow", "https://stackoverflow.com", "技术问答", "#F48024", 2),
                link("l-6", "Tailwind CSS", "https://tailwindcss.com", "原子化 CSS 框架", "#38B2AC", 1),
                link("l-7", "React Docs", "https://react.dev", "React 官方文档", "#61DAFB", 0),
            ],
        },
        Category {
            id: "design-1".to_string(),
            title: "设计灵感".to_string(),
            icon: "Palette".to_string(),
            links: vec![link(
                "l-8",
                "Dribbble",
                "https://dribbble.com",
                "设计作品分享",
                "#EA4C89",
                0,
            )],
        },
    ]
}
