use super::Dashboard;
use aurora_common::defaults::new_ai_provider;
use aurora_common::{
    AiProviderConfig, AppSettings, AuroraError, BackgroundMode, ConnectionTestResult,
    GREETING_TTL_MILLIS, LinkAnalysis, LogoMode, Result, SocialLink, Theme,
    current_timestamp_millis, env_vars, generate_timestamped_id, storage_keys,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Shallow patch of the plain settings fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsPatch {
    pub app_name: Option<String>,
    pub app_icon: Option<String>,
    pub logo_mode: Option<LogoMode>,
    pub custom_logo_url: Option<String>,
    pub user_name: Option<String>,
    pub theme: Option<Theme>,
    pub open_in_new_tab: Option<bool>,
    pub card_opacity: Option<u32>,
    pub background_mode: Option<BackgroundMode>,
    pub custom_background_image: Option<String>,
    pub background_blur: Option<u32>,
    pub background_mask_opacity: Option<u32>,
    pub enable_ai_greeting: Option<bool>,
    pub footer_html: Option<String>,
}

impl SettingsPatch {
    fn apply(self, settings: &mut AppSettings) {
        if let Some(v) = self.app_name {
            settings.app_name = v;
        }
        if let Some(v) = self.app_icon {
            settings.app_icon = v;
        }
        if let Some(v) = self.logo_mode {
            settings.logo_mode = v;
        }
        if let Some(v) = self.custom_logo_url {
            settings.custom_logo_url = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = self.user_name {
            settings.user_name = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = self.theme {
            settings.theme = v;
        }
        if let Some(v) = self.open_in_new_tab {
            settings.open_in_new_tab = v;
        }
        if let Some(v) = self.card_opacity {
            settings.card_opacity = v.min(100);
        }
        if let Some(v) = self.background_mode {
            settings.background_mode = v;
        }
        if let Some(v) = self.custom_background_image {
            settings.custom_background_image = Some(v).filter(|s| !s.is_empty());
        }
        if let Some(v) = self.background_blur {
            settings.background_blur = v;
        }
        if let Some(v) = self.background_mask_opacity {
            settings.background_mask_opacity = v.min(100);
        }
        if let Some(v) = self.enable_ai_greeting {
            settings.enable_ai_greeting = v;
        }
        if let Some(v) = self.footer_html {
            settings.footer_html = Some(v).filter(|s| !s.is_empty());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SocialLinkDraft {
    pub platform: String,
    pub url: String,
    pub icon: Option<String>,
    pub qr_code: Option<String>,
}

/// What clicking a social link does
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum SocialAction {
    #[serde(rename_all = "camelCase")]
    Navigate { url: String, new_tab: bool },
    #[serde(rename_all = "camelCase")]
    ShowQr { qr_code: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedGreeting {
    text: String,
    expiry: i64,
}

fn is_known_slot(slot: &str) -> bool {
    slot == env_vars::DEFAULT_API_KEY || env_vars::CUSTOM_API_KEY_SLOTS.contains(&slot)
}

fn find_provider_mut<'a>(
    settings: &'a mut AppSettings,
    id: &str,
) -> Result<&'a mut AiProviderConfig> {
    settings
        .ai_configs
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| AuroraError::not_found(format!("AI provider {}", id)))
}

impl Dashboard {
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<AppSettings> {
        self.mutate_settings(|settings| {
            patch.apply(settings);
            Ok(settings.clone())
        })
        .await
    }

    /// light -> dark -> system -> light
    pub async fn cycle_theme(&self) -> Result<Theme> {
        self.mutate_settings(|settings| {
            settings.theme = settings.theme.next();
            Ok(settings.theme)
        })
        .await
    }

    pub async fn add_ai_provider(&self) -> Result<AiProviderConfig> {
        let config = new_ai_provider(generate_timestamped_id("ai"));
        let created = config.clone();
        self.mutate_settings(move |settings| {
            settings.ai_configs.push(config);
            Ok(())
        })
        .await?;
        Ok(created)
    }

    /// Save an edited provider; an env slot and a manual key are mutually exclusive
    pub async fn update_ai_provider(&self, mut config: AiProviderConfig) -> Result<AiProviderConfig> {
        config.env_slot = config
            .env_slot
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        match &config.env_slot {
            Some(slot) if !is_known_slot(slot) => {
                return Err(AuroraError::validation(format!("未知的环境变量: {}", slot)));
            }
            Some(_) => config.api_key.clear(),
            None => {}
        }

        self.mutate_settings(|settings| {
            let existing = find_provider_mut(settings, &config.id)?;
            config.is_active = existing.is_active;
            *existing = config;
            Ok(existing.clone())
        })
        .await
    }

    pub async fn delete_ai_provider(&self, id: &str) -> Result<()> {
        self.mutate_settings(|settings| {
            find_provider_mut(settings, id)?;
            settings.ai_configs.retain(|c| c.id != id);
            Ok(())
        })
        .await
    }

    /// Flag one provider active and clear every other flag
    pub async fn set_active_ai_provider(&self, id: &str) -> Result<()> {
        self.mutate_settings(|settings| {
            find_provider_mut(settings, id)?;
            for config in settings.ai_configs.iter_mut() {
                config.is_active = config.id == id;
            }
            Ok(())
        })
        .await
    }

    async fn provider(&self, id: &str) -> Result<AiProviderConfig> {
        self.settings()
            .await
            .ai_configs
            .into_iter()
            .find(|c| c.id == id)
            .ok_or_else(|| AuroraError::not_found(format!("AI provider {}", id)))
    }

    pub async fn test_ai_provider(&self, id: &str) -> Result<ConnectionTestResult> {
        let config = self.provider(id).await?;
        Ok(self.ai.test_connection(&config).await)
    }

    pub async fn list_models(&self, id: &str) -> Result<Vec<String>> {
        let config = self.provider(id).await?;
        Ok(self.ai.list_models(&config))
    }

    pub async fn analyze_url(&self, url: &str) -> Result<LinkAnalysis> {
        if url.trim().is_empty() {
            return Err(AuroraError::validation("链接地址不能为空"));
        }
        let settings = self.settings().await;
        self.ai.analyze_url(&settings, url.trim()).await
    }

    /// Let the AI pick the app icon from the app name
    pub async fn suggest_app_icon(&self) -> Result<String> {
        let settings = self.settings().await;
        if settings.app_name.trim().is_empty() {
            return Err(AuroraError::validation("应用名称不能为空"));
        }
        let icon = self.ai.suggest_icon(&settings, &settings.app_name).await;

        let applied = icon.clone();
        self.mutate_settings(move |settings| {
            settings.app_icon = applied;
            Ok(())
        })
        .await?;
        self.log.info(format!("AI 推荐图标: {}", icon));
        Ok(icon)
    }

    pub async fn add_social_link(&self, draft: SocialLinkDraft) -> Result<SocialLink> {
        let platform = draft.platform.trim();
        let url = draft.url.trim();
        if platform.is_empty() || url.is_empty() {
            return Err(AuroraError::validation("平台名称和链接不能为空"));
        }
        let link = SocialLink {
            id: generate_timestamped_id("sl"),
            platform: platform.to_string(),
            url: url.to_string(),
            icon: draft
                .icon
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| "Link".to_string()),
            qr_code: draft.qr_code.filter(|q| !q.trim().is_empty()),
        };

        let created = link.clone();
        self.mutate_settings(move |settings| {
            settings.social_links.push(link);
            Ok(())
        })
        .await?;
        Ok(created)
    }

    pub async fn delete_social_link(&self, id: &str) -> Result<()> {
        self.mutate_settings(|settings| {
            let before = settings.social_links.len();
            settings.social_links.retain(|l| l.id != id);
            if settings.social_links.len() == before {
                return Err(AuroraError::not_found(format!("social link {}", id)));
            }
            Ok(())
        })
        .await
    }

    pub async fn social_action(&self, id: &str) -> Result<SocialAction> {
        let settings = self.settings().await;
        let link = settings
            .social_links
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| AuroraError::not_found(format!("social link {}", id)))?;

        Ok(match &link.qr_code {
            Some(qr_code) => SocialAction::ShowQr {
                qr_code: qr_code.clone(),
            },
            None => SocialAction::Navigate {
                url: link.url.clone(),
                new_tab: settings.open_in_new_tab,
            },
        })
    }

    /// Greeting line, cached for a few hours; empty when disabled or unavailable
    pub async fn greeting(&self) -> String {
        let settings = self.settings().await;
        if !settings.enable_ai_greeting {
            return String::new();
        }

        let now = current_timestamp_millis();
        if let Ok(Some(value)) = self.store.load(storage_keys::GREETING).await {
            if let Ok(cached) = serde_json::from_value::<CachedGreeting>(value) {
                if now < cached.expiry {
                    return cached.text;
                }
            }
        }

        let text = self.ai.greeting(&settings).await;
        if !text.is_empty() {
            let cached = CachedGreeting {
                text: text.clone(),
                expiry: now + GREETING_TTL_MILLIS,
            };
            match serde_json::to_value(&cached) {
                Ok(value) => {
                    if let Err(e) = self.store.save(storage_keys::GREETING, &value).await {
                        debug!("Failed to cache greeting: {}", e);
                    }
                }
                Err(e) => debug!("Failed to serialize greeting: {}", e),
            }
        }
        text
    }
}
