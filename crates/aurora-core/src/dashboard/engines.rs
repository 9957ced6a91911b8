use super::Dashboard;
use aurora_common::{AuroraError, Result, SearchEngine, generate_timestamped_id};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineDraft {
    pub name: String,
    pub base_url: String,
    pub search_url_pattern: String,
}

impl Dashboard {
    pub async fn add_search_engine(&self, draft: EngineDraft) -> Result<SearchEngine> {
        let name = draft.name.trim();
        let base_url = draft.base_url.trim();
        let pattern = draft.search_url_pattern.trim();
        if name.is_empty() || base_url.is_empty() || pattern.is_empty() {
            return Err(AuroraError::validation("名称、网址和搜索地址均不能为空"));
        }

        let engine = SearchEngine {
            id: generate_timestamped_id("se"),
            name: name.to_string(),
            base_url: base_url.to_string(),
            search_url_pattern: pattern.to_string(),
        };
        let created = engine.clone();
        self.mutate_engines(move |engines, _| {
            engines.push(engine);
            Ok(())
        })
        .await?;
        self.log.info(format!("搜索引擎已添加: {}", created.name));
        Ok(created)
    }

    /// Remove an engine; the last one and the active one are protected
    pub async fn delete_search_engine(&self, id: &str) -> Result<()> {
        self.mutate_engines(|engines, settings| {
            if !engines.iter().any(|e| e.id == id) {
                return Err(AuroraError::not_found(format!("search engine {}", id)));
            }
            if engines.len() <= 1 {
                return Err(AuroraError::validation("至少保留一个搜索引擎"));
            }
            if settings.active_search_engine_id == id {
                return Err(AuroraError::validation("无法删除当前使用的搜索引擎"));
            }
            engines.retain(|e| e.id != id);
            Ok(())
        })
        .await
    }

    pub async fn set_active_search_engine(&self, id: &str) -> Result<()> {
        if !self.search_engines().await.iter().any(|e| e.id == id) {
            return Err(AuroraError::not_found(format!("search engine {}", id)));
        }
        self.mutate_settings(|settings| {
            settings.active_search_engine_id = id.to_string();
            Ok(())
        })
        .await
    }

    /// Full search URL for `query` on the active engine
    pub async fn search_url(&self, query: &str) -> Result<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AuroraError::validation("搜索内容不能为空"));
        }

        let inner = self.inner.read().await;
        let engines = &inner.state.search_engines;
        let engine = engines
            .iter()
            .find(|e| e.id == inner.state.settings.active_search_engine_id)
            .or_else(|| engines.first())
            .ok_or_else(|| AuroraError::not_found("search engine"))?;
        Ok(engine.search_url(query))
    }
}
