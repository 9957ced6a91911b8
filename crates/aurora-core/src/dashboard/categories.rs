use super::{Dashboard, find_category_mut, reject_derived};
use aurora_common::{
    AuroraError, Category, DEFAULT_ICON, DEFAULT_LINK_COLOR, LinkItem, NavigationTarget, Result,
    current_timestamp_millis, ensure_scheme, generate_timestamped_id, normalize_url_loose,
    site_key,
};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const NEW_CATEGORY_TITLE: &str = "新分类";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPatch {
    pub title: Option<String>,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// User input for a new or edited link
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub click_count: Option<u64>,
    pub pros: Option<String>,
    pub cons: Option<String>,
}

impl LinkDraft {
    fn into_link(self, id: String) -> Result<LinkItem> {
        let title = self.title.trim().to_string();
        let url = self.url.trim();
        if title.is_empty() || url.is_empty() {
            return Err(AuroraError::validation("链接标题和地址不能为空"));
        }
        Ok(LinkItem {
            id,
            title,
            url: ensure_scheme(url),
            description: self.description.unwrap_or_default(),
            color: Some(
                self.color
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_LINK_COLOR.to_string()),
            ),
            click_count: Some(self.click_count.unwrap_or(0)),
            pros: self.pros,
            cons: self.cons,
        })
    }
}

fn generated_link_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(char::from)
        .collect();
    format!("gen-{}-{}", current_timestamp_millis(), suffix.to_lowercase())
}

impl Dashboard {
    pub async fn add_category(&self, title: Option<String>) -> Result<Category> {
        let title = title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| NEW_CATEGORY_TITLE.to_string());
        let category = Category {
            id: generate_timestamped_id("cat"),
            title,
            icon: DEFAULT_ICON.to_string(),
            links: Vec::new(),
        };

        let created = category.clone();
        self.mutate_categories(move |categories| {
            categories.push(category);
            Ok(())
        })
        .await?;
        Ok(created)
    }

    pub async fn update_category(&self, id: &str, patch: CategoryPatch) -> Result<Category> {
        self.mutate_categories(|categories| {
            let category = find_category_mut(categories, id)?;
            if let Some(title) = patch.title {
                category.title = title;
            }
            if let Some(icon) = patch.icon {
                category.icon = icon;
            }
            Ok(category.clone())
        })
        .await
    }

    pub async fn delete_category(&self, id: &str) -> Result<()> {
        self.mutate_categories(|categories| {
            let index = categories
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AuroraError::not_found(format!("category {}", id)))?;
            reject_derived(&categories[index])?;
            categories.remove(index);
            Ok(())
        })
        .await
    }

    /// Swap a category with its neighbour; the derived category never moves
    pub async fn move_category(&self, id: &str, direction: MoveDirection) -> Result<()> {
        self.mutate_categories(|categories| {
            let index = categories
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AuroraError::not_found(format!("category {}", id)))?;
            reject_derived(&categories[index])?;

            let target = match direction {
                MoveDirection::Up if index > 1 => index - 1,
                MoveDirection::Down if index + 1 < categories.len() => index + 1,
                _ => return Err(AuroraError::validation("无法继续移动该分类")),
            };
            reject_derived(&categories[target])?;
            categories.swap(index, target);
            Ok(())
        })
        .await
    }

    pub async fn add_link(&self, category_id: &str, draft: LinkDraft) -> Result<LinkItem> {
        let link = draft.into_link(generate_timestamped_id("l"))?;
        let saved = link.clone();
        self.mutate_categories(|categories| {
            find_category_mut(categories, category_id)?.links.push(link);
            Ok(())
        })
        .await?;
        self.log.info(format!("链接已保存: {}", saved.title));
        Ok(saved)
    }

    pub async fn update_link(
        &self,
        category_id: &str,
        link_id: &str,
        draft: LinkDraft,
    ) -> Result<LinkItem> {
        let saved = self
            .mutate_categories(|categories| {
                let category = find_category_mut(categories, category_id)?;
                let existing = category
                    .links
                    .iter_mut()
                    .find(|l| l.id == link_id)
                    .ok_or_else(|| AuroraError::not_found(format!("link {}", link_id)))?;

                let mut draft = draft;
                if draft.click_count.is_none() {
                    draft.click_count = existing.click_count;
                }
                *existing = draft.into_link(link_id.to_string())?;
                Ok(existing.clone())
            })
            .await?;
        self.log.info(format!("链接已保存: {}", saved.title));
        Ok(saved)
    }

    pub async fn delete_link(&self, category_id: &str, link_id: &str) -> Result<()> {
        self.mutate_categories(|categories| {
            let category = find_category_mut(categories, category_id)?;
            let before = category.links.len();
            category.links.retain(|l| l.id != link_id);
            if category.links.len() == before {
                return Err(AuroraError::not_found(format!("link {}", link_id)));
            }
            Ok(())
        })
        .await
    }

    /// Count a navigation to `url` and tell the caller where to go
    pub async fn record_click(&self, url: &str) -> Result<NavigationTarget> {
        if url.trim().is_empty() {
            return Err(AuroraError::validation("链接地址不能为空"));
        }
        let new_tab = self.settings().await.open_in_new_tab;

        self.mutate_categories(|categories| {
            for category in categories.iter_mut().filter(|c| !c.is_recommendations()) {
                for link in category.links.iter_mut().filter(|l| l.url == url) {
                    link.click_count = Some(link.clicks() + 1);
                }
            }
            Ok(())
        })
        .await?;

        Ok(NavigationTarget {
            url: url.to_string(),
            new_tab,
        })
    }

    /// Append already-built links to a category
    pub async fn append_links(&self, category_id: &str, links: Vec<LinkItem>) -> Result<usize> {
        let count = links.len();
        self.mutate_categories(|categories| {
            find_category_mut(categories, category_id)?.links.extend(links);
            Ok(count)
        })
        .await
    }

    /// Ask the AI for new sites in a category and keep the ones that check out
    pub async fn generate_links_for(&self, category_id: &str, count: usize) -> Result<Vec<LinkItem>> {
        let snapshot = self.snapshot().await;
        let category = snapshot
            .categories
            .iter()
            .find(|c| c.id == category_id)
            .ok_or_else(|| AuroraError::not_found(format!("category {}", category_id)))?;
        reject_derived(category)?;

        let mut known: HashSet<String> = snapshot
            .categories
            .iter()
            .flat_map(|c| c.links.iter())
            .map(|l| normalize_url_loose(&l.url))
            .collect();
        let existing_in_category: Vec<String> =
            category.links.iter().map(|l| l.url.clone()).collect();

        let candidates = self
            .ai
            .generate_links(&snapshot.settings, &category.title, count, &existing_in_category)
            .await?;

        let mut accepted = Vec::new();
        for candidate in candidates {
            let (Some(title), Some(url)) = (candidate.title, candidate.url) else {
                continue;
            };
            if title.trim().is_empty() || url.trim().is_empty() {
                continue;
            }
            let key = normalize_url_loose(&url);
            if known.contains(&key) || !self.favicon.is_valid(&url).await {
                continue;
            }
            known.insert(key);
            accepted.push(LinkItem {
                id: generated_link_id(),
                title,
                url,
                description: candidate.description.unwrap_or_default(),
                color: Some(
                    candidate
                        .color
                        .unwrap_or_else(|| DEFAULT_LINK_COLOR.to_string()),
                ),
                click_count: Some(0),
                pros: candidate.pros,
                cons: candidate.cons,
            });
        }

        if accepted.is_empty() {
            return Err(AuroraError::ai("AI 生成未找到有效新链接"));
        }

        self.append_links(category_id, accepted.clone()).await?;
        self.log.info(format!("AI 添加了 {} 个链接", accepted.len()));
        Ok(accepted)
    }

    /// Rename a category and, if it still has the placeholder icon, let the AI pick one
    pub async fn rename_category_with_icon(&self, category_id: &str, title: &str) -> Result<Category> {
        let renamed = self
            .update_category(
                category_id,
                CategoryPatch {
                    title: Some(title.to_string()),
                    icon: None,
                },
            )
            .await?;

        let needs_icon = renamed.icon.is_empty() || renamed.icon == DEFAULT_ICON;
        if title.chars().count() <= 1 || !needs_icon {
            return Ok(renamed);
        }

        let settings = self.settings().await;
        let suggested = self.ai.suggest_icon(&settings, title).await;
        if suggested == DEFAULT_ICON {
            return Ok(renamed);
        }

        let updated = self
            .update_category(
                category_id,
                CategoryPatch {
                    title: None,
                    icon: Some(suggested.clone()),
                },
            )
            .await?;
        self.log.info(format!("AI 自动更新图标: {}", suggested));
        Ok(updated)
    }

    /// Distinct sites across all user categories
    pub async fn unique_site_count(&self) -> usize {
        let inner = self.inner.read().await;
        inner
            .state
            .categories
            .iter()
            .filter(|c| !c.is_recommendations())
            .flat_map(|c| c.links.iter())
            .map(|l| site_key(&l.url))
            .collect::<HashSet<_>>()
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::testing::{harness, harness_with_ai};
    use crate::storage::load_collection;
    use aurora_common::{LogLevel, recommendations, storage_keys};

    fn draft(title: &str, url: &str) -> LinkDraft {
        LinkDraft {
            title: title.to_string(),
            url: url.to_string(),
            ..LinkDraft::default()
        }
    }

    #[tokio::test]
    async fn test_add_category_and_link() {
        let h = harness();
        let category = h.dashboard.add_category(None).await.unwrap();
        assert_eq!(category.title, "新分类");
        assert_eq!(category.icon, "Folder");
        assert!(category.id.starts_with("cat-"));

        let link = h
            .dashboard
            .add_link(&category.id, draft("Crates", "crates.io"))
            .await
            .unwrap();
        assert_eq!(link.url, "https://crates.io");
        assert_eq!(link.color.as_deref(), Some("#666"));
        assert_eq!(link.click_count, Some(0));

        let stored: Vec<Category> = load_collection(&*h.store, storage_keys::CATEGORIES)
            .await
            .unwrap();
        assert_eq!(stored, h.dashboard.categories().await);
        assert!(stored.iter().any(|c| c.links.iter().any(|l| l.id == link.id)));
    }

    #[tokio::test]
    async fn test_link_draft_requires_title_and_url() {
        let h = harness();
        let before = h.dashboard.categories().await;
        let err = h
            .dashboard
            .add_link("dev-1", draft("", "https://a.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuroraError::Validation(_)));
        assert_eq!(h.dashboard.categories().await, before);
    }

    #[tokio::test]
    async fn test_derived_category_rejects_edits() {
        let h = harness();
        let id = recommendations::CATEGORY_ID;
        assert!(matches!(
            h.dashboard.update_category(id, CategoryPatch::default()).await,
            Err(AuroraError::Validation(_))
        ));
        assert!(h.dashboard.add_link(id, draft("x", "https://x.com")).await.is_err());
        assert!(h.dashboard.delete_category(id).await.is_err());
        assert!(matches!(
            h.dashboard.delete_category("missing").await,
            Err(AuroraError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_move_category_bounds() {
        let h = harness();
        // rec-1, dev-1, design-1
        assert!(h.dashboard.move_category("dev-1", MoveDirection::Up).await.is_err());
        assert!(h.dashboard.move_category("design-1", MoveDirection::Down).await.is_err());

        h.dashboard
            .move_category("design-1", MoveDirection::Up)
            .await
            .unwrap();
        let ids: Vec<String> = h.dashboard.categories().await.into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["rec-1", "design-1", "dev-1"]);
    }

    #[tokio::test]
    async fn test_record_click_updates_recommendations() {
        let h = harness();
        let target = h.dashboard.record_click("https://dribbble.com").await.unwrap();
        assert!(target.new_tab);

        for _ in 0..4 {
            h.dashboard.record_click("https://dribbble.com").await.unwrap();
        }
        let categories = h.dashboard.categories().await;
        let design = categories.iter().find(|c| c.id == "design-1").unwrap();
        assert_eq!(design.links[0].click_count, Some(5));

        let derived = &categories[0];
        let ids: Vec<&str> = derived.links.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["rec-l-8", "rec-l-5", "rec-l-6", "rec-l-7"]);
    }

    #[tokio::test]
    async fn test_generate_links_filters_candidates() {
        let reply = r##"[
            {"title": "Dribbble again", "url": "https://Dribbble.com/"},
            {"title": "", "url": "https://untitled.com"},
            {"title": "No url"},
            {"title": "Figma", "url": "https://figma.com", "color": "#F24E1E"},
            {"title": "Figma dupe", "url": "https://figma.com/"},
            {"title": "Broken", "url": "not a url"}
        ]"##;
        let h = harness_with_ai(vec![Ok(reply.to_string())]);

        let added = h.dashboard.generate_links_for("design-1", 4).await.unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].title, "Figma");
        assert!(added[0].id.starts_with("gen-"));

        let design = h
            .dashboard
            .categories()
            .await
            .into_iter()
            .find(|c| c.id == "design-1")
            .unwrap();
        assert_eq!(design.links.len(), 2);
        assert_eq!(h.log.entries()[0].message, "AI 添加了 1 个链接");

        let requests = h.google.requests.lock().unwrap();
        assert!(requests[0].1.prompt.contains("https://dribbble.com"));
    }

    #[tokio::test]
    async fn test_generate_links_with_nothing_new_fails() {
        let h = harness_with_ai(vec![Ok(r#"[{"title": "React", "url": "https://react.dev/"}]"#.to_string())]);
        let before = h.dashboard.categories().await;

        let err = h.dashboard.generate_links_for("dev-1", 2).await.unwrap_err();
        assert_eq!(err.message(), "AI 生成未找到有效新链接");
        assert_eq!(h.dashboard.categories().await, before);
    }

    #[tokio::test]
    async fn test_rename_picks_icon() {
        let h = harness_with_ai(vec![Ok("Gamepad2".to_string()), Ok("Folder".to_string())]);
        let category = h.dashboard.add_category(None).await.unwrap();

        let renamed = h
            .dashboard
            .rename_category_with_icon(&category.id, "游戏")
            .await
            .unwrap();
        assert_eq!(renamed.title, "游戏");
        assert_eq!(renamed.icon, "Gamepad2");
        assert_eq!(h.log.entries_at(LogLevel::Info)[0].message, "AI 自动更新图标: Gamepad2");

        // Already has an icon: no second request
        h.dashboard
            .rename_category_with_icon(&category.id, "电子游戏")
            .await
            .unwrap();
        assert_eq!(h.google.calls(), 1);

        // Single character titles never ask
        let other = h.dashboard.add_category(None).await.unwrap();
        let renamed = h.dashboard.rename_category_with_icon(&other.id, "书").await.unwrap();
        assert_eq!(renamed.icon, "Folder");
        assert_eq!(h.google.calls(), 1);
    }

    #[tokio::test]
    async fn test_unique_site_count() {
        let h = harness();
        assert_eq!(h.dashboard.unique_site_count().await, 4);

        let category = h.dashboard.add_category(None).await.unwrap();
        h.dashboard
            .add_link(&category.id, draft("Dribbble again", "https://dribbble.com/"))
            .await
            .unwrap();
        h.dashboard
            .add_link(&category.id, draft("Shots", "https://dribbble.com/shots"))
            .await
            .unwrap();
        assert_eq!(h.dashboard.unique_site_count().await, 5);
    }
}
