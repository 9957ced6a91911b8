//! Dashboard state manager
//!
//! Owns the three collections (categories, settings, search engines) in
//! memory. Every mutation is applied to memory, written to the local store
//! and pushed to the cloud in the background. Category mutations always
//! end by rebuilding the derived recommendations category.
//!
//! Startup is local-first: [`Dashboard::load_local`] makes the state usable
//! immediately, then [`Dashboard::sync_from_cloud`] overwrites whatever the
//! remote store holds. A collection edited locally while that sync is in
//! flight keeps the local edit.

mod categories;
mod engines;
mod settings;

pub use categories::{CategoryPatch, LinkDraft, MoveDirection};
pub use engines::EngineDraft;
pub use settings::{SettingsPatch, SocialAction, SocialLinkDraft};

use crate::activity::ActivityLog;
use crate::ai::AiService;
use crate::favicon::FaviconProbe;
use crate::recommend::refresh_recommendations;
use crate::storage::{LocalStore, load_collection};
use crate::sync::CloudSync;
use aurora_common::defaults::{initial_categories, initial_search_engines};
use aurora_common::{
    AppSettings, AuroraError, Category, DashboardSnapshot, Result, SearchEngine, storage_keys,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// The three collections
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub categories: Vec<Category>,
    pub settings: AppSettings,
    pub search_engines: Vec<SearchEngine>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            categories: refresh_recommendations(initial_categories()),
            settings: AppSettings::default(),
            search_engines: initial_search_engines(),
        }
    }
}

/// Per-collection counters bumped on every local change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Revisions {
    categories: u64,
    settings: u64,
    search_engines: u64,
}

#[derive(Debug, Default)]
struct Inner {
    state: DashboardState,
    revisions: Revisions,
}

/// What happened to one collection during a cloud sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOutcome {
    /// Remote value replaced the local one
    Applied,
    /// Remote had nothing usable
    Absent,
    /// Remote value arrived after a local edit and was dropped
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub categories: SyncOutcome,
    pub settings: SyncOutcome,
    pub search_engines: SyncOutcome,
}

impl SyncReport {
    fn absent() -> Self {
        Self {
            categories: SyncOutcome::Absent,
            settings: SyncOutcome::Absent,
            search_engines: SyncOutcome::Absent,
        }
    }
}

pub struct Dashboard {
    inner: RwLock<Inner>,
    store: Arc<dyn LocalStore>,
    cloud: CloudSync,
    ai: Arc<AiService>,
    favicon: Arc<dyn FaviconProbe>,
    log: ActivityLog,
}

fn typed<T: DeserializeOwned>(key: &str, value: Option<Value>) -> Option<T> {
    let value = value?;
    match serde_json::from_value(value) {
        Ok(typed) => Some(typed),
        Err(e) => {
            debug!("Ignoring malformed remote value for {}: {}", key, e);
            None
        }
    }
}

impl Dashboard {
    pub fn new(
        store: Arc<dyn LocalStore>,
        cloud: CloudSync,
        ai: Arc<AiService>,
        favicon: Arc<dyn FaviconProbe>,
        log: ActivityLog,
    ) -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
            store,
            cloud,
            ai,
            favicon,
            log,
        }
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn ai(&self) -> &AiService {
        &self.ai
    }

    pub fn is_cloud_configured(&self) -> bool {
        self.cloud.is_configured()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.read().await;
        DashboardSnapshot {
            categories: inner.state.categories.clone(),
            settings: inner.state.settings.clone(),
            search_engines: inner.state.search_engines.clone(),
        }
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.inner.read().await.state.categories.clone()
    }

    pub async fn settings(&self) -> AppSettings {
        self.inner.read().await.state.settings.clone()
    }

    pub async fn search_engines(&self) -> Vec<SearchEngine> {
        self.inner.read().await.state.search_engines.clone()
    }

    /// Replace the in-memory state with whatever the local store holds
    pub async fn load_local(&self) {
        let categories: Option<Vec<Category>> =
            load_collection(self.store.as_ref(), storage_keys::CATEGORIES).await;
        let settings: Option<AppSettings> =
            load_collection(self.store.as_ref(), storage_keys::SETTINGS).await;
        let engines: Option<Vec<SearchEngine>> =
            load_collection(self.store.as_ref(), storage_keys::SEARCH_ENGINES).await;

        {
            let mut inner = self.inner.write().await;
            inner.state.categories =
                refresh_recommendations(categories.unwrap_or_else(initial_categories));
            if let Some(settings) = settings {
                inner.state.settings = settings;
            }
            if let Some(engines) = engines.filter(|e| !e.is_empty()) {
                inner.state.search_engines = engines;
            }
        }
        self.log.info("本地数据加载完成");
    }

    /// Pull all three collections from the cloud and apply what is there
    pub async fn sync_from_cloud(&self) -> SyncReport {
        if !self.cloud.is_configured() {
            return SyncReport::absent();
        }

        let started = self.inner.read().await.revisions;
        let (categories, settings, engines) = tokio::join!(
            self.cloud.fetch(storage_keys::CATEGORIES),
            self.cloud.fetch(storage_keys::SETTINGS),
            self.cloud.fetch(storage_keys::SEARCH_ENGINES),
        );

        let categories: Option<Vec<Category>> =
            typed(storage_keys::CATEGORIES, categories.filter(Value::is_array));
        let settings: Option<AppSettings> =
            typed(storage_keys::SETTINGS, settings.filter(Value::is_object));
        let engines: Option<Vec<SearchEngine>> =
            typed(storage_keys::SEARCH_ENGINES, engines.filter(Value::is_array))
                .filter(|e: &Vec<SearchEngine>| !e.is_empty());

        let mut report = SyncReport::absent();
        let mut inner = self.inner.write().await;

        if let Some(categories) = categories {
            if inner.revisions.categories == started.categories {
                let categories = refresh_recommendations(categories);
                self.save_local(storage_keys::CATEGORIES, &categories).await;
                inner.state.categories = categories;
                inner.revisions.categories += 1;
                report.categories = SyncOutcome::Applied;
            } else {
                report.categories = SyncOutcome::Discarded;
            }
        }

        if let Some(settings) = settings {
            if inner.revisions.settings == started.settings {
                self.save_local(storage_keys::SETTINGS, &settings).await;
                inner.state.settings = settings;
                inner.revisions.settings += 1;
                report.settings = SyncOutcome::Applied;
            } else {
                report.settings = SyncOutcome::Discarded;
            }
        }

        if let Some(engines) = engines {
            if inner.revisions.search_engines == started.search_engines {
                self.save_local(storage_keys::SEARCH_ENGINES, &engines).await;
                inner.state.search_engines = engines;
                inner.revisions.search_engines += 1;
                report.search_engines = SyncOutcome::Applied;
            } else {
                report.search_engines = SyncOutcome::Discarded;
            }
        }
        drop(inner);

        let discarded = [
            (report.categories, "分类"),
            (report.settings, "设置"),
            (report.search_engines, "搜索引擎"),
        ];
        for (_, name) in discarded.iter().filter(|(o, _)| *o == SyncOutcome::Discarded) {
            self.log
                .warn(format!("云端{}数据已忽略: 同步期间本地已修改", name));
        }
        if [report.categories, report.settings, report.search_engines].contains(&SyncOutcome::Applied) {
            self.log.info("云端同步成功");
        }
        report
    }

    /// Run [`Dashboard::sync_from_cloud`] in the background
    pub fn spawn_cloud_sync(self: &Arc<Self>) -> Option<JoinHandle<SyncReport>> {
        if !self.cloud.is_configured() {
            return None;
        }
        let dashboard = Arc::clone(self);
        Some(tokio::spawn(async move { dashboard.sync_from_cloud().await }))
    }

    async fn save_local<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) -> Option<Value> {
        let value = match serde_json::to_value(value) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize {}: {}", key, e);
                return None;
            }
        };
        if let Err(e) = self.store.save(key, &value).await {
            self.log.error(format!("本地保存失败 ({}): {}", key, e.message()));
        }
        Some(value)
    }

    /// Write locally (awaited) and to the cloud (detached)
    async fn persist<T: Serialize + ?Sized + Sync>(&self, key: &str, value: &T) {
        if let Some(value) = self.save_local(key, value).await {
            self.cloud.push_detached(key, value);
        }
    }

    /// Apply `f` to a copy of the categories; nothing changes if it fails
    async fn mutate_categories<R>(
        &self,
        f: impl FnOnce(&mut Vec<Category>) -> Result<R>,
    ) -> Result<R> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.categories.clone();
        let result = f(&mut next)?;
        let next = refresh_recommendations(next);
        self.persist(storage_keys::CATEGORIES, &next).await;
        inner.state.categories = next;
        inner.revisions.categories += 1;
        Ok(result)
    }

    async fn mutate_settings<R>(&self, f: impl FnOnce(&mut AppSettings) -> Result<R>) -> Result<R> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.settings.clone();
        let result = f(&mut next)?;
        self.persist(storage_keys::SETTINGS, &next).await;
        inner.state.settings = next;
        inner.revisions.settings += 1;
        Ok(result)
    }

    /// Engines and settings together, for guards that span both
    async fn mutate_engines<R>(
        &self,
        f: impl FnOnce(&mut Vec<SearchEngine>, &AppSettings) -> Result<R>,
    ) -> Result<R> {
        let mut inner = self.inner.write().await;
        let mut next = inner.state.search_engines.clone();
        let result = f(&mut next, &inner.state.settings)?;
        self.persist(storage_keys::SEARCH_ENGINES, &next).await;
        inner.state.search_engines = next;
        inner.revisions.search_engines += 1;
        Ok(result)
    }
}

fn reject_derived(category: &Category) -> Result<()> {
    if category.is_recommendations() {
        Err(AuroraError::validation("常用推荐分类由系统自动生成，不能手动修改"))
    } else {
        Ok(())
    }
}

fn find_category_mut<'a>(categories: &'a mut [Category], id: &str) -> Result<&'a mut Category> {
    let category = categories
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| AuroraError::not_found(format!("category {}", id)))?;
    reject_derived(category)?;
    Ok(category)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ai::testing::ScriptedTransport;
    use crate::favicon::AcceptAllProbe;
    use crate::storage::MemoryStore;
    use aurora_common::EnvSecrets;

    pub struct Harness {
        pub dashboard: Arc<Dashboard>,
        pub store: Arc<MemoryStore>,
        pub log: ActivityLog,
        pub google: Arc<ScriptedTransport>,
    }

    pub fn harness_with(
        store: Arc<MemoryStore>,
        cloud: Option<Arc<dyn crate::sync::RemoteStore>>,
        secrets: EnvSecrets,
        replies: Vec<Result<String>>,
    ) -> Harness {
        let log = ActivityLog::default();
        let google = ScriptedTransport::replying(replies);
        let ai = AiService::with_transports(
            secrets,
            log.clone(),
            google.clone(),
            ScriptedTransport::replying(vec![]),
        );
        let cloud = match cloud {
            Some(remote) => CloudSync::new(remote, log.clone()),
            None => CloudSync::disabled(log.clone()),
        };
        let dashboard = Dashboard::new(
            store.clone(),
            cloud,
            Arc::new(ai),
            Arc::new(AcceptAllProbe),
            log.clone(),
        );
        Harness {
            dashboard: Arc::new(dashboard),
            store,
            log,
            google,
        }
    }

    pub fn harness() -> Harness {
        harness_with(Arc::new(MemoryStore::new()), None, EnvSecrets::default(), vec![])
    }

    /// Gemini configured through `API_KEY`, answering with `replies`
    pub fn harness_with_ai(replies: Vec<Result<String>>) -> Harness {
        harness_with(
            Arc::new(MemoryStore::new()),
            None,
            EnvSecrets::default().with_slot("API_KEY", "g-key"),
            replies,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::storage::{MemoryStore, save_collection};
    use crate::sync::RemoteStore;
    use async_trait::async_trait;
    use aurora_common::{EnvSecrets, LogLevel, Theme};
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::sync::{Semaphore, mpsc};

    fn categories_named(prefix: &str) -> Vec<Category> {
        vec![Category {
            id: format!("{}-cat", prefix),
            title: prefix.to_string(),
            icon: "Folder".to_string(),
            links: vec![aurora_common::LinkItem {
                id: format!("{}-l", prefix),
                title: prefix.to_string(),
                url: format!("https://{}.example.com", prefix),
                description: String::new(),
                color: None,
                click_count: Some(1),
                pros: None,
                cons: None,
            }],
        }]
    }

    /// Remote serving fixed values, failing for the keys listed in `failing`
    struct FixedRemote {
        values: HashMap<String, Value>,
        failing: Vec<String>,
    }

    #[async_trait]
    impl RemoteStore for FixedRemote {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            if self.failing.iter().any(|k| k == key) {
                return Err(AuroraError::sync("connection reset"));
            }
            Ok(self.values.get(key).cloned())
        }

        async fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    /// Remote whose category read blocks until the test lets it go
    struct GatedRemote {
        started: mpsc::UnboundedSender<()>,
        gate: Arc<Semaphore>,
        categories: Value,
    }

    #[async_trait]
    impl RemoteStore for GatedRemote {
        async fn get(&self, key: &str) -> Result<Option<Value>> {
            if key != storage_keys::CATEGORIES {
                return Ok(None);
            }
            let _ = self.started.send(());
            let _permit = self.gate.acquire().await;
            Ok(Some(self.categories.clone()))
        }

        async fn set(&self, _key: &str, _value: &Value) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "gated"
        }
    }

    #[tokio::test]
    async fn test_load_local_falls_back_to_defaults() {
        let h = harness();
        save_collection(&*h.store, storage_keys::SETTINGS, &json!({"appName": "Mine"}))
            .await
            .unwrap();
        save_collection(&*h.store, storage_keys::SEARCH_ENGINES, &json!([]))
            .await
            .unwrap();
        save_collection(&*h.store, storage_keys::CATEGORIES, &json!("garbage"))
            .await
            .unwrap();

        h.dashboard.load_local().await;
        let snapshot = h.dashboard.snapshot().await;

        assert_eq!(snapshot.settings.app_name, "Mine");
        assert_eq!(snapshot.settings.theme, Theme::System);
        assert_eq!(snapshot.search_engines.len(), 3);
        assert_eq!(snapshot.categories, refresh_recommendations(initial_categories()));
        assert_eq!(h.log.entries()[0].message, "本地数据加载完成");
    }

    #[tokio::test]
    async fn test_cloud_overwrites_local() {
        let store = Arc::new(MemoryStore::new());
        let local = categories_named("local");
        save_collection(&*store, storage_keys::CATEGORIES, &local)
            .await
            .unwrap();

        let cloud = categories_named("cloud");
        let remote = FixedRemote {
            values: HashMap::from([(
                storage_keys::CATEGORIES.to_string(),
                serde_json::to_value(&cloud).unwrap(),
            )]),
            failing: vec![],
        };
        let h = harness_with(store, Some(Arc::new(remote)), EnvSecrets::default(), vec![]);

        h.dashboard.load_local().await;
        let report = h.dashboard.sync_from_cloud().await;
        assert_eq!(report.categories, SyncOutcome::Applied);
        assert_eq!(report.settings, SyncOutcome::Absent);

        let expected = refresh_recommendations(cloud);
        assert_eq!(h.dashboard.categories().await, expected);
        let stored: Option<Vec<Category>> =
            load_collection(&*h.store, storage_keys::CATEGORIES).await;
        assert_eq!(stored, Some(expected));
        assert_eq!(h.log.entries()[0].message, "云端同步成功");
    }

    #[tokio::test]
    async fn test_cloud_failure_keeps_local() {
        let store = Arc::new(MemoryStore::new());
        let local = categories_named("local");
        save_collection(&*store, storage_keys::CATEGORIES, &local)
            .await
            .unwrap();
        let remote = FixedRemote {
            values: HashMap::new(),
            failing: vec![storage_keys::CATEGORIES.to_string()],
        };
        let h = harness_with(store, Some(Arc::new(remote)), EnvSecrets::default(), vec![]);

        h.dashboard.load_local().await;
        let report = h.dashboard.sync_from_cloud().await;

        assert_eq!(report, SyncReport::absent());
        assert_eq!(h.dashboard.categories().await, refresh_recommendations(local));
        let errors = h.log.entries_at(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "KV Sync Exception: connection reset");
    }

    #[tokio::test]
    async fn test_malformed_cloud_values_are_ignored() {
        let remote = FixedRemote {
            values: HashMap::from([
                (storage_keys::CATEGORIES.to_string(), json!({"not": "a list"})),
                (storage_keys::SETTINGS.to_string(), json!(["not", "an object"])),
                (storage_keys::SEARCH_ENGINES.to_string(), json!([])),
            ]),
            failing: vec![],
        };
        let h = harness_with(
            Arc::new(MemoryStore::new()),
            Some(Arc::new(remote)),
            EnvSecrets::default(),
            vec![],
        );
        h.dashboard.load_local().await;
        let before = h.dashboard.snapshot().await;

        assert_eq!(h.dashboard.sync_from_cloud().await, SyncReport::absent());
        assert_eq!(h.dashboard.snapshot().await, before);
    }

    #[tokio::test]
    async fn test_local_edit_during_sync_wins() {
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let gate = Arc::new(Semaphore::new(0));
        let remote = GatedRemote {
            started: started_tx,
            gate: gate.clone(),
            categories: serde_json::to_value(categories_named("cloud")).unwrap(),
        };
        let h = harness_with(
            Arc::new(MemoryStore::new()),
            Some(Arc::new(remote)),
            EnvSecrets::default(),
            vec![],
        );
        h.dashboard.load_local().await;

        let sync = h.dashboard.spawn_cloud_sync().unwrap();
        started_rx.recv().await.unwrap();

        let added = h
            .dashboard
            .add_category(Some("本地新增".to_string()))
            .await
            .unwrap();
        gate.add_permits(1);
        let report = sync.await.unwrap();

        assert_eq!(report.categories, SyncOutcome::Discarded);
        let categories = h.dashboard.categories().await;
        assert!(categories.iter().any(|c| c.id == added.id));
        assert!(!categories.iter().any(|c| c.id == "cloud-cat"));

        let stored: Vec<Category> = load_collection(&*h.store, storage_keys::CATEGORIES)
            .await
            .unwrap();
        assert!(stored.iter().any(|c| c.id == added.id));
        assert_eq!(h.log.entries_at(LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_cloud_does_nothing() {
        let h = harness();
        assert!(h.dashboard.spawn_cloud_sync().is_none());
        assert_eq!(h.dashboard.sync_from_cloud().await, SyncReport::absent());
    }
}
