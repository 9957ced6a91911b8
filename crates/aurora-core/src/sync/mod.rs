//! Remote key-value synchronization
//!
//! The remote store mirrors the three local collections under the same
//! keys. Which backend is used is decided once from the environment; the
//! rest of the crate only ever talks to [`CloudSync`], which turns every
//! remote failure into a log entry and "no data".

mod http_kv;

pub use http_kv::HttpKvStore;

use crate::activity::ActivityLog;
use async_trait::async_trait;
use aurora_common::{
    CloudflareKvCredentials, KvCredentials, Result, SYNC_ERROR_MAX_CHARS, VercelKvCredentials,
    truncate_chars,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// The remote backend selected at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudBackend {
    Cloudflare(CloudflareKvCredentials),
    Vercel(VercelKvCredentials),
    Disabled,
}

impl CloudBackend {
    /// Cloudflare takes precedence whenever its credentials are complete
    pub fn from_credentials(kv: &KvCredentials) -> Self {
        if let Some(cf) = &kv.cloudflare {
            CloudBackend::Cloudflare(cf.clone())
        } else if let Some(vercel) = &kv.vercel {
            CloudBackend::Vercel(vercel.clone())
        } else {
            CloudBackend::Disabled
        }
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self, CloudBackend::Disabled)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CloudBackend::Cloudflare(_) => "cloudflare",
            CloudBackend::Vercel(_) => "vercel",
            CloudBackend::Disabled => "disabled",
        }
    }
}

/// A remote key-value store holding JSON values
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    async fn set(&self, key: &str, value: &Value) -> Result<()>;

    fn name(&self) -> &str;
}

/// Fault-tolerant facade over an optional remote store
#[derive(Clone)]
pub struct CloudSync {
    remote: Option<Arc<dyn RemoteStore>>,
    log: ActivityLog,
}

impl CloudSync {
    /// Sync that never talks to anything
    pub fn disabled(log: ActivityLog) -> Self {
        Self { remote: None, log }
    }

    pub fn new(remote: Arc<dyn RemoteStore>, log: ActivityLog) -> Self {
        Self {
            remote: Some(remote),
            log,
        }
    }

    pub fn from_backend(backend: &CloudBackend, log: ActivityLog) -> Result<Self> {
        match HttpKvStore::from_backend(backend)? {
            Some(store) => Ok(Self::new(Arc::new(store), log)),
            None => Ok(Self::disabled(log)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.remote.is_some()
    }

    fn report(&self, err: &aurora_common::AuroraError) {
        let message = truncate_chars(&err.message(), SYNC_ERROR_MAX_CHARS);
        self.log.error(format!("KV Sync Exception: {}", message));
    }

    /// Read a key; any failure is logged once and reported as "nothing there"
    pub async fn fetch(&self, key: &str) -> Option<Value> {
        let remote = self.remote.as_ref()?;
        match remote.get(key).await {
            Ok(value) => {
                debug!("Fetched {} from {} (present: {})", key, remote.name(), value.is_some());
                value
            }
            Err(e) => {
                self.report(&e);
                None
            }
        }
    }

    /// Write a key; failures are logged, never returned
    pub async fn push(&self, key: &str, value: &Value) {
        let Some(remote) = self.remote.as_ref() else {
            return;
        };
        match remote.set(key, value).await {
            Ok(()) => debug!("Pushed {} to {}", key, remote.name()),
            Err(e) => self.report(&e),
        }
    }

    /// Fire-and-forget variant of [`CloudSync::push`]
    pub fn push_detached(&self, key: &str, value: Value) {
        if !self.is_configured() {
            return;
        }
        let sync = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            sync.push(&key, &value).await;
        });
    }
}
