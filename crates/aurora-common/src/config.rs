//! Configuration types and utilities for Aurora
//!
//! Secrets and remote-store credentials are read once at startup. Nothing
//! here is persisted; the admin panel only ever sees slot names.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::constants::env_vars;

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Environment-provided secrets: admin password, default AI key and the
/// named credential slots a provider config can point at.
#[derive(Debug, Clone, Default)]
pub struct EnvSecrets {
    admin_password: Option<String>,
    slots: HashMap<String, String>,
}

impl EnvSecrets {
    /// Read secrets from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read secrets through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut secrets = Self {
            admin_password: non_empty(lookup(env_vars::ADMIN_PASSWORD)),
            slots: HashMap::new(),
        };
        for slot in std::iter::once(env_vars::DEFAULT_API_KEY).chain(env_vars::CUSTOM_API_KEY_SLOTS)
        {
            if let Some(value) = non_empty(lookup(slot)) {
                secrets.slots.insert(slot.to_string(), value);
            }
        }
        secrets
    }

    pub fn with_admin_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = non_empty(Some(password.into()));
        self
    }

    pub fn with_slot(mut self, slot: &str, value: impl Into<String>) -> Self {
        if let Some(value) = non_empty(Some(value.into())) {
            self.slots.insert(slot.to_string(), value);
        }
        self
    }

    pub fn admin_password(&self) -> Option<&str> {
        self.admin_password.as_deref()
    }

    /// Value of a known credential slot; unknown or empty slots yield `None`
    pub fn slot(&self, name: &str) -> Option<&str> {
        self.slots.get(name).map(String::as_str)
    }

    /// The default AI credential (`API_KEY`)
    pub fn default_api_key(&self) -> Option<&str> {
        self.slot(env_vars::DEFAULT_API_KEY)
    }

    /// Names of the slots that currently hold a value
    pub fn configured_slots(&self) -> Vec<String> {
        let mut names: Vec<String> = self.slots.keys().cloned().collect();
        names.sort();
        names
    }
}

/// Vercel KV (Upstash REST) connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VercelKvCredentials {
    pub url: String,
    pub token: String,
}

/// Cloudflare Workers KV connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudflareKvCredentials {
    pub account_id: String,
    pub namespace_id: String,
    pub api_token: String,
}

/// Remote key-value credentials; each set is present only when complete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvCredentials {
    pub vercel: Option<VercelKvCredentials>,
    pub cloudflare: Option<CloudflareKvCredentials>,
}

impl KvCredentials {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let vercel = match (
            non_empty(lookup(env_vars::KV_REST_API_URL)),
            non_empty(lookup(env_vars::KV_REST_API_TOKEN)),
        ) {
            (Some(url), Some(token)) => Some(VercelKvCredentials { url, token }),
            _ => None,
        };

        let cloudflare = match (
            non_empty(lookup(env_vars::CF_ACCOUNT_ID)),
            non_empty(lookup(env_vars::CF_NAMESPACE_ID)),
            non_empty(lookup(env_vars::CF_API_TOKEN)),
        ) {
            (Some(account_id), Some(namespace_id), Some(api_token)) => {
                Some(CloudflareKvCredentials {
                    account_id,
                    namespace_id,
                    api_token,
                })
            }
            _ => None,
        };

        Self { vercel, cloudflare }
    }

    pub fn is_configured(&self) -> bool {
        self.vercel.is_some() || self.cloudflare.is_some()
    }
}

/// Everything the server needs at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub secrets: EnvSecrets,
    pub kv: KvCredentials,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            secrets: EnvSecrets::default(),
            kv: KvCredentials::default(),
        }
    }
}

impl AppConfig {
    /// Build a config for `data_dir` with secrets taken from the environment
    pub fn from_env(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            secrets: EnvSecrets::from_env(),
            kv: KvCredentials::from_env(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_secrets_ignore_empty_and_unknown_slots() {
        let secrets = EnvSecrets::from_lookup(lookup_from(&[
            ("API_KEY", "  "),
            ("CUSTOM_API_KEY_2", "sk-env"),
            ("SOMETHING_ELSE", "nope"),
        ]));

        assert_eq!(secrets.default_api_key(), None);
        assert_eq!(secrets.slot("CUSTOM_API_KEY_2"), Some("sk-env"));
        assert_eq!(secrets.slot("SOMETHING_ELSE"), None);
        assert_eq!(secrets.admin_password(), None);
        assert_eq!(secrets.configured_slots(), vec!["CUSTOM_API_KEY_2".to_string()]);
    }

    #[test]
    fn test_kv_credentials_require_full_sets() {
        let partial = KvCredentials::from_lookup(lookup_from(&[
            ("KV_REST_API_URL", "https://kv.example.com"),
            ("CF_ACCOUNT_ID", "acct"),
            ("CF_API_TOKEN", "token"),
        ]));
        assert!(!partial.is_configured());

        let both = KvCredentials::from_lookup(lookup_from(&[
            ("KV_REST_API_URL", "https://kv.example.com"),
            ("KV_REST_API_TOKEN", "vtoken"),
            ("CF_ACCOUNT_ID", "acct"),
            ("CF_NAMESPACE_ID", "ns"),
            ("CF_API_TOKEN", "ctoken"),
        ]));
        assert!(both.vercel.is_some());
        assert!(both.cloudflare.is_some());
    }
}
