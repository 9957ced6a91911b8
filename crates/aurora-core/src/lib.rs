//! Aurora Core - start page state, persistence and AI helpers
//!
//! This crate provides the core functionality for Aurora, including:
//! - Local-first persistence with pluggable backends
//! - Remote key-value sync (Vercel KV or Cloudflare Workers KV)
//! - The derived "常用推荐" category
//! - AI wrappers for link analysis, generation, greetings and icons
//! - The in-app activity log

pub mod activity;
pub mod ai;
pub mod auth;
pub mod autofill;
pub mod dashboard;
pub mod favicon;
pub mod recommend;
pub mod storage;
pub mod sync;

// Re-export key types for convenience
pub use activity::{ActivityLog, LogEvent};
pub use ai::AiService;
pub use auth::AdminGate;
pub use autofill::{DetectedEngine, DetectedPlatform, detect_search_engine, detect_social_platform};
pub use dashboard::{
    CategoryPatch, Dashboard, EngineDraft, LinkDraft, MoveDirection, SettingsPatch, SocialAction,
    SocialLinkDraft, SyncOutcome, SyncReport,
};
pub use favicon::{AcceptAllProbe, FaviconProbe, HttpFaviconProbe};
pub use recommend::{build_recommendations, refresh_recommendations};
pub use storage::{FileStore, LocalStore, MemoryStore};
pub use sync::{CloudBackend, CloudSync, HttpKvStore, RemoteStore};
