//! Record store adapter.
//!
//! `SchoolStore` picks a backend once at startup and exposes list/insert/delete
//! by collection name. Backend failures never escape as errors: every call
//! returns an [`Outcome`] carrying either the result or a safe fallback plus
//! the warning to show the user.

use crate::adapters::{LocalStore, RemoteStore};
use crate::config::RemoteConfig;
use crate::domain::model::{Collection, Record};
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, SchoolError};
use crate::utils::validation::Validate;
use async_trait::async_trait;

/// 啟動時決定一次，之後不再切換
pub enum Backend {
    Remote(RemoteStore),
    Local(LocalStore),
}

#[async_trait]
impl RecordStore for Backend {
    fn backend_name(&self) -> &'static str {
        match self {
            Backend::Remote(store) => store.backend_name(),
            Backend::Local(store) => store.backend_name(),
        }
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>> {
        match self {
            Backend::Remote(store) => store.list(collection).await,
            Backend::Local(store) => store.list(collection).await,
        }
    }

    async fn insert(&mut self, collection: Collection, record: Record) -> Result<Record> {
        match self {
            Backend::Remote(store) => store.insert(collection, record).await,
            Backend::Local(store) => store.insert(collection, record).await,
        }
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool> {
        match self {
            Backend::Remote(store) => store.delete(collection, id).await,
            Backend::Local(store) => store.delete(collection, id).await,
        }
    }
}

/// 操作結果：成功，或是降級後的安全預設值加上警告
#[derive(Debug)]
pub enum Outcome<T> {
    Done(T),
    Degraded { fallback: T, warning: SchoolError },
}

impl<T> Outcome<T> {
    pub fn degraded(fallback: T, warning: SchoolError) -> Self {
        tracing::warn!("⚠️ {}", warning);
        Outcome::Degraded { fallback, warning }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Done(value) => value,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Done(value) => value,
            Outcome::Degraded { fallback, .. } => fallback,
        }
    }

    pub fn warning(&self) -> Option<&SchoolError> {
        match self {
            Outcome::Done(_) => None,
            Outcome::Degraded { warning, .. } => Some(warning),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(value) => Outcome::Done(f(value)),
            Outcome::Degraded { fallback, warning } => Outcome::Degraded {
                fallback: f(fallback),
                warning,
            },
        }
    }
}

pub struct SchoolStore {
    backend: Backend,
    startup_warning: Option<SchoolError>,
}

impl SchoolStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            startup_warning: None,
        }
    }

    /// 帶示範資料的本地存儲
    pub fn local() -> Self {
        Self::new(Backend::Local(LocalStore::seeded()))
    }

    /// 先嘗試遠端後端，任何失敗都改用本地存儲。本地初始化不會失敗。
    pub async fn connect(config: &RemoteConfig) -> Self {
        if config.disabled {
            tracing::info!("Remote store disabled, using in-memory sample data");
            return Self::local();
        }

        match Self::try_remote(config).await {
            Ok(remote) => {
                tracing::info!("✅ Connected to remote store at {}", remote.database_url());
                Self::new(Backend::Remote(remote))
            }
            Err(SchoolError::ConfigurationAbsent) => {
                tracing::info!("No remote credentials configured, using in-memory sample data");
                Self::local()
            }
            Err(e) => {
                tracing::warn!("⚠️ Remote store unavailable, falling back to local: {}", e);
                tracing::warn!("💡 Suggestion: {}", e.recovery_suggestion());
                Self {
                    startup_warning: Some(e),
                    ..Self::local()
                }
            }
        }
    }

    async fn try_remote(config: &RemoteConfig) -> Result<RemoteStore> {
        let credentials = config.resolve_credentials()?;
        config.validate()?;
        credentials.validate()?;

        let remote = RemoteStore::from_config(config, credentials)?;
        remote.probe().await?;
        Ok(remote)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.backend_name()
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    /// 啟動時改用本地存儲的原因，供畫面顯示
    pub fn startup_warning(&self) -> Option<&SchoolError> {
        self.startup_warning.as_ref()
    }

    /// 未知的 collection 回傳空清單
    pub async fn list(&self, collection_name: &str) -> Outcome<Vec<Record>> {
        let Some(collection) = Collection::parse(collection_name) else {
            tracing::debug!("List of unknown collection '{}'", collection_name);
            return Outcome::Done(Vec::new());
        };

        match self.backend.list(collection).await {
            Ok(records) => Outcome::Done(records),
            Err(e) => Outcome::degraded(Vec::new(), e),
        }
    }

    /// 成功時回傳帶 id 的記錄；失敗時不回傳任何 id
    pub async fn insert(&mut self, collection_name: &str, record: Record) -> Outcome<Option<Record>> {
        let Some(collection) = Collection::parse(collection_name) else {
            return Outcome::degraded(
                None,
                SchoolError::validation(
                    "collection",
                    format!("Unknown collection '{}'", collection_name),
                ),
            );
        };

        match self.backend.insert(collection, record).await {
            Ok(stored) => {
                tracing::info!(
                    "Added {} to {}",
                    stored.id().unwrap_or_default(),
                    collection
                );
                Outcome::Done(Some(stored))
            }
            Err(e) => Outcome::degraded(None, e),
        }
    }

    /// 刪除不存在的 id 是 no-op
    pub async fn delete(&mut self, collection_name: &str, id: &str) -> Outcome<bool> {
        if id.trim().is_empty() {
            return Outcome::degraded(false, SchoolError::validation("Id", "Id is required."));
        }

        let Some(collection) = Collection::parse(collection_name) else {
            return Outcome::Done(false);
        };

        match self.backend.delete(collection, id).await {
            Ok(removed) => {
                if removed {
                    tracing::info!("Deleted {} from {}", id, collection);
                }
                Outcome::Done(removed)
            }
            Err(e) => Outcome::degraded(false, e),
        }
    }
}
