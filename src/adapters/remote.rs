use crate::adapters::token::TokenSource;
use crate::config::credentials::ServiceAccountCredentials;
use crate::config::RemoteConfig;
use crate::domain::model::{Collection, Record};
use crate::domain::ports::RecordStore;
use crate::utils::error::{Result, SchoolError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::cmp::Ordering;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::RetryIf;
use url::Url;

/// 遠端請求的身分驗證方式
pub enum RemoteAuth {
    ServiceAccount(TokenSource),
    /// Firebase emulator 不驗證 token，只需要 namespace
    Emulator { namespace: String },
}

/// Firebase Realtime Database 的 REST 後端。每個 collection 對應 `root_path` 下的一個子路徑。
pub struct RemoteStore {
    client: Client,
    database_url: String,
    root_path: String,
    auth: RemoteAuth,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl RemoteStore {
    /// 依設定建立後端，不發出任何請求
    pub fn from_config(config: &RemoteConfig, credentials: ServiceAccountCredentials) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        let database_url = config.database_url(&credentials);
        crate::utils::validation::validate_url("remote.database_url", &database_url)?;

        let auth = if config.emulator {
            RemoteAuth::Emulator {
                namespace: credentials.project_id.clone(),
            }
        } else {
            RemoteAuth::ServiceAccount(TokenSource::new(credentials, client.clone())?)
        };

        Ok(Self {
            client,
            database_url,
            root_path: config.root_path.trim_matches('/').to_string(),
            auth,
            retry_attempts: config.retry_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_millis),
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// 啟動時確認服務可連線且憑證有效
    pub async fn probe(&self) -> Result<()> {
        let url = self.url(&[], &[("shallow", "true")]).await?;
        self.send_with_retry(Method::GET, url, None, true)
            .await
            .map(|_| ())
            .map_err(|e| {
                SchoolError::invalid_config(
                    "remote",
                    format!("Database at {} is not usable: {}", self.database_url, e),
                )
            })
    }

    async fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
        let mut path = self.root_path.clone();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }

        let mut url = Url::parse(&format!("{}/{}.json", self.database_url, path)).map_err(|e| {
            SchoolError::invalid_config("remote.database_url", format!("Invalid URL: {}", e))
        })?;

        let auth_pair = match &self.auth {
            RemoteAuth::ServiceAccount(tokens) => ("access_token", tokens.access_token().await?),
            RemoteAuth::Emulator { namespace } => ("ns", namespace.clone()),
        };

        url.query_pairs_mut()
            .extend_pairs(query.iter().copied())
            .append_pair(auth_pair.0, &auth_pair.1);

        Ok(url)
    }

    async fn send_with_retry(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        idempotent: bool,
    ) -> Result<serde_json::Value> {
        let strategy =
            FixedInterval::new(self.retry_delay).take(self.retry_attempts as usize);

        RetryIf::spawn(
            strategy,
            || self.send_once(method.clone(), url.clone(), body),
            |e: &SchoolError| {
                let transient = is_transient(e, idempotent);
                if transient {
                    tracing::warn!("⚠️ Transient error on {} {}: {}", method, url.path(), e);
                }
                transient
            },
        )
        .await
    }

    async fn send_once(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
    ) -> Result<serde_json::Value> {
        // 只記錄路徑，避免 access token 出現在日誌
        tracing::debug!("{} {}{}", method, self.database_url, url.path());

        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?.error_for_status()?;
        let value = response.json::<serde_json::Value>().await?;
        Ok(value)
    }
}

fn is_transient(error: &SchoolError, idempotent: bool) -> bool {
    match error {
        SchoolError::Http(e) if e.is_connect() => true,
        SchoolError::Http(e) if idempotent => {
            e.is_timeout() || e.status().is_some_and(|s| s.is_server_error())
        }
        _ => false,
    }
}

/// Firebase 的 key 不能包含這些字元
fn validate_key(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['.', '#', '$', '[', ']', '/']) {
        return Err(SchoolError::validation("Id", format!("Invalid record id '{}'", id)));
    }
    Ok(())
}

/// RTDB 的 key 排序：整數 key 依數值在前，其餘字串 key 依字典序在後
fn key_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// 將讀取結果轉成記錄。RTDB 對連續數字 key 會回傳陣列，對空路徑回傳 null。
fn records_from_snapshot(collection: Collection, snapshot: serde_json::Value) -> Vec<Record> {
    let entries: Vec<(String, serde_json::Value)> = match snapshot {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::Object(map) => {
            let mut entries: Vec<_> = map.into_iter().collect();
            entries.sort_by(|(a, _), (b, _)| key_order(a, b));
            entries
        }
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        other => {
            tracing::warn!("⚠️ Unexpected snapshot for {}: {}", collection, other);
            Vec::new()
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, value)| match value {
            serde_json::Value::Object(fields) => {
                Some(Record::new(fields.into_iter().collect()).with_id(id))
            }
            serde_json::Value::Null => None,
            other => {
                tracing::warn!("⚠️ Skipping non-record entry {}/{}: {}", collection, id, other);
                None
            }
        })
        .collect()
}

#[async_trait]
impl RecordStore for RemoteStore {
    fn backend_name(&self) -> &'static str {
        "remote"
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>> {
        let read = async {
            let url = self.url(&[collection.as_str()], &[]).await?;
            self.send_with_retry(Method::GET, url, None, true).await
        };

        match read.await {
            Ok(snapshot) => Ok(records_from_snapshot(collection, snapshot)),
            Err(e) => Err(SchoolError::BackendRead {
                collection: collection.to_string(),
                message: e.to_string(),
            }),
        }
    }

    async fn insert(&mut self, collection: Collection, record: Record) -> Result<Record> {
        let body = serde_json::Value::Object(record.data.clone().into_iter().collect());
        let write = async {
            let url = self.url(&[collection.as_str()], &[]).await?;
            self.send_with_retry(Method::POST, url, Some(&body), false).await
        };

        let response = write.await.map_err(|e| SchoolError::BackendWrite {
            collection: collection.to_string(),
            message: e.to_string(),
        })?;

        // 服務端確認寫入後才回傳產生的 key
        match response.get("name").and_then(|v| v.as_str()) {
            Some(id) if !id.is_empty() => Ok(record.without_id().with_id(id)),
            _ => Err(SchoolError::BackendWrite {
                collection: collection.to_string(),
                message: format!("Write was not confirmed: {}", response),
            }),
        }
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool> {
        validate_key(id)?;

        let remove = async {
            let url = self.url(&[collection.as_str(), id], &[]).await?;
            self.send_with_retry(Method::DELETE, url, None, true).await
        };

        remove
            .await
            .map(|_| true)
            .map_err(|e| SchoolError::BackendDelete {
                collection: collection.to_string(),
                message: e.to_string(),
            })
    }
}
