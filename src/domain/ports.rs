use crate::domain::model::{Collection, Record};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 記錄存儲的統一介面，遠端與本地後端都實作它
#[async_trait]
pub trait RecordStore: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn list(&self, collection: Collection) -> Result<Vec<Record>>;

    /// 忽略傳入記錄的 id，回傳已指派 id 的記錄
    async fn insert(&mut self, collection: Collection, record: Record) -> Result<Record>;

    /// 回傳後端是否確認刪除；不存在的 id 不視為錯誤
    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool>;
}

pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn verify(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}
