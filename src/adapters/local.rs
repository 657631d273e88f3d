use crate::domain::model::{Collection, Record};
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// 行程內的記錄存儲，遠端不可用時的後備方案。資料只在本次執行期間有效。
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    collections: HashMap<Collection, Vec<Record>>,
    // 每個 collection 已發出的最大數字 id，刪除後也不會重複使用
    issued: HashMap<Collection, u64>,
}

impl LocalStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 帶有示範資料的存儲
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        store.collections.insert(
            Collection::Students,
            vec![
                Record::default()
                    .field("Name", "Rahim Sheikh")
                    .field("Class", "Class 5")
                    .field("RollNumber", 1)
                    .field("Guardian", "Karim Sheikh")
                    .field("Contact", "01711223344")
                    .with_id("s1"),
                Record::default()
                    .field("Name", "Sadia Akhtar")
                    .field("Class", "Class 4")
                    .field("RollNumber", 5)
                    .field("Guardian", "Abdur Rahman")
                    .field("Contact", "01911223344")
                    .with_id("s2"),
            ],
        );
        store.collections.insert(
            Collection::Teachers,
            vec![
                Record::default()
                    .field("Name", "Mr. Ahmed")
                    .field("Subject", "English")
                    .field("Qualification", "M.A in English")
                    .with_id("t1"),
                Record::default()
                    .field("Name", "Ms. Farzana")
                    .field("Subject", "Mathematics")
                    .field("Qualification", "B.Sc (Math)")
                    .with_id("t2"),
            ],
        );
        store
    }

    /// 以目前筆數推導下一個數字 id，跳過仍存在或已發出過的值
    fn next_id(&mut self, collection: Collection) -> String {
        let records = self.collections.entry(collection).or_default();
        let issued = self.issued.entry(collection).or_insert(0);

        let mut candidate = (*issued).max(records.len() as u64) + 1;
        while records
            .iter()
            .any(|r| r.id() == Some(candidate.to_string().as_str()))
        {
            candidate += 1;
        }

        *issued = candidate;
        candidate.to_string()
    }
}

#[async_trait]
impl RecordStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        "local"
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Record>> {
        Ok(self
            .collections
            .get(&collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert(&mut self, collection: Collection, record: Record) -> Result<Record> {
        let id = self.next_id(collection);
        let stored = record.without_id().with_id(id);

        self.collections
            .entry(collection)
            .or_default()
            .push(stored.clone());

        tracing::debug!("Inserted {} into local {}", stored.id().unwrap_or_default(), collection);
        Ok(stored)
    }

    async fn delete(&mut self, collection: Collection, id: &str) -> Result<bool> {
        let Some(records) = self.collections.get_mut(&collection) else {
            return Ok(false);
        };

        match records.iter().position(|r| r.id() == Some(id)) {
            Some(index) => {
                records.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(records: &[Record]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| r.id().map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_seeded_collections() {
        let store = LocalStore::seeded();

        let students = store.list(Collection::Students).await.unwrap();
        let teachers = store.list(Collection::Teachers).await.unwrap();

        assert_eq!(ids(&students), vec!["s1", "s2"]);
        assert_eq!(ids(&teachers), vec!["t1", "t2"]);
        assert_eq!(students[0].get_str("Name"), Some("Rahim Sheikh"));
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_id_from_size() {
        let mut store = LocalStore::seeded();

        let record = Record::default()
            .field("Name", "Test")
            .field("Class", "Class 9")
            .field("RollNumber", 5);
        let inserted = store.insert(Collection::Students, record.clone()).await.unwrap();

        assert_eq!(inserted.id(), Some("3"));
        assert_eq!(inserted.without_id(), record);

        let students = store.list(Collection::Students).await.unwrap();
        assert_eq!(students.len(), 3);
        assert_eq!(students.last(), Some(&inserted));
    }

    #[tokio::test]
    async fn test_caller_supplied_id_is_ignored() {
        let mut store = LocalStore::empty();

        let record = Record::default().field("Name", "Mr. X").with_id("chosen");
        let inserted = store.insert(Collection::Teachers, record).await.unwrap();

        assert_eq!(inserted.id(), Some("1"));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let mut store = LocalStore::seeded();

        let first = store
            .insert(Collection::Students, Record::default().field("Name", "A"))
            .await
            .unwrap();
        assert!(store.delete(Collection::Students, "s1").await.unwrap());

        let second = store
            .insert(Collection::Students, Record::default().field("Name", "B"))
            .await
            .unwrap();

        assert_eq!(first.id(), Some("3"));
        assert_eq!(second.id(), Some("4"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let mut store = LocalStore::seeded();

        assert!(store.delete(Collection::Students, "s1").await.unwrap());
        assert!(!store.delete(Collection::Students, "s1").await.unwrap());

        let students = store.list(Collection::Students).await.unwrap();
        assert_eq!(ids(&students), vec!["s2"]);
    }

    #[tokio::test]
    async fn test_collections_are_independent() {
        let mut store = LocalStore::seeded();

        assert!(!store.delete(Collection::Teachers, "s1").await.unwrap());
        assert_eq!(store.list(Collection::Students).await.unwrap().len(), 2);
    }
}
