use crate::utils::error::{Result, SchoolError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 一筆扁平記錄：欄位名稱對應純量值，`id` 由存儲後端在新增時指派
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub data: HashMap<String, serde_json::Value>,
}

impl Record {
    pub fn new(data: HashMap<String, serde_json::Value>) -> Self {
        Self { id: None, data }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// 以鏈式呼叫加入欄位
    pub fn field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(|v| v.as_str())
    }

    /// 去掉 id 後的欄位內容，用於比較新增前後的資料
    pub fn without_id(&self) -> Record {
        Record::new(self.data.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Students,
    Teachers,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Students => "students",
            Collection::Teachers => "teachers",
        }
    }

    /// 未知名稱回傳 None，呼叫端自行決定如何處理
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "students" => Some(Collection::Students),
            "teachers" => Some(Collection::Teachers),
            _ => None,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 可存入某個 collection 的具型別實體
pub trait Entity: Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: Option<String>);

    fn to_record(&self) -> Result<Record> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(Record {
                id: self.id().map(str::to_string),
                data: map.into_iter().collect(),
            }),
            other => Err(SchoolError::validation(
                Self::COLLECTION.as_str(),
                format!("Expected an object, got {}", other),
            )),
        }
    }

    fn from_record(record: &Record) -> Result<Self> {
        let object: serde_json::Map<String, serde_json::Value> = record
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let mut entity: Self = serde_json::from_value(serde_json::Value::Object(object))?;
        entity.set_id(record.id.clone());
        Ok(entity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Class", default)]
    pub class: String,
    #[serde(rename = "RollNumber", default)]
    pub roll_number: u32,
    #[serde(rename = "Guardian", default, skip_serializing_if = "Option::is_none")]
    pub guardian: Option<String>,
    #[serde(rename = "Contact", default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl Entity for Student {
    const COLLECTION: Collection = Collection::Students;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Teacher {
    #[serde(skip)]
    pub id: Option<String>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Subject", default)]
    pub subject: String,
    #[serde(rename = "Qualification", default, skip_serializing_if = "Option::is_none")]
    pub qualification: Option<String>,
}

impl Entity for Teacher {
    const COLLECTION: Collection = Collection::Teachers;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }
}

/// 表單上可選的班級
pub const CLASS_OPTIONS: &[&str] = &[
    "Play", "Nursery", "Class 1", "Class 2", "Class 3", "Class 4", "Class 5", "Class 6",
    "Class 7", "Class 8", "Class 9", "Class 10",
];
