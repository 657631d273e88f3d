use crate::config::AppConfig;
use crate::core::session::{AuthGate, FixedCredentials};
use crate::core::store::{Outcome, SchoolStore};
use crate::domain::model::{Entity, Record, Student, Teacher};
use crate::utils::error::{Result, SchoolError};
use crate::utils::validation::require_field;

/// 新增學生表單的原始輸入
#[derive(Debug, Clone, Default)]
pub struct StudentForm {
    pub name: String,
    pub class: String,
    pub roll: String,
    pub guardian: String,
    pub contact: String,
}

impl StudentForm {
    pub fn into_student(self) -> Result<Student> {
        let name = require_field("Name", &self.name)?.to_string();
        let class = require_field("Class", &self.class)?.to_string();
        let roll = require_field("Roll", &self.roll)?;
        let roll_number = match roll.parse::<u32>() {
            Ok(n) if n > 0 => n,
            _ => {
                return Err(SchoolError::validation(
                    "Roll",
                    "Roll must be a positive number.",
                ))
            }
        };

        Ok(Student {
            id: None,
            name,
            class,
            roll_number,
            guardian: optional(&self.guardian),
            contact: optional(&self.contact),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct TeacherForm {
    pub name: String,
    pub subject: String,
    pub qualification: String,
}

impl TeacherForm {
    pub fn into_teacher(self) -> Result<Teacher> {
        Ok(Teacher {
            id: None,
            name: require_field("Name", &self.name)?.to_string(),
            subject: self.subject.trim().to_string(),
            qualification: optional(&self.qualification),
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn decode_all<E: Entity>(records: Vec<Record>) -> Vec<E> {
    records
        .into_iter()
        .filter_map(|record| match E::from_record(&record) {
            Ok(entity) => Some(entity),
            Err(e) => {
                tracing::warn!(
                    "⚠️ Skipping unreadable record {:?} in {}: {}",
                    record.id(),
                    E::COLLECTION,
                    e
                );
                None
            }
        })
        .collect()
}

/// 啟動時建立的應用程式上下文，傳給每個畫面處理函式
pub struct AppContext {
    config: AppConfig,
    store: SchoolStore,
    auth: AuthGate,
}

impl AppContext {
    pub fn new(config: AppConfig, store: SchoolStore, auth: AuthGate) -> Self {
        Self {
            config,
            store,
            auth,
        }
    }

    /// 依設定選擇存儲後端並建立登入閘門
    pub async fn bootstrap(config: AppConfig) -> Self {
        let store = SchoolStore::connect(&config.remote).await;
        let auth = AuthGate::new(FixedCredentials::from(&config.admin));
        Self::new(config, store, auth)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &SchoolStore {
        &self.store
    }

    pub fn auth(&self) -> &AuthGate {
        &self.auth
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<()> {
        self.auth.login(username, password)
    }

    pub fn logout(&mut self) {
        self.auth.logout();
    }

    pub async fn list_students(&self) -> Result<Outcome<Vec<Student>>> {
        self.list_entities().await
    }

    pub async fn list_teachers(&self) -> Result<Outcome<Vec<Teacher>>> {
        self.list_entities().await
    }

    pub async fn add_student(&mut self, form: StudentForm) -> Result<Outcome<Option<Student>>> {
        self.auth.require_login()?;
        let student = form.into_student()?;
        self.add_entity(student).await
    }

    pub async fn add_teacher(&mut self, form: TeacherForm) -> Result<Outcome<Option<Teacher>>> {
        self.auth.require_login()?;
        let teacher = form.into_teacher()?;
        self.add_entity(teacher).await
    }

    pub async fn delete_student(&mut self, id: &str) -> Result<Outcome<bool>> {
        self.delete_entity::<Student>(id).await
    }

    pub async fn delete_teacher(&mut self, id: &str) -> Result<Outcome<bool>> {
        self.delete_entity::<Teacher>(id).await
    }

    async fn list_entities<E: Entity>(&self) -> Result<Outcome<Vec<E>>> {
        self.auth.require_login()?;
        let outcome = self.store.list(E::COLLECTION.as_str()).await;
        Ok(outcome.map(decode_all::<E>))
    }

    async fn add_entity<E: Entity>(&mut self, entity: E) -> Result<Outcome<Option<E>>> {
        let record = entity.to_record()?;
        let outcome = self.store.insert(E::COLLECTION.as_str(), record).await;

        Ok(outcome.map(|stored| {
            stored.map(|record| {
                let mut entity = entity;
                entity.set_id(record.id);
                entity
            })
        }))
    }

    async fn delete_entity<E: Entity>(&mut self, id: &str) -> Result<Outcome<bool>> {
        self.auth.require_login()?;
        Ok(self.store.delete(E::COLLECTION.as_str(), id).await)
    }

    pub fn home_page(&self) -> String {
        let school = &self.config.school;
        let mut page = format!("Welcome to {} 🎓\n\n", school.name);
        page.push_str("Principal's Message\n");
        page.push_str(&format!("  \"{}\"\n\n", school.principal_message));
        page.push_str("Why Choose Us?\n");
        for highlight in &school.highlights {
            page.push_str(&format!("  ✅ {}\n", highlight));
        }
        page
    }

    pub fn about_page(&self) -> String {
        let school = &self.config.school;
        format!(
            "About {name}\n\
             Established in {year}. {tagline}.\n\n\
             Admission Information\n  📢 {notice}\n\n\
             Contact Us\n  📍 Address: {address}\n  📞 Phone: {phone}\n",
            name = school.name,
            year = school.established,
            tagline = school.tagline,
            notice = school.admission_notice,
            address = school.address,
            phone = school.phone,
        )
    }
}
