#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;

use crate::config::credentials::ServiceAccountCredentials;
use crate::utils::error::{Result, SchoolError};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, validate_range,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "school-admin.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub school: SchoolInfo,
    pub remote: RemoteConfig,
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// 首頁與「關於我們」頁面顯示的學校資訊
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchoolInfo {
    pub name: String,
    pub tagline: String,
    pub established: u16,
    pub address: String,
    pub phone: String,
    pub principal_message: String,
    pub admission_notice: String,
    pub highlights: Vec<String>,
}

impl Default for SchoolInfo {
    fn default() -> Self {
        Self {
            name: "Genesis English School".to_string(),
            tagline: "Enlightening the Future".to_string(),
            established: 2025,
            address: "College Road, Dinajpur".to_string(),
            phone: "+880 1711-223344".to_string(),
            principal_message: "Our goal is not just academic excellence, but to mold children \
                                with strong moral values."
                .to_string(),
            admission_notice: "Admission is currently OPEN for Play Group to Class 5".to_string(),
            highlights: vec![
                "Experienced Faculty".to_string(),
                "Modern Computer Lab".to_string(),
                "Spacious Playground".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// 未設定時由 project_id 推導預設的 Realtime Database 位址
    pub database_url: Option<String>,
    pub root_path: String,
    pub credentials_file: Option<String>,
    /// 內嵌憑證；保留原始值，解析失敗時改用本地存儲而不是讓整份設定失敗
    pub credentials: Option<serde_json::Value>,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_millis: u64,
    /// 連到 Firebase emulator 時不需要 access token
    pub emulator: bool,
    /// 強制使用本地存儲
    pub disabled: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            root_path: "school".to_string(),
            credentials_file: None,
            credentials: None,
            timeout_seconds: 10,
            retry_attempts: 1,
            retry_delay_millis: 200,
            emulator: false,
            disabled: false,
        }
    }
}

impl RemoteConfig {
    /// 依序找內嵌憑證、憑證檔、環境變數；都沒有時回傳 ConfigurationAbsent
    pub fn resolve_credentials(&self) -> Result<ServiceAccountCredentials> {
        if let Some(inline) = &self.credentials {
            return serde_json::from_value(inline.clone()).map_err(|e| {
                SchoolError::invalid_config(
                    "remote.credentials",
                    format!("Malformed credential table: {}", e),
                )
            });
        }

        if let Some(path) = &self.credentials_file {
            validate_path("remote.credentials_file", path)?;
            return ServiceAccountCredentials::from_file(path);
        }

        match ServiceAccountCredentials::from_env() {
            Some(result) => result,
            None => Err(SchoolError::ConfigurationAbsent),
        }
    }

    pub fn database_url(&self, credentials: &ServiceAccountCredentials) -> String {
        match &self.database_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}-default-rtdb.firebaseio.com",
                credentials.project_id
            ),
        }
    }
}

impl Validate for RemoteConfig {
    fn validate(&self) -> Result<()> {
        if let Some(url) = &self.database_url {
            validate_url("remote.database_url", url)?;
        }
        validate_non_empty_string("remote.root_path", &self.root_path)?;
        if self.root_path.contains(['.', '#', '$', '[', ']']) {
            return Err(SchoolError::invalid_config(
                "remote.root_path",
                "Path cannot contain '.', '#', '$', '[' or ']'",
            ));
        }
        validate_positive_number("remote.timeout_seconds", self.timeout_seconds, 1)?;
        validate_range("remote.retry_attempts", self.retry_attempts, 0, 5)?;
        validate_range("remote.retry_delay_millis", self.retry_delay_millis, 0, 10_000)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "1234".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 本 crate 的日誌等級；`verbose` 時固定為 debug
    pub level: String,
    pub verbose: bool,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            verbose: false,
            json: false,
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(SchoolError::invalid_config(
                "logging.level",
                format!("Unknown level '{}', expected one of {:?}", self.level, LOG_LEVELS),
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SchoolError::Io)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| {
            SchoolError::invalid_config("toml_parsing", format!("TOML parsing error: {}", e))
        })
    }

    /// 指定路徑時必須可讀；未指定時預設檔不存在就用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// 替換環境變數 (例如 ${DATABASE_URL})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static regex is valid")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }
}

impl Validate for AppConfig {
    /// 遠端設定不在這裡驗證，交給存儲選擇時處理並改用本地存儲
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("school.name", &self.school.name)?;
        validate_non_empty_string("admin.username", &self.admin.username)?;
        validate_non_empty_string("admin.password", &self.admin.password)?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.school.name, "Genesis English School");
        assert_eq!(config.admin.username, "admin");
        assert_eq!(config.admin.password, "1234");
        assert_eq!(config.remote.root_path, "school");
        assert_eq!(config.remote.timeout_seconds, 10);
        assert_eq!(config.remote.retry_attempts, 1);
        assert!(config.remote.credentials.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_admin_or_logging_settings_fail_validation() {
        let config = AppConfig::from_toml_str("[admin]\npassword = \"\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(SchoolError::ConfigurationInvalid { field, .. }) if field == "admin.password"
        ));

        let config = AppConfig::from_toml_str("[logging]\nlevel = \"loud\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(SchoolError::ConfigurationInvalid { field, .. }) if field == "logging.level"
        ));
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[school]
name = "Test School"
established = 2020

[remote]
database_url = "https://test-school.firebaseio.com/"
root_path = "campus"
credentials_file = "service-account.json"
timeout_seconds = 3
retry_attempts = 0

[admin]
username = "principal"
password = "secret"

[logging]
level = "warn"
json = true
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.school.name, "Test School");
        assert_eq!(config.school.established, 2020);
        assert_eq!(config.school.address, "College Road, Dinajpur");
        assert_eq!(config.remote.root_path, "campus");
        assert_eq!(config.remote.retry_attempts, 0);
        assert_eq!(config.admin.username, "principal");
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "warn");
        assert!(config.remote.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SCHOOL_ADMIN_TEST_DB_URL", "https://from-env.firebaseio.com");

        let toml_content = r#"
[remote]
database_url = "${SCHOOL_ADMIN_TEST_DB_URL}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.remote.database_url.as_deref(),
            Some("https://from-env.firebaseio.com")
        );

        std::env::remove_var("SCHOOL_ADMIN_TEST_DB_URL");
    }

    #[test]
    fn test_remote_validation() {
        let mut remote = RemoteConfig {
            database_url: Some("invalid-url".into()),
            ..RemoteConfig::default()
        };
        assert!(remote.validate().is_err());

        remote.database_url = None;
        remote.root_path = "bad.path".into();
        assert!(remote.validate().is_err());

        remote.root_path = "school".into();
        remote.retry_attempts = 10;
        assert!(remote.validate().is_err());
    }

    #[test]
    fn test_malformed_inline_credentials_are_reported_not_fatal() {
        let toml_content = r#"
[remote.credentials]
type = "service_account"
project_id = 42
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        let err = config.remote.resolve_credentials().unwrap_err();
        assert!(matches!(err, SchoolError::ConfigurationInvalid { .. }));
    }

    #[test]
    fn test_database_url_derived_from_project_id() {
        let json = serde_json::json!({
            "type": "service_account",
            "project_id": "genesis-school",
            "private_key_id": "k",
            "private_key": "p",
            "client_email": "a@b.c",
            "auth_uri": "https://accounts.google.com/o/oauth2/auth",
            "token_uri": "https://oauth2.googleapis.com/token"
        });
        let remote = RemoteConfig {
            credentials: Some(json),
            ..RemoteConfig::default()
        };

        let creds = remote.resolve_credentials().unwrap();
        assert_eq!(
            remote.database_url(&creds),
            "https://genesis-school-default-rtdb.firebaseio.com"
        );
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[school]\nname = \"File School\"\n")
            .unwrap();

        let config = AppConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.school.name, "File School");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(SchoolError::Io(_))));
    }
}
