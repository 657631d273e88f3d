use crate::config::AppConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "school-admin")]
#[command(about = "School website and admin portal for student and teacher records")]
pub struct CliArgs {
    #[arg(long, help = "Path to the TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Path to a service-account credential JSON file")]
    pub credentials: Option<String>,

    #[arg(long, help = "Database URL (overrides the config file)")]
    pub database_url: Option<String>,

    #[arg(long, help = "Ignore remote credentials and use in-memory sample data")]
    pub local: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliArgs {
    /// 命令列參數覆蓋設定檔
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.credentials {
            config.remote.credentials = None;
            config.remote.credentials_file = Some(path.clone());
        }
        if let Some(url) = &self.database_url {
            config.remote.database_url = Some(url.clone());
        }
        if self.local {
            config.remote.disabled = true;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}
