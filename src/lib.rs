pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use config::AppConfig;
pub use core::context::{AppContext, StudentForm, TeacherForm};
pub use core::session::{AuthGate, FixedCredentials, SessionState};
pub use core::store::{Backend, Outcome, SchoolStore};
pub use domain::model::{Collection, Record, Student, Teacher};
pub use utils::error::{Result, SchoolError};
