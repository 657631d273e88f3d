pub mod context;
pub mod session;
pub mod store;

pub use crate::domain::model::{Collection, Record};
pub use crate::domain::ports::{CredentialVerifier, RecordStore};
pub use crate::utils::error::Result;
