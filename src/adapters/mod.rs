// Adapters layer: concrete record stores and the remote auth plumbing.

pub mod local;
pub mod remote;
pub mod token;

pub use local::LocalStore;
pub use remote::RemoteStore;
