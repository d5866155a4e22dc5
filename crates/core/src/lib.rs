pub mod config;
pub mod error;
pub mod policy;
pub mod types;

pub use config::AppConfig;
pub use error::{SyncError, SyncResult};
