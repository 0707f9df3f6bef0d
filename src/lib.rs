pub mod config;
pub mod console;
pub mod error;
pub mod storage;
pub mod utils;

pub use config::ServiceConfig;
pub use error::{ServiceError, StorageError};
pub use storage::{App, AppStore, Resource};
