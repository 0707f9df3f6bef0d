//! App storage
//!
//! Keeps the on-disk app directories and the in-memory index in sync.

pub mod app;
pub mod filesystem;
pub mod resolver;
pub mod validation;

pub use app::{App, Resource};
pub use resolver::{AppStore, new_app_id};
pub use validation::{resolve, validate_id};
