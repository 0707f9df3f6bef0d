//! Error handlers
//!
//! Logs service errors and maps storage errors to console status codes.

use log::error;

use crate::console::responses;
use crate::error::types::{ServiceError, StorageError};

/// Handle a service error
pub fn handle_error(err: &ServiceError) {
    error!("App store error: {}", err);
}

/// Convert a storage error to a console response code
pub fn status_code(err: &StorageError) -> u16 {
    match err {
        StorageError::InvalidPath { .. } => responses::INVALID_NAME,
        StorageError::StorageUnavailable { .. } => responses::SERVICE_UNAVAILABLE,
        StorageError::CreateFailed { .. } => responses::ACTION_FAILED,
        StorageError::DeleteFailed { .. } => responses::ACTION_FAILED,
        StorageError::ResourceFailed { .. } => responses::ACTION_FAILED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn test_status_codes() {
        let invalid = StorageError::invalid_path("..", "parent directory segment");
        assert_eq!(status_code(&invalid), 553);

        let unavailable = StorageError::StorageUnavailable {
            root: PathBuf::from("/nowhere"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(status_code(&unavailable), 421);

        let failed = StorageError::DeleteFailed {
            id: "abc".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(status_code(&failed), 550);
    }

    #[test]
    fn test_messages_carry_id_and_step() {
        let err = StorageError::CreateFailed {
            id: "abc".into(),
            op: "write name file",
            source: io::Error::other("disk full"),
        };
        let msg = err.to_string();
        assert!(msg.contains("abc"));
        assert!(msg.contains("write name file"));
        assert!(msg.contains("disk full"));
    }
}
