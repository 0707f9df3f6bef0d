//! Console response handling
//!
//! Response codes borrow the three-digit FTP reply scheme.

pub const OK: u16 = 200;
pub const HELP: u16 = 214;
pub const GOODBYE: u16 = 221;
pub const LISTING_COMPLETE: u16 = 226;
pub const DELETED: u16 = 250;
pub const CREATED: u16 = 257;
pub const SERVICE_UNAVAILABLE: u16 = 421;
pub const NOT_FOUND: u16 = 450;
pub const UNKNOWN_COMMAND: u16 = 500;
pub const SYNTAX_ERROR: u16 = 501;
pub const ACTION_FAILED: u16 = 550;
pub const INVALID_NAME: u16 = 553;

/// Format a console response line
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\n", code, message)
}
