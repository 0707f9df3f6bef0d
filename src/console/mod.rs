//! Operator console
//!
//! Line-based commands for inspecting and managing stored apps.

pub mod handlers;
pub mod parser;
pub mod responses;
pub mod session;

pub use handlers::{CommandResult, CommandStatus, handle_command};
pub use parser::{Command, parse_command};
pub use session::run_session;
