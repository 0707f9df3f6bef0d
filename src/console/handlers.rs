//! Console command handlers
//!
//! Each handler runs one store operation and renders the outcome as
//! response lines. Handlers block on filesystem work; async callers must
//! run them on the blocking pool.

use std::fs::File;
use std::io::Read;

use log::{info, warn};

use crate::console::parser::Command;
use crate::console::responses::{self, format_response};
use crate::error::StorageError;
use crate::error::handlers::status_code;
use crate::storage::{App, AppStore, validate_id};

/// Represents the outcome status of executing a command.
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Continue,
    Quit,
}

/// Struct encapsulating the full result of a command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: String,
}

impl CommandResult {
    fn reply(code: u16, message: &str) -> Self {
        Self {
            status: CommandStatus::Continue,
            message: format_response(code, message),
        }
    }

    fn failure(err: &StorageError) -> Self {
        warn!("Command failed: {}", err);
        Self::reply(status_code(err), &err.to_string())
    }
}

// Handle a single command against the store
pub fn handle_command(store: &AppStore, command: Command) -> CommandResult {
    match command {
        Command::Quit => CommandResult {
            status: CommandStatus::Quit,
            message: format_response(responses::GOODBYE, "Goodbye"),
        },
        Command::Help => handle_cmd_help(),
        Command::List => handle_cmd_list(store),
        Command::Refresh => handle_cmd_refresh(store),
        Command::Get(id) => handle_cmd_get(store, &id),
        Command::Create(name) => handle_cmd_create(store, &name),
        Command::Import { file, name } => handle_cmd_import(store, &file, name.as_deref()),
        Command::Delete(id) => handle_cmd_delete(store, &id),
        Command::MissingArgument(usage) => {
            CommandResult::reply(responses::SYNTAX_ERROR, &format!("Usage: {usage}"))
        }
        Command::Unknown(cmd) => {
            CommandResult::reply(responses::UNKNOWN_COMMAND, &format!("Unknown command: {cmd}"))
        }
    }
}

fn handle_cmd_help() -> CommandResult {
    CommandResult::reply(
        responses::HELP,
        "Commands: LIST, REFRESH, GET <id>, CREATE <name>, IMPORT <file> [name], DELETE <id>, QUIT",
    )
}

fn handle_cmd_list(store: &AppStore) -> CommandResult {
    let apps = match store.list() {
        Ok(apps) => apps,
        Err(e) => return CommandResult::failure(&e),
    };

    let mut message = String::new();
    for app in &apps {
        message.push_str(&format!("{}\n", summarize(app)));
    }
    message.push_str(&format_response(
        responses::LISTING_COMPLETE,
        &format!("{} apps", apps.len()),
    ));

    CommandResult {
        status: CommandStatus::Continue,
        message,
    }
}

fn handle_cmd_refresh(store: &AppStore) -> CommandResult {
    match store.refresh() {
        Ok(found) => CommandResult::reply(responses::OK, &format!("Discovered {found} new apps")),
        Err(e) => CommandResult::failure(&e),
    }
}

fn handle_cmd_get(store: &AppStore, id: &str) -> CommandResult {
    if let Err(e) = validate_id(id) {
        return CommandResult::failure(&e);
    }

    let Some(app) = store.get(id) else {
        return CommandResult::reply(responses::NOT_FOUND, &format!("No app with id {id}"));
    };

    let mut details = vec![summarize(&app)];
    match app.workflow_url() {
        Ok(Some(url)) => details.push(format!("workflow: {}", url.trim())),
        Ok(None) => {}
        Err(e) => return CommandResult::failure(&e),
    }
    match app.dir() {
        Ok(dir) => details.push(format!("directory: {}", dir.display())),
        Err(e) => warn!("Cannot resolve directory of app {}: {}", app.id(), e),
    }

    CommandResult::reply(responses::OK, &details.join("; "))
}

fn handle_cmd_create(store: &AppStore, name: &str) -> CommandResult {
    match store.create(Some(name), None) {
        Ok(app) => {
            info!("Console created app {} ({})", app.id(), name);
            CommandResult::reply(responses::CREATED, &format!("Created {}", app.id()))
        }
        Err(e) => CommandResult::failure(&e),
    }
}

fn handle_cmd_import(store: &AppStore, file: &str, name: Option<&str>) -> CommandResult {
    let mut unsigned = match File::open(file) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to open {}: {}", file, e);
            return CommandResult::reply(
                responses::ACTION_FAILED,
                &format!("Cannot open {file}: {e}"),
            );
        }
    };

    let reader: &mut dyn Read = &mut unsigned;
    match store.create(name, Some(reader)) {
        Ok(app) => {
            info!("Console imported {} as app {}", file, app.id());
            CommandResult::reply(responses::CREATED, &format!("Created {}", app.id()))
        }
        Err(e) => CommandResult::failure(&e),
    }
}

fn handle_cmd_delete(store: &AppStore, id: &str) -> CommandResult {
    if let Err(e) = validate_id(id) {
        return CommandResult::failure(&e);
    }

    match store.delete(id) {
        Ok(()) => CommandResult::reply(responses::DELETED, &format!("Deleted {id}")),
        Err(e) => CommandResult::failure(&e),
    }
}

fn summarize(app: &App) -> String {
    let name = match app.name() {
        Ok(Some(name)) => name,
        Ok(None) => "-".to_string(),
        Err(e) => {
            warn!("{}", e);
            "?".to_string()
        }
    };
    let signed = if app.is_signed() { "signed" } else { "unsigned" };
    format!("{}\t{}\t{}", app.id(), name.trim(), signed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::parser::parse_command;
    use std::fs;

    fn run(store: &AppStore, line: &str) -> CommandResult {
        handle_command(store, parse_command(line))
    }

    fn created_id(result: &CommandResult) -> String {
        result
            .message
            .trim()
            .rsplit(' ')
            .next()
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_create_get_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap();

        let created = run(&store, "CREATE Demo App");
        assert!(created.message.starts_with("257 Created "));
        let id = created_id(&created);

        let got = run(&store, &format!("GET {id}"));
        assert!(got.message.starts_with("200 "));
        assert!(got.message.contains("Demo App"));
        assert!(got.message.contains("unsigned"));
        assert!(got.message.contains(&format!("directory: {}", dir.path().join(&id).display())));

        let deleted = run(&store, &format!("DELETE {id}"));
        assert_eq!(deleted.message, format!("250 Deleted {id}\n"));

        let missing = run(&store, &format!("GET {id}"));
        assert!(missing.message.starts_with("450 "));
    }

    #[test]
    fn test_import_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path().join("apps")).unwrap();
        let upload = dir.path().join("app.ipa");
        fs::write(&upload, b"binary").unwrap();

        let created = run(&store, &format!("IMPORT {} Demo", upload.display()));
        assert!(created.message.starts_with("257 "));
        let id = created_id(&created);
        let app = store.get(&id).unwrap();
        let mut contents = String::new();
        app.open_unsigned()
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "binary");

        let listed = run(&store, "LIST");
        assert!(listed.message.contains(&id));
        assert!(listed.message.ends_with("226 1 apps\n"));
    }

    #[test]
    fn test_rejects_hostile_ids_and_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = AppStore::open(dir.path()).unwrap();

        assert!(run(&store, "GET ../../etc").message.starts_with("553 "));
        assert!(run(&store, "DELETE ..").message.starts_with("553 "));
        assert!(run(&store, "DELETE unknown-id").message.starts_with("250 "));
        assert!(run(&store, "GET").message.starts_with("501 "));
        assert!(run(&store, "BOGUS").message.starts_with("500 "));
        assert!(run(&store, "IMPORT /definitely/not/here.ipa")
            .message
            .starts_with("550 "));
        assert_eq!(run(&store, "QUIT").status, CommandStatus::Quit);
    }
}
