// Command enum to represent console commands
#[derive(Debug, PartialEq)]
pub enum Command {
    Quit,
    Help,
    List,
    Refresh,
    Get(String),
    Create(String),
    Import { file: String, name: Option<String> },
    Delete(String),
    MissingArgument(&'static str),
    Unknown(String),
}

// Parse raw command string into Command enum
pub fn parse_command(raw: &str) -> Command {
    let trimmed = raw.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("").to_ascii_uppercase();
    let arg = parts.next().unwrap_or("").trim();

    match cmd.as_str() {
        "QUIT" | "Q" => Command::Quit,
        "HELP" => Command::Help,
        "LIST" => Command::List,
        "REFRESH" => Command::Refresh,
        "GET" | "CREATE" | "IMPORT" | "DELETE" if arg.is_empty() => {
            Command::MissingArgument(usage(&cmd))
        }
        "GET" => Command::Get(arg.to_string()),
        "CREATE" => Command::Create(arg.to_string()),
        "IMPORT" => {
            let mut import = arg.splitn(2, char::is_whitespace);
            let file = import.next().unwrap_or("").to_string();
            let name = import
                .next()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string);
            Command::Import { file, name }
        }
        "DELETE" => Command::Delete(arg.to_string()),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

fn usage(cmd: &str) -> &'static str {
    match cmd {
        "GET" => "GET <id>",
        "CREATE" => "CREATE <name>",
        "IMPORT" => "IMPORT <file> [name]",
        _ => "DELETE <id>",
    }
}
