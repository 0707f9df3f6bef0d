//! Console session
//!
//! Reads commands line by line and writes responses back. Store calls are
//! blocking, so each command runs on tokio's blocking pool.

use std::sync::Arc;

use log::{debug, info};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::console::handlers::{CommandStatus, handle_command};
use crate::console::parser::parse_command;
use crate::storage::AppStore;

/// Serve commands from `reader` until QUIT or end of input.
pub async fn run_session<R, W>(
    store: Arc<AppStore>,
    reader: R,
    mut writer: W,
) -> Result<(), std::io::Error>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();

    writer.write_all(b"220 App store ready\n").await?;
    writer.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = parse_command(&line);
        debug!("Console command: {:?}", command);

        let store = Arc::clone(&store);
        let result = tokio::task::spawn_blocking(move || handle_command(&store, command))
            .await
            .map_err(std::io::Error::other)?;

        writer.write_all(result.message.as_bytes()).await?;
        writer.flush().await?;

        if result.status == CommandStatus::Quit {
            break;
        }
    }

    info!("Console session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    #[tokio::test]
    async fn test_session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(AppStore::open(dir.path()).unwrap());

        let input: &[u8] = b"CREATE Demo\n\nLIST\nQUIT\nLIST\n";
        let mut output = Vec::new();
        run_session(Arc::clone(&store), BufReader::new(input), &mut output)
            .await
            .unwrap();

        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "220 App store ready");
        assert!(lines[1].starts_with("257 Created "));
        assert!(lines[2].contains("Demo"));
        assert_eq!(lines[3], "226 1 apps");
        assert_eq!(lines[4], "221 Goodbye");
        assert_eq!(lines.len(), 5);
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
