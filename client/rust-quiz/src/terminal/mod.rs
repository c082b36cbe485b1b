//! Line-oriented terminal front-end standing in for the web views.

pub mod hangman;
pub mod quiz;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

pub const QUIT_COMMAND: &str = ":q";
pub const RESTART_COMMAND: &str = ":r";

pub type InputLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Next non-empty input line, or `None` on end of input.
pub async fn read_input(lines: &mut InputLines) -> anyhow::Result<Option<String>> {
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(Some(trimmed.to_string()));
        }
    }
    Ok(None)
}
