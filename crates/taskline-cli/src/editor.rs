//! Interactive editing support
//!
//! Opens $EDITOR on an entry description and asks for confirmation before
//! destructive commands.

use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::process::Command;

/// Lines starting with this marker are dropped from the edited text
const COMMENT_MARKER: char = '#';

const EDIT_HINT: &str = "\n\
# Edit the entry description above.\n\
# Lines starting with '#' are ignored. An empty description aborts the edit.\n";

/// Edit a description in the user's preferred editor
///
/// The description is written to a temporary file followed by a short
/// comment block. Returns the edited text with comment lines removed and
/// surrounding whitespace trimmed.
pub fn edit_description(current: &str) -> Result<String> {
    let editor = find_editor()?;

    let temp_path = env::temp_dir().join(format!("taskline_entry_{}.txt", std::process::id()));
    fs::write(&temp_path, format!("{}\n{}", current, EDIT_HINT))
        .with_context(|| format!("Failed to create temp file: {:?}", temp_path))?;

    let status = Command::new(&editor)
        .arg(&temp_path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor));

    let content = match status {
        Ok(status) if status.success() => fs::read_to_string(&temp_path)
            .with_context(|| format!("Failed to read edited file: {:?}", temp_path)),
        Ok(_) => Err(anyhow::anyhow!(
            "Editor '{}' exited with non-zero status, description left unchanged",
            editor
        )),
        Err(e) => Err(e),
    };

    let _ = fs::remove_file(&temp_path);

    Ok(strip_comments(&content?))
}

/// Drop comment lines and trim the result
fn strip_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with(COMMENT_MARKER))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Find the user's preferred editor
fn find_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.is_empty() {
                return Ok(editor);
            }
        }
    }

    if let Some(editor) = ["nano", "vim", "vi"]
        .into_iter()
        .find(|editor| command_exists(editor))
    {
        return Ok(editor.to_string());
    }

    bail!(
        "No editor found. Set $EDITOR or pass --description.\n\
         Example: export EDITOR=nano"
    )
}

fn command_exists(cmd: &str) -> bool {
    Command::new("which")
        .arg(cmd)
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Ask a yes/no question on stdin
///
/// Without a TTY on stdin the answer is always no.
pub fn confirm(prompt: &str) -> Result<bool> {
    if !atty::is(atty::Stream::Stdin) {
        return Ok(false);
    }

    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_comments() {
        let edited = format!("call the dentist\n{}", EDIT_HINT);
        assert_eq!(strip_comments(&edited), "call the dentist");
    }

    #[test]
    fn test_strip_comments_keeps_multiline_text() {
        let edited = "  first line\n# note\nsecond line\n\n";
        assert_eq!(strip_comments(edited), "first line\nsecond line");
    }

    #[test]
    fn test_only_comments_is_empty() {
        assert_eq!(strip_comments(EDIT_HINT), "");
    }

    #[test]
    fn test_command_exists() {
        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }
}
