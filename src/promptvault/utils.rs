use std::fs::File;
use std::io::{Write, Read, stdin, stdout};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::env::var;

use crossterm::{
    style::{Attribute, SetAttribute},
    execute,
    tty::IsTty,
};
use tempfile::Builder;

use crate::specific_fail_str;
use crate::errors::{Result, Error, ErrorKind};

pub use libc::{STDIN_FILENO, STDOUT_FILENO};

/// folder name used under the home directory when nothing else is set
pub static VAULT_FOLDER_NAME: &'static str = ".promptvault";

pub fn istty(fd: i32) -> bool {
    match fd {
        STDOUT_FILENO => stdout().is_tty(),
        STDIN_FILENO => stdin().is_tty(),
        _ => false,
    }
}

pub fn termsize() -> usize {
    if let Ok((cols, _rows)) = crossterm::terminal::size() {
        cols as usize
    } else {
        0
    }
}

/// current wall-clock time in milliseconds since the epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub fn drop_to_editor(contents: &str) -> Result<String> {
    let tmpfile = Builder::new()
        .prefix("promptvault")
        .suffix(".txt")
        .rand_bytes(5)
        .tempfile()?;

    let tmppath = tmpfile.path().to_owned();

    {
        let mut file = File::create(&tmppath)?;
        file.write_all(contents.as_bytes())?;
    }

    let editor = var("VISUAL").or_else(|_| var("EDITOR"))
        .unwrap_or_else(|_| "nano".to_string());

    let mut editor_command = Command::new(&editor);
    editor_command.arg(&tmppath.display().to_string());
    editor_command.stdin(Stdio::inherit());
    editor_command.stdout(Stdio::inherit());
    editor_command.stderr(Stdio::inherit());

    let mut editor_proc = editor_command.spawn().map_err(|e| Error {
        kind: ErrorKind::Generic,
        desc: format!("Failed to start editor '{}': {}", editor, e),
        detail: None,
    })?;

    match editor_proc.wait() {
        Ok(status) if status.success() => {
            let mut file = File::open(&tmppath)?;
            let mut content = String::new();
            file.read_to_string(&mut content)?;
            Ok(content)
        }
        _ => specific_fail_str!("The editor process failed."),
    }
}

pub fn pretty_line(bold: &str, plain: &str, tty: bool) -> Result<()> {
    let mut stdout = stdout();
    if tty {
        execute!(stdout, SetAttribute(Attribute::Bold))?;
    }
    print!("{}", bold);
    if tty {
        execute!(stdout, SetAttribute(Attribute::Reset))?;
    }
    print!("{}", plain);
    Ok(())
}

pub fn format_field(value: &str, width: usize, truncate: bool) -> String {
    if value.chars().count() > width && width > 3 && truncate {
        format!("{: <1$.1$}...", value, width - 3)
    } else {
        format!("{: <1$.1$}", value, width)
    }
}

/// Resolve the vault folder: an explicit folder wins, otherwise
/// `~/.promptvault`, which may also be a file naming the real folder.
pub fn find_vault_folder(vault_folder: &Option<String>) -> Result<PathBuf> {
    if let Some(vf) = vault_folder {
        return Ok(PathBuf::from(vf));
    }
    match dirs::home_dir() {
        Some(p) => {
            let default_path = p.join(VAULT_FOLDER_NAME);
            if default_path.is_file() {
                let mut file = File::open(&default_path)?;
                let mut contents = String::new();
                file.read_to_string(&mut contents)?;
                let trimmed = contents.trim();
                if trimmed.is_empty() {
                    return specific_fail_str!("~/.promptvault is a file but is empty. It should contain a path to the vault folder.");
                }
                Ok(PathBuf::from(trimmed))
            } else {
                Ok(default_path)
            }
        }
        None => specific_fail_str!("failed to find your home directory"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_field_pads_and_truncates() {
        assert_eq!(format_field("id", 4, false), "id  ");
        assert_eq!(format_field("a long prompt", 8, true), "a lon...");
        assert_eq!(format_field("a long prompt", 3, true), "a l");
        assert_eq!(format_field("exact", 5, true), "exact");
    }

    #[test]
    fn explicit_vault_folder_wins() {
        let folder = find_vault_folder(&Some("/tmp/vault".to_string())).unwrap();
        assert_eq!(folder, PathBuf::from("/tmp/vault"));
    }

    #[test]
    fn clock_is_in_milliseconds() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000);
    }
}
