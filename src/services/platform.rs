//! Host implementations of the two copy tiers.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use tracing::debug;

use super::clipboard::{ClipboardCapability, CopyCommand};
use crate::models::Document;

/// System clipboard through `arboard`.
pub struct ArboardClipboard;

impl ArboardClipboard {
    /// Probe the system clipboard once. `None` when it cannot be opened,
    /// e.g. on a headless machine without a display server.
    pub fn detect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(_) => Some(Self),
            Err(e) => {
                debug!(error = %e, "system clipboard unavailable");
                None
            }
        }
    }
}

#[async_trait]
impl ClipboardCapability for ArboardClipboard {
    fn name(&self) -> &str {
        "arboard"
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        let text = text.to_owned();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut clipboard =
                arboard::Clipboard::new().context("Failed to access system clipboard")?;
            clipboard
                .set_text(text)
                .context("Failed to copy text to clipboard")?;
            Ok(())
        })
        .await
        .context("Clipboard task did not complete")?
    }
}

/// Pipes the document selection into an external copy program.
///
/// Candidates are tried in order; the first one that is installed decides
/// the result.
pub struct SystemCopyCommand {
    candidates: Vec<Vec<String>>,
}

impl SystemCopyCommand {
    /// Use `argv` if given, else the platform's usual copy programs.
    pub fn new(argv: Option<Vec<String>>) -> Self {
        let candidates = match argv {
            Some(argv) if !argv.is_empty() => vec![argv],
            _ => platform_defaults(),
        };
        Self { candidates }
    }

    fn run(&self, program: &str, args: &[String], text: &str) -> Result<Option<bool>> {
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(program, "copy program not installed");
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to run {}", program)),
        };

        if let Some(mut stdin) = child.stdin.take() {
            // A program that exits without reading is judged by its status.
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    return Err(e).with_context(|| format!("Failed to write to {}", program));
                }
            }
        }

        let status = child
            .wait()
            .with_context(|| format!("Failed to wait for {}", program))?;
        debug!(program, %status, "copy program finished");
        Ok(Some(status.success()))
    }
}

impl CopyCommand for SystemCopyCommand {
    fn name(&self) -> &str {
        self.candidates
            .first()
            .and_then(|argv| argv.first())
            .map(String::as_str)
            .unwrap_or("copy")
    }

    fn copy_selection(&self, document: &Document) -> Result<bool> {
        let Some(selection) = document.selected_text() else {
            return Ok(false);
        };

        for argv in &self.candidates {
            let Some((program, args)) = argv.split_first() else {
                continue;
            };
            if let Some(copied) = self.run(program, args, selection)? {
                return Ok(copied);
            }
        }

        bail!("No copy command available")
    }
}

fn platform_defaults() -> Vec<Vec<String>> {
    let lists: &[&[&str]] = if cfg!(target_os = "macos") {
        &[&["pbcopy"]]
    } else if cfg!(windows) {
        &[&["clip"]]
    } else {
        &[
            &["wl-copy"],
            &["xclip", "-selection", "clipboard"],
            &["xsel", "--clipboard", "--input"],
        ]
    };

    lists
        .iter()
        .map(|argv| argv.iter().map(|s| s.to_string()).collect())
        .collect()
}
