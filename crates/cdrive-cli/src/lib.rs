//! Terminal rendering for the `cdrive` binary.

use std::io::Write;

use cdrive_app::{Notification, NotificationLevel, Notifier, ViewMode};
use cdrive_core::FileResource;

/// Truncate to `max_len` characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// A failure the notifier has already shown. The binary exits non-zero
/// without printing it a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("failure already reported")]
pub struct Reported;

pub fn already_reported(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Reported>().is_some()
}

/// Initialize tracing. Logs go to stderr so command output stays clean.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Prints notifications as single status lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let line = format_notification(&notification);
        match notification.level {
            NotificationLevel::Success => println!("{}", line),
            NotificationLevel::Failure => eprintln!("{}", line),
        }
    }
}

pub fn format_notification(notification: &Notification) -> String {
    let marker = match notification.level {
        NotificationLevel::Success => "ok",
        NotificationLevel::Failure => "error",
    };
    format!(
        "[{}] {}: {}",
        marker, notification.title, notification.description
    )
}

const GRID_COLUMNS: usize = 3;
const GRID_CELL: usize = 28;

/// Render files in the requested view mode.
pub fn render_files(files: &[FileResource], mode: ViewMode) -> String {
    if files.is_empty() {
        return "No files found.\n".to_string();
    }

    let mut out = Vec::new();
    match mode {
        ViewMode::List => {
            let _ = writeln!(
                out,
                "{:<24} {:<9} {:<30} {}",
                "ID", "Type", "Name", "URL"
            );
            let _ = writeln!(out, "{}", "-".repeat(100));
            for file in files {
                let _ = writeln!(
                    out,
                    "{:<24} {:<9} {:<30} {}",
                    truncate_string(&file.id, 24),
                    file.kind,
                    truncate_string(&file.name, 30),
                    file.url
                );
            }
        }
        ViewMode::Grid => {
            for row in files.chunks(GRID_COLUMNS) {
                let cells: Vec<String> = row
                    .iter()
                    .map(|file| {
                        let label = format!("[{}] {}", file.kind, file.name);
                        format!("{:<width$}", truncate_string(&label, GRID_CELL), width = GRID_CELL)
                    })
                    .collect();
                let _ = writeln!(out, "{}", cells.join("  ").trim_end());
            }
        }
    }
    let _ = writeln!(out, "\n{} file(s)", files.len());

    String::from_utf8_lossy(&out).into_owned()
}
