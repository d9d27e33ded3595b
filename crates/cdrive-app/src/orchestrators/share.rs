use std::sync::Arc;

use cdrive_core::FileResource;

use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShareError {
    #[error("Failed to copy link: {0}")]
    Clipboard(String),
}

/// Destination for copied share links.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ShareError>;
}

/// The desktop clipboard.
#[cfg(feature = "clipboard")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(feature = "clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<(), ShareError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ShareError::Clipboard(e.to_string()))?;
        clipboard
            .set_text(text.to_owned())
            .map_err(|e| ShareError::Clipboard(e.to_string()))
    }
}

/// Copies a file's share link. Purely local: no gateway call, no refresh.
pub struct ShareOrchestrator {
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
}

impl ShareOrchestrator {
    pub fn new(clipboard: Arc<dyn Clipboard>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clipboard,
            notifier,
        }
    }

    pub fn share(&self, file: &FileResource) -> Result<(), ShareError> {
        match self.clipboard.write_text(&file.url) {
            Ok(()) => {
                self.notifier.notify(Notification::success(
                    "Link copied!",
                    "The file link has been copied to your clipboard.",
                ));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(file_id = %file.id, error = %e, "Failed to copy link");
                self.notifier
                    .notify(Notification::failure("Failed to copy link", e.to_string()));
                Err(e)
            }
        }
    }
}
