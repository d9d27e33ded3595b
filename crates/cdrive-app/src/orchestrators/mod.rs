//! Per-operation coordinators for user-triggered mutations.
//!
//! Each one attempts the gateway call, refreshes the collection only after the
//! call succeeded, and reports the outcome through a `Notifier`. A failed call
//! leaves the collection untouched. Nothing is retried automatically.

mod delete;
mod rename;
mod share;
mod upload;

pub use delete::{DeleteOrchestrator, DeleteStatus};
pub use rename::{RenameDraft, RenameOrchestrator};
pub use share::{Clipboard, ShareError, ShareOrchestrator};
pub use upload::UploadController;

#[cfg(feature = "clipboard")]
pub use share::SystemClipboard;

use cdrive_api_client::Gateway;
use cdrive_core::{ClientError, ErrorMetadata, LogLevel};

use crate::collection::FileCollection;
use crate::notify::{Notification, Notifier};

/// Refetch after a successful mutation. A failed refresh is reported but does
/// not turn the mutation into a failure.
async fn resync<G: Gateway + ?Sized>(
    collection: &FileCollection<G>,
    notifier: &dyn Notifier,
) {
    if let Err(e) = collection.refresh().await {
        notifier.notify(Notification::failure("Refresh failed", e.to_string()));
    }
}

fn report_failure(notifier: &dyn Notifier, title: &str, err: &ClientError) {
    let code = err.error_code();
    match err.log_level() {
        LogLevel::Debug => tracing::debug!(error_code = code, error = %err, "{}", title),
        LogLevel::Warn => tracing::warn!(error_code = code, error = %err, "{}", title),
        LogLevel::Error => tracing::error!(error_code = code, error = %err, "{}", title),
    }
    notifier.notify(Notification::failure(title, err.client_message()));
}
