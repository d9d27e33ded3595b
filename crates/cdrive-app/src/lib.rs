//! CDrive client core.
//!
//! Keeps the local view of the user's files consistent with the remote store.
//! Every mutation follows the same shape: call the gateway, and only after the
//! response arrives refetch the full collection. There is no local patching, so
//! the displayed collection is always one the server actually returned.
//!
//! The presentation layer owns rendering; it calls into the flows and
//! orchestrators here and displays their results, errors and notifications.

pub mod auth_flow;
pub mod collection;
pub mod dashboard;
pub mod notify;
pub mod orchestrators;

pub use auth_flow::{FlowOutcome, LoginFlow, Navigation, RegisterFlow, RegisterStage};
pub use collection::{filter_files, FileCollection};
pub use dashboard::{AccessDenied, Dashboard, ViewMode};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use orchestrators::{
    Clipboard, DeleteOrchestrator, DeleteStatus, RenameDraft, RenameOrchestrator,
    ShareError, ShareOrchestrator, UploadController,
};

#[cfg(feature = "clipboard")]
pub use orchestrators::SystemClipboard;
