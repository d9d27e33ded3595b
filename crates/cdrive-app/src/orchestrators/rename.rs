use std::sync::Arc;

use cdrive_api_client::Gateway;
use cdrive_core::{ClientError, FileResource, ValidationError};

use super::{report_failure, resync};
use crate::collection::FileCollection;
use crate::notify::{Notification, Notifier};

/// Local editing state for one file's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameDraft {
    file_id: String,
    original: String,
    draft: String,
    editing: bool,
}

impl RenameDraft {
    pub fn new(file: &FileResource) -> Self {
        Self {
            file_id: file.id.clone(),
            original: file.name.clone(),
            draft: file.name.clone(),
            editing: false,
        }
    }

    pub fn begin(&mut self) {
        self.editing = true;
    }

    pub fn set_draft(&mut self, name: impl Into<String>) {
        self.draft = name.into();
    }

    /// Leave editing mode and discard the draft.
    pub fn cancel(&mut self) {
        self.editing = false;
        self.draft = self.original.clone();
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }
}

pub struct RenameOrchestrator<G: ?Sized> {
    gateway: Arc<G>,
    collection: Arc<FileCollection<G>>,
    notifier: Arc<dyn Notifier>,
}

impl<G: Gateway + ?Sized> RenameOrchestrator<G> {
    pub fn new(
        gateway: Arc<G>,
        collection: Arc<FileCollection<G>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            collection,
            notifier,
        }
    }

    /// Submit the draft exactly as typed. On success the draft leaves editing
    /// mode; on failure it is kept as-is so the user can retry.
    pub async fn rename(&self, draft: &mut RenameDraft) -> Result<FileResource, ClientError> {
        let new_name = draft.draft.clone();
        if new_name.trim().is_empty() {
            let err = ClientError::from(ValidationError::InvalidInput(
                "File name cannot be empty".to_string(),
            ));
            report_failure(self.notifier.as_ref(), "Update failed", &err);
            return Err(err);
        }

        match self.gateway.rename_file(&draft.file_id, &new_name).await {
            Ok(file) => {
                draft.editing = false;
                draft.original = file.name.clone();
                draft.draft = file.name.clone();
                tracing::info!(file_id = %file.id, "File renamed");
                resync(&self.collection, self.notifier.as_ref()).await;
                self.notifier.notify(Notification::success(
                    "File updated",
                    "Your file has been successfully renamed.",
                ));
                Ok(file)
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), "Update failed", &e);
                Err(e)
            }
        }
    }
}
