use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use cdrive_api_client::Gateway;
use cdrive_core::{Acknowledgement, ClientError};

use super::{report_failure, resync};
use crate::collection::FileCollection;
use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteStatus {
    Deleted(Acknowledgement),
    /// A deletion of the same id is still outstanding; nothing was sent.
    AlreadyInFlight,
}

/// Marks an id busy for as long as it lives.
struct InFlight<'a> {
    ids: &'a Mutex<HashSet<String>>,
    id: String,
}

impl<'a> InFlight<'a> {
    fn acquire(ids: &'a Mutex<HashSet<String>>, id: &str) -> Option<Self> {
        let inserted = ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string());
        inserted.then(|| Self {
            ids,
            id: id.to_string(),
        })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

pub struct DeleteOrchestrator<G: ?Sized> {
    gateway: Arc<G>,
    collection: Arc<FileCollection<G>>,
    notifier: Arc<dyn Notifier>,
    in_flight: Mutex<HashSet<String>>,
}

impl<G: Gateway + ?Sized> DeleteOrchestrator<G> {
    pub fn new(
        gateway: Arc<G>,
        collection: Arc<FileCollection<G>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            collection,
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// True while a deletion of `id` is outstanding.
    pub fn is_deleting(&self, id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    /// The busy flag for `id` is cleared whether the deletion succeeds or fails.
    pub async fn delete(&self, id: &str) -> Result<DeleteStatus, ClientError> {
        let Some(_busy) = InFlight::acquire(&self.in_flight, id) else {
            tracing::debug!(file_id = %id, "Deletion already in flight");
            return Ok(DeleteStatus::AlreadyInFlight);
        };

        match self.gateway.delete_file(id).await {
            Ok(ack) => {
                tracing::info!(file_id = %id, "File deleted");
                resync(&self.collection, self.notifier.as_ref()).await;
                self.notifier.notify(Notification::success(
                    "File deleted",
                    "Your file has been successfully deleted.",
                ));
                Ok(DeleteStatus::Deleted(ack))
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), "Delete failed", &e);
                Err(e)
            }
        }
    }
}
