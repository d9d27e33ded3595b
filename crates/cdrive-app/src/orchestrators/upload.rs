use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cdrive_api_client::Gateway;
use cdrive_core::{admit, ClientError, FileResource, UploadCandidate};

use super::{report_failure, resync};
use crate::collection::FileCollection;
use crate::notify::{Notification, Notifier};

/// Counts one pending upload until dropped.
struct UploadingGuard<'a>(&'a AtomicUsize);

impl<'a> UploadingGuard<'a> {
    fn enter(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self(pending)
    }
}

impl Drop for UploadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Admits a candidate locally, submits it, then refreshes the collection.
pub struct UploadController<G: ?Sized> {
    gateway: Arc<G>,
    collection: Arc<FileCollection<G>>,
    notifier: Arc<dyn Notifier>,
    pending_uploads: AtomicUsize,
}

impl<G: Gateway + ?Sized> UploadController<G> {
    pub fn new(
        gateway: Arc<G>,
        collection: Arc<FileCollection<G>>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            collection,
            notifier,
            pending_uploads: AtomicUsize::new(0),
        }
    }

    /// True while at least one upload is outstanding.
    pub fn is_uploading(&self) -> bool {
        self.pending_uploads.load(Ordering::SeqCst) > 0
    }

    /// Rejected candidates never reach the gateway.
    pub async fn upload(&self, candidate: UploadCandidate) -> Result<FileResource, ClientError> {
        if let Err(rejection) = admit(&candidate) {
            let err = ClientError::from(rejection);
            report_failure(self.notifier.as_ref(), "Upload Failed", &err);
            return Err(err);
        }

        let _uploading = UploadingGuard::enter(&self.pending_uploads);

        match self.gateway.upload_file(&candidate).await {
            Ok(file) => {
                resync(&self.collection, self.notifier.as_ref()).await;
                self.notifier.notify(Notification::success(
                    "Upload Successful",
                    "Your file has been uploaded successfully!",
                ));
                Ok(file)
            }
            Err(e) => {
                report_failure(self.notifier.as_ref(), "Upload Failed", &e);
                Err(e)
            }
        }
    }
}
