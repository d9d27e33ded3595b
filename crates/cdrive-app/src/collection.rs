//! In-memory file collection for the current session.
//!
//! The collection is replaced wholesale by each successful refresh and is never
//! patched locally. A failed refresh keeps the previous contents.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use cdrive_api_client::Gateway;
use cdrive_core::{ClientError, FileResource};

/// Case-insensitive substring match on `name`, preserving order.
/// An empty term keeps every file.
pub fn filter_files(files: &[FileResource], term: &str) -> Vec<FileResource> {
    let needle = term.to_lowercase();
    files
        .iter()
        .filter(|file| file.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Keeps the loading counter raised while a refresh is pending, including
/// when the refresh future is dropped before completing.
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

pub struct FileCollection<G: ?Sized> {
    gateway: Arc<G>,
    files: RwLock<Vec<FileResource>>,
    pending_refreshes: AtomicUsize,
}

impl<G: Gateway + ?Sized> FileCollection<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            files: RwLock::new(Vec::new()),
            pending_refreshes: AtomicUsize::new(0),
        }
    }

    /// Refetch the full collection from the gateway.
    ///
    /// Overlapping refreshes are not serialized: whichever response lands last
    /// determines the contents.
    pub async fn refresh(&self) -> Result<Vec<FileResource>, ClientError> {
        let _loading = LoadingGuard::enter(&self.pending_refreshes);

        match self.gateway.list_files().await {
            Ok(files) => {
                *self.files.write().unwrap_or_else(PoisonError::into_inner) = files.clone();
                tracing::debug!(count = files.len(), "File collection refreshed");
                Ok(files)
            }
            Err(e) => {
                tracing::warn!(
                    error_type = e.error_type(),
                    error = %e,
                    "File collection refresh failed, keeping previous contents"
                );
                Err(e)
            }
        }
    }

    /// True while at least one refresh is pending.
    pub fn is_loading(&self) -> bool {
        self.pending_refreshes.load(Ordering::SeqCst) > 0
    }

    /// Snapshot of the last successfully fetched collection, in server order.
    pub fn files(&self) -> Vec<FileResource> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Files whose name contains `term`, ignoring case. Never triggers a refresh.
    pub fn filter(&self, term: &str) -> Vec<FileResource> {
        let files = self.files.read().unwrap_or_else(PoisonError::into_inner);
        filter_files(&files, term)
    }

    pub fn get(&self, id: &str) -> Option<FileResource> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|file| file.id == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cdrive_core::FileKind;

    fn file(id: &str, name: &str) -> FileResource {
        FileResource {
            id: id.to_string(),
            name: name.to_string(),
            url: format!("https://cdn.example.com/{}", id),
            kind: FileKind::Other,
        }
    }

    #[test]
    fn empty_term_returns_everything_in_order() {
        let files = vec![file("1", "b.txt"), file("2", "a.txt"), file("3", "c.txt")];
        assert_eq!(filter_files(&files, ""), files);
    }

    #[test]
    fn filter_is_case_insensitive_and_order_preserving() {
        let files = vec![
            file("1", "Holiday.PNG"),
            file("2", "notes.txt"),
            file("3", "holiday-2.png"),
        ];
        let ids: Vec<String> = filter_files(&files, "HOLIDAY")
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn filter_without_match_is_empty() {
        let files = vec![file("1", "notes.txt")];
        assert!(filter_files(&files, "zip").is_empty());
    }

    #[test]
    fn loading_guard_balances_counter() {
        let counter = AtomicUsize::new(0);
        {
            let _a = LoadingGuard::enter(&counter);
            let _b = LoadingGuard::enter(&counter);
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }
}
