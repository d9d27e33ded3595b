//! Protected file view.
//!
//! Entry is gated on the session: without a token the caller gets
//! `AccessDenied` and should send the user to login. A token the server later
//! rejects is not re-checked here; it shows up as an error from the next call.

use std::sync::Arc;

use cdrive_api_client::Gateway;
use cdrive_core::{ClientError, FileResource, SessionStore};

use crate::collection::FileCollection;
use crate::notify::Notifier;
use crate::orchestrators::{
    Clipboard, DeleteOrchestrator, RenameOrchestrator, ShareOrchestrator, UploadController,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Not logged in")]
pub struct AccessDenied;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

/// One orchestrator of each kind lives as long as the dashboard, so busy
/// flags and duplicate-delete protection span every caller.
pub struct Dashboard<G: ?Sized> {
    session: Arc<dyn SessionStore>,
    notifier: Arc<dyn Notifier>,
    collection: Arc<FileCollection<G>>,
    uploader: Arc<UploadController<G>>,
    renamer: Arc<RenameOrchestrator<G>>,
    deleter: Arc<DeleteOrchestrator<G>>,
    search_term: String,
    view_mode: ViewMode,
}

impl<G: Gateway + ?Sized> Dashboard<G> {
    pub fn enter(
        session: Arc<dyn SessionStore>,
        gateway: Arc<G>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AccessDenied> {
        if !session.is_authenticated() {
            tracing::debug!("Dashboard entry rejected: no session token");
            return Err(AccessDenied);
        }

        let collection = Arc::new(FileCollection::new(gateway.clone()));
        Ok(Self {
            uploader: Arc::new(UploadController::new(
                gateway.clone(),
                collection.clone(),
                notifier.clone(),
            )),
            renamer: Arc::new(RenameOrchestrator::new(
                gateway.clone(),
                collection.clone(),
                notifier.clone(),
            )),
            deleter: Arc::new(DeleteOrchestrator::new(
                gateway,
                collection.clone(),
                notifier.clone(),
            )),
            collection,
            session,
            notifier,
            search_term: String::new(),
            view_mode: ViewMode::default(),
        })
    }

    pub fn collection(&self) -> &Arc<FileCollection<G>> {
        &self.collection
    }

    pub async fn refresh(&self) -> Result<Vec<FileResource>, ClientError> {
        self.collection.refresh().await
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    /// The cached collection narrowed by the current search term.
    pub fn visible_files(&self) -> Vec<FileResource> {
        self.collection.filter(&self.search_term)
    }

    pub fn uploader(&self) -> &Arc<UploadController<G>> {
        &self.uploader
    }

    pub fn renamer(&self) -> &Arc<RenameOrchestrator<G>> {
        &self.renamer
    }

    pub fn deleter(&self) -> &Arc<DeleteOrchestrator<G>> {
        &self.deleter
    }

    pub fn sharer(&self, clipboard: Arc<dyn Clipboard>) -> ShareOrchestrator {
        ShareOrchestrator::new(clipboard, self.notifier.clone())
    }

    /// Clear the session. The dashboard is consumed; re-entering requires a
    /// new login.
    pub fn logout(self) {
        self.session.clear_token();
        tracing::info!("Logged out");
    }
}
