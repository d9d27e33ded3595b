#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cdrive_api_client::Gateway;
use cdrive_app::{Clipboard, Notification, Notifier, ShareError};
use cdrive_core::{
    Acknowledgement, AuthPayload, ClientError, Credentials, FileKind, FileResource,
    LoginResponse, MemorySessionStore, SessionStore, UploadCandidate,
};
use tokio::sync::Notify;

pub const VALID_OTP: &str = "123456";
pub const ISSUED_TOKEN: &str = "abc";

pub fn file(id: &str, name: &str) -> FileResource {
    FileResource {
        id: id.to_string(),
        name: name.to_string(),
        url: format!("https://cdn.example.com/{}", id),
        kind: FileKind::Other,
    }
}

pub fn session() -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::new())
}

pub fn signed_in_session() -> Arc<dyn SessionStore> {
    let session = session();
    session.set_token(ISSUED_TOKEN);
    session
}

struct Account {
    password: String,
    verified: bool,
}

#[derive(Default)]
struct RemoteState {
    accounts: HashMap<String, Account>,
    files: Vec<FileResource>,
    next_id: u64,
    list_failure: Option<ClientError>,
    upload_failure: Option<ClientError>,
}

#[derive(Default)]
pub struct CallCounts {
    pub register: AtomicUsize,
    pub login: AtomicUsize,
    pub verify: AtomicUsize,
    pub list: AtomicUsize,
    pub upload: AtomicUsize,
    pub rename: AtomicUsize,
    pub delete: AtomicUsize,
}

impl CallCounts {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

/// In-memory stand-in for the remote API.
#[derive(Default)]
pub struct FakeGateway {
    state: Mutex<RemoteState>,
    pub calls: CallCounts,
    delete_gate: Option<Arc<Notify>>,
    list_gate: Option<Arc<Notify>>,
    upload_gate: Option<Arc<Notify>>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RemoteState {
                next_id: 1,
                ..RemoteState::default()
            }),
            ..Self::default()
        }
    }

    pub fn with_files(files: Vec<FileResource>) -> Self {
        let gateway = Self::new();
        {
            let mut state = gateway.state.lock().unwrap();
            state.next_id = files.len() as u64 + 1;
            state.files = files;
        }
        gateway
    }

    pub fn with_verified_user(self, email: &str, password: &str) -> Self {
        self.state.lock().unwrap().accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                verified: true,
            },
        );
        self
    }

    /// Hold every delete until `gate` is notified.
    pub fn with_delete_gate(mut self, gate: Arc<Notify>) -> Self {
        self.delete_gate = Some(gate);
        self
    }

    /// Hold every listing until `gate` is notified.
    pub fn with_list_gate(mut self, gate: Arc<Notify>) -> Self {
        self.list_gate = Some(gate);
        self
    }

    /// Hold every upload until `gate` is notified.
    pub fn with_upload_gate(mut self, gate: Arc<Notify>) -> Self {
        self.upload_gate = Some(gate);
        self
    }

    pub fn fail_uploads(&self, err: Option<ClientError>) {
        self.state.lock().unwrap().upload_failure = err;
    }

    pub fn fail_listing(&self, err: Option<ClientError>) {
        self.state.lock().unwrap().list_failure = err;
    }

    /// Change the remote collection behind the client's back.
    pub fn remote_insert(&self, file: FileResource) {
        self.state.lock().unwrap().files.push(file);
    }

    pub fn remote_files(&self) -> Vec<FileResource> {
        self.state.lock().unwrap().files.clone()
    }

    pub fn list_calls(&self) -> usize {
        CallCounts::get(&self.calls.list)
    }

    pub fn upload_calls(&self) -> usize {
        CallCounts::get(&self.calls.upload)
    }

    pub fn delete_calls(&self) -> usize {
        CallCounts::get(&self.calls.delete)
    }

    pub fn rename_calls(&self) -> usize {
        CallCounts::get(&self.calls.rename)
    }

    pub fn login_calls(&self) -> usize {
        CallCounts::get(&self.calls.login)
    }

    fn not_found() -> ClientError {
        ClientError::NotFound("File not found".to_string())
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn register(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError> {
        self.calls.register.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        if state.accounts.contains_key(&credentials.email) {
            return Err(ClientError::Auth("User already exists".to_string()));
        }
        state.accounts.insert(
            credentials.email.clone(),
            Account {
                password: credentials.password.clone(),
                verified: false,
            },
        );
        Ok(AuthPayload {
            message: Some("OTP sent".to_string()),
            ..AuthPayload::default()
        })
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        self.calls.login.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        match state.accounts.get(&credentials.email) {
            Some(account) if account.password == credentials.password => {
                if !account.verified {
                    return Err(ClientError::Auth("Please verify your email".to_string()));
                }
                Ok(LoginResponse {
                    token: ISSUED_TOKEN.to_string(),
                    extra: Default::default(),
                })
            }
            _ => Err(ClientError::Auth("invalid credentials".to_string())),
        }
    }

    async fn verify_passcode(&self, email: &str, code: &str) -> Result<AuthPayload, ClientError> {
        self.calls.verify.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let account = state
            .accounts
            .get_mut(email)
            .ok_or_else(|| ClientError::Auth("User not found".to_string()))?;
        if code != VALID_OTP {
            return Err(ClientError::Auth("Invalid OTP".to_string()));
        }
        account.verified = true;
        Ok(AuthPayload::default())
    }

    async fn list_files(&self) -> Result<Vec<FileResource>, ClientError> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.list_gate {
            gate.notified().await;
        }
        let state = self.state.lock().unwrap();
        match &state.list_failure {
            Some(err) => Err(err.clone()),
            None => Ok(state.files.clone()),
        }
    }

    async fn upload_file(&self, candidate: &UploadCandidate) -> Result<FileResource, ClientError> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.upload_gate {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        if let Some(err) = &state.upload_failure {
            return Err(err.clone());
        }
        let id = state.next_id.to_string();
        state.next_id += 1;
        let created = file(&id, &candidate.name);
        state.files.push(created.clone());
        Ok(created)
    }

    async fn rename_file(&self, id: &str, new_name: &str) -> Result<FileResource, ClientError> {
        self.calls.rename.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        let target = state
            .files
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(Self::not_found)?;
        target.name = new_name.to_string();
        Ok(target.clone())
    }

    async fn delete_file(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.delete_gate {
            gate.notified().await;
        }
        let mut state = self.state.lock().unwrap();
        let before = state.files.len();
        state.files.retain(|f| f.id != id);
        if state.files.len() == before {
            return Err(Self::not_found());
        }
        Ok(Acknowledgement {
            message: Some("File deleted".to_string()),
            ..Acknowledgement::default()
        })
    }
}

/// Collects notifications in order.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications().into_iter().map(|n| n.title).collect()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<Option<String>>,
    broken: bool,
}

impl FakeClipboard {
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().unwrap().clone()
    }
}

impl Clipboard for FakeClipboard {
    fn write_text(&self, text: &str) -> Result<(), ShareError> {
        if self.broken {
            return Err(ShareError::Clipboard("clipboard unavailable".to_string()));
        }
        *self.contents.lock().unwrap() = Some(text.to_string());
        Ok(())
    }
}
