//! Typed boundary to the remote file/user API.
//!
//! Components that need remote data depend on this trait rather than on
//! `ApiClient`, so tests can substitute an in-memory implementation.

use async_trait::async_trait;
use cdrive_core::{
    Acknowledgement, AuthPayload, ClientError, Credentials, FileResource, LoginResponse,
    UploadCandidate,
};

/// The remote operations available to the client.
///
/// Each call is a suspension point; nothing else in the client awaits.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// `POST /users/register`
    async fn register(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError>;

    /// `POST /users/login`
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError>;

    /// `POST /users/verify`
    async fn verify_passcode(&self, email: &str, code: &str) -> Result<AuthPayload, ClientError>;

    /// `GET /files`, in server order.
    async fn list_files(&self) -> Result<Vec<FileResource>, ClientError>;

    /// `POST /files/upload`. Re-checks admission before sending.
    async fn upload_file(&self, candidate: &UploadCandidate) -> Result<FileResource, ClientError>;

    /// `PUT /files/{id}`
    async fn rename_file(&self, id: &str, new_name: &str) -> Result<FileResource, ClientError>;

    /// `DELETE /files/{id}`
    async fn delete_file(&self, id: &str) -> Result<Acknowledgement, ClientError>;
}
