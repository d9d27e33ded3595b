//! Domain methods for the CDrive API client.
//!
//! Request and response types come from `cdrive_core::models`.

use async_trait::async_trait;
use cdrive_core::models::{RenameRequest, VerifyRequest};
use cdrive_core::{
    admit, Acknowledgement, AuthPayload, ClientError, Credentials, FileResource, LoginResponse,
    UploadCandidate,
};

use crate::{ApiClient, ErrorScope, Gateway};

fn file_path(id: &str) -> String {
    format!("/files/{}", urlencoding::encode(id))
}

#[async_trait]
impl Gateway for ApiClient {
    async fn register(&self, credentials: &Credentials) -> Result<AuthPayload, ClientError> {
        self.post_json("/users/register", credentials, ErrorScope::Auth)
            .await
    }

    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ClientError> {
        self.post_json("/users/login", credentials, ErrorScope::Auth)
            .await
    }

    async fn verify_passcode(&self, email: &str, code: &str) -> Result<AuthPayload, ClientError> {
        let body = VerifyRequest {
            email: email.to_string(),
            otp_code: code.to_string(),
        };
        self.post_json("/users/verify", &body, ErrorScope::Verify)
            .await
    }

    async fn list_files(&self) -> Result<Vec<FileResource>, ClientError> {
        let files: Vec<FileResource> = self.get("/files", ErrorScope::Files).await?;
        tracing::debug!(count = files.len(), "Fetched file collection");
        Ok(files)
    }

    async fn upload_file(&self, candidate: &UploadCandidate) -> Result<FileResource, ClientError> {
        let admitted = admit(candidate)?;

        let form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(admitted.payload.to_vec())
                    .file_name(candidate.file_name.clone()),
            )
            .text("name", candidate.name.clone());

        let file: FileResource = self
            .post_multipart("/files/upload", form, ErrorScope::Files)
            .await?;
        tracing::info!(file_id = %file.id, size = candidate.byte_len(), "File uploaded");
        Ok(file)
    }

    async fn rename_file(&self, id: &str, new_name: &str) -> Result<FileResource, ClientError> {
        let body = RenameRequest {
            name: new_name.to_string(),
        };
        self.put_json(&file_path(id), &body, ErrorScope::Files)
            .await
    }

    async fn delete_file(&self, id: &str) -> Result<Acknowledgement, ClientError> {
        self.delete(&file_path(id), ErrorScope::Files).await
    }
}
