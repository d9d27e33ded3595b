//! CDrive Core Library
//!
//! This crate provides the domain models, error taxonomy, configuration, session
//! storage and upload admission rules shared by every CDrive client component.

pub mod admission;
pub mod config;
pub mod error;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use admission::{admit, AdmittedUpload, UploadCandidate, MAX_UPLOAD_BYTES};
pub use config::ClientConfig;
pub use error::{ClientError, ErrorMetadata, LogLevel, ValidationError};
pub use models::{
    Acknowledgement, AuthPayload, Credentials, FileKind, FileResource, LoginResponse,
};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, TOKEN_KEY};
