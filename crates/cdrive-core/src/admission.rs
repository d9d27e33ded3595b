//! Upload admission control.
//!
//! A candidate is checked before any network transfer: first that a payload was
//! supplied, then that it fits under the size ceiling. The gateway repeats the
//! same check right before building the request.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Component, Path};

use bytes::Bytes;

use crate::error::ValidationError;

/// Largest accepted upload, inclusive (10 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file picked for upload, alive only for one admit-then-submit cycle.
#[derive(Debug, Clone, Default)]
pub struct UploadCandidate {
    pub payload: Option<Bytes>,
    /// Original file name, sent with the multipart `file` part.
    pub file_name: String,
    /// User-supplied display name.
    pub name: String,
}

impl UploadCandidate {
    pub fn new(
        payload: impl Into<Bytes>,
        file_name: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let name = display_name(name.into(), &file_name);
        Self {
            payload: Some(payload.into()),
            file_name,
            name,
        }
    }

    /// Candidate with no payload selected.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            payload: None,
            file_name: String::new(),
            name: name.into(),
        }
    }

    /// Read a local file. Paths containing `..` are rejected, a missing file
    /// is `MissingFile`, and nothing past the size ceiling is ever read.
    pub fn from_path(path: &Path, name: Option<&str>) -> Result<Self, ValidationError> {
        if path.components().any(|c| c == Component::ParentDir) {
            return Err(ValidationError::InvalidInput(format!(
                "Invalid input: {}",
                path.display()
            )));
        }

        let read_error = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => ValidationError::MissingFile,
            _ => ValidationError::InvalidInput(format!(
                "Failed to read file {}: {}",
                path.display(),
                e
            )),
        };

        let file = File::open(path).map_err(read_error)?;
        let declared = file.metadata().map_err(read_error)?.len();
        if declared > MAX_UPLOAD_BYTES {
            tracing::debug!(
                size = declared,
                path = %path.display(),
                "Upload rejected before reading"
            );
            return Err(ValidationError::SizeExceeded {
                size: declared,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        // Devices and pipes report no length, so the read itself is capped too.
        let mut buffer = Vec::with_capacity(declared as usize);
        file.take(MAX_UPLOAD_BYTES + 1)
            .read_to_end(&mut buffer)
            .map_err(read_error)?;
        if buffer.len() as u64 > MAX_UPLOAD_BYTES {
            return Err(ValidationError::SizeExceeded {
                size: buffer.len() as u64,
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.bin")
            .to_string();

        Ok(Self::new(buffer, file_name, name.unwrap_or_default()))
    }

    /// Byte length of the payload, zero when none was supplied.
    pub fn byte_len(&self) -> u64 {
        self.payload.as_ref().map_or(0, |p| p.len() as u64)
    }
}

fn display_name(name: String, file_name: &str) -> String {
    if name.trim().is_empty() {
        file_name.to_string()
    } else {
        name
    }
}

/// Proof that a candidate passed admission.
#[derive(Debug, Clone)]
pub struct AdmittedUpload<'a> {
    pub candidate: &'a UploadCandidate,
    pub payload: &'a Bytes,
}

/// Check a candidate against the admission policy, short-circuiting on the
/// first failure.
pub fn admit(candidate: &UploadCandidate) -> Result<AdmittedUpload<'_>, ValidationError> {
    let payload = candidate.payload.as_ref().ok_or(ValidationError::MissingFile)?;

    let size = payload.len() as u64;
    if size > MAX_UPLOAD_BYTES {
        tracing::debug!(size, limit = MAX_UPLOAD_BYTES, "Upload rejected by size ceiling");
        return Err(ValidationError::SizeExceeded {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }

    Ok(AdmittedUpload { candidate, payload })
}
