//! Data models for the client
//!
//! Wire shapes exchanged with the remote file/user API, grouped by domain.

mod auth;
mod file;

pub use auth::*;
pub use file::*;
