//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Secret-key login and the admin session store
//! - `relay` - Re-authenticated privileged mutations
//! - `storage` - Best-effort removal of orphaned stored files
//! - `uploads` - File validation and forwarding to the file host

pub mod auth;
pub mod relay;
pub mod storage;
pub mod uploads;

pub use auth::{AdminSessionStore, AuthError};
pub use relay::{Relay, RelayError, RelayOutcome};
pub use storage::{StorageClient, StorageError};
pub use uploads::{FileHostClient, UploadError, UploadFile, UploadFolder};
