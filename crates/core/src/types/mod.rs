//! Core types for StudySpace.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod identity;
pub mod key_hash;
pub mod status;

pub use catalog::{CatalogError, Department, NoticeTarget};
pub use email::{Email, EmailError};
pub use id::*;
pub use identity::AdminIdentity;
pub use key_hash::KeyHash;
pub use status::*;
