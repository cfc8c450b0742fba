//! StudySpace Core - Shared domain types and permission rules.
//!
//! This crate provides the types used across all StudySpace components:
//! - `admin` - Moderation service (relay, session store, read controllers)
//! - `cli` - Command-line tools for migrations and admin key management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. The permission evaluator lives here so the exact
//! same rules back both UI gating and the relay's server-side re-check.
//!
//! # Modules
//!
//! - [`types`] - Catalogs, identities, key hashes, ids, emails and statuses
//! - [`permissions`] - Scope predicates over an [`AdminIdentity`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod permissions;
pub mod types;

pub use types::*;
