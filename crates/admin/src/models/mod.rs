//! Domain models for the admin service.
//!
//! Row-to-model conversion lives in `crate::db`; these types are what the
//! relay and the read controllers work with.

pub mod admin_key;
pub mod banned_user;
pub mod notice;
pub mod resource;
pub mod session;
pub mod syllabus;

pub use admin_key::{AdminKeyRecord, NewAdminKey};
pub use banned_user::{BannedUser, DEFAULT_BAN_REASON, NewBan};
pub use notice::{NewNotice, Notice, NoticeCounts, NoticeSort};
pub use resource::{NewResource, Resource, ResourceFilter, ResourceStats};
pub use session::{AdminSession, keys as session_keys};
pub use syllabus::{NewSyllabus, Syllabus, SyllabusFilter};
