//! Audit trail of garden data mutations.
//!
//! Every create/update/delete on gardens, zones, collections, media and
//! articles writes one `audit_log` row inside the same transaction as the
//! change, carrying before/after JSON snapshots.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use models::{snapshot, AuditEntry};
pub use services::AuditService;
