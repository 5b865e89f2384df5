mod audit_log;

pub use audit_log::{snapshot, AuditAction, AuditEntry, AuditLogRow};
