use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::extractor::ClientInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One mutation to be recorded
#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub user_id: Uuid,
    pub action: AuditAction,
    pub table_name: &'a str,
    pub record_id: i32,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub client: &'a ClientInfo,
}

impl<'a> AuditEntry<'a> {
    pub fn created(
        user_id: Uuid,
        table_name: &'a str,
        record_id: i32,
        new_data: serde_json::Value,
        client: &'a ClientInfo,
    ) -> Self {
        Self {
            user_id,
            action: AuditAction::Create,
            table_name,
            record_id,
            old_data: None,
            new_data: Some(new_data),
            client,
        }
    }

    pub fn updated(
        user_id: Uuid,
        table_name: &'a str,
        record_id: i32,
        old_data: serde_json::Value,
        new_data: serde_json::Value,
        client: &'a ClientInfo,
    ) -> Self {
        Self {
            user_id,
            action: AuditAction::Update,
            table_name,
            record_id,
            old_data: Some(old_data),
            new_data: Some(new_data),
            client,
        }
    }

    pub fn deleted(
        user_id: Uuid,
        table_name: &'a str,
        record_id: i32,
        old_data: serde_json::Value,
        client: &'a ClientInfo,
    ) -> Self {
        Self {
            user_id,
            action: AuditAction::Delete,
            table_name,
            record_id,
            old_data: Some(old_data),
            new_data: None,
            client,
        }
    }
}

/// audit_log row joined with the acting user
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogRow {
    pub id: i32,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_nama: Option<String>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<i32>,
    pub old_data: Option<serde_json::Value>,
    pub new_data: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// JSON snapshot of a record for the old/new audit columns
pub fn snapshot<T: Serialize>(record: &T) -> serde_json::Value {
    serde_json::to_value(record).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_labels() {
        assert_eq!(AuditAction::Create.as_str(), "CREATE");
        assert_eq!(AuditAction::Update.to_string(), "UPDATE");
        assert_eq!(serde_json::to_value(AuditAction::Delete).unwrap(), "DELETE");
    }

    #[test]
    fn test_entry_constructors_set_snapshots() {
        let client = ClientInfo::default();
        let user = Uuid::now_v7();

        let created = AuditEntry::created(user, "zona_taman", 3, serde_json::json!({"id": 3}), &client);
        assert_eq!(created.action, AuditAction::Create);
        assert!(created.old_data.is_none() && created.new_data.is_some());

        let deleted = AuditEntry::deleted(user, "zona_taman", 3, serde_json::json!({"id": 3}), &client);
        assert_eq!(deleted.action, AuditAction::Delete);
        assert!(deleted.old_data.is_some() && deleted.new_data.is_none());
    }

    #[test]
    fn test_snapshot_serializes_record() {
        #[derive(Serialize)]
        struct Zona {
            id: i32,
            nama_zona: &'static str,
        }
        let value = snapshot(&Zona { id: 7, nama_zona: "Zona Inti" });
        assert_eq!(value["nama_zona"], "Zona Inti");
    }
}
