use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::audit::models::AuditLogRow;

/// Filters for the audit log listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AuditLogQuery {
    /// Table the change was made on (e.g. `taman_kehati`)
    pub table_name: Option<String>,
    pub record_id: Option<i32>,
    /// Inclusive lower bound on `created_at`
    pub date_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditUserDto {
    pub id: Uuid,
    pub email: Option<String>,
    pub nama: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponseDto {
    pub id: i32,
    pub user: Option<AuditUserDto>,
    pub action: String,
    pub table_name: String,
    pub record_id: Option<i32>,
    #[schema(value_type = Option<Object>)]
    pub old_data: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub new_data: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AuditLogRow> for AuditLogResponseDto {
    fn from(row: AuditLogRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id.map(|id| AuditUserDto {
                id,
                email: row.user_email,
                nama: row.user_nama,
            }),
            action: row.action,
            table_name: row.table_name,
            record_id: row.record_id,
            old_data: row.old_data,
            new_data: row.new_data,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            created_at: row.created_at,
        }
    }
}
