use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::audit::dtos::AuditLogQuery;
use crate::features::audit::models::{AuditEntry, AuditLogRow};
use crate::shared::types::PaginationQuery;

pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Write an audit entry on the caller's connection (normally an open transaction)
    pub async fn record(conn: &mut PgConnection, entry: AuditEntry<'_>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log
                (user_id, action, table_name, record_id, old_data, new_data, ip_address, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(entry.table_name)
        .bind(entry.record_id)
        .bind(entry.old_data)
        .bind(entry.new_data)
        .bind(entry.client.ip_address.as_deref())
        .bind(entry.client.user_agent.as_deref())
        .execute(conn)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to write audit log for {} {}: {:?}",
                entry.table_name,
                entry.record_id,
                e
            );
            AppError::Database(e)
        })?;

        tracing::info!(
            "Audit {} {} id={} by {}",
            entry.action,
            entry.table_name,
            entry.record_id,
            entry.user_id
        );
        Ok(())
    }

    /// List audit entries, newest first
    pub async fn list(
        &self,
        query: &AuditLogQuery,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AuditLogRow>, i64)> {
        let rows = sqlx::query_as::<_, AuditLogRow>(
            r#"
            SELECT
                a.id, a.user_id, u.email AS user_email, u.nama AS user_nama,
                a.action, a.table_name, a.record_id, a.old_data, a.new_data,
                a.ip_address, a.user_agent, a.created_at
            FROM audit_log a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::text IS NULL OR a.table_name = $1)
              AND ($2::int4 IS NULL OR a.record_id = $2)
              AND ($3::timestamptz IS NULL OR a.created_at >= $3)
              AND ($4::timestamptz IS NULL OR a.created_at <= $4)
            ORDER BY a.created_at DESC, a.id DESC
            OFFSET $5 LIMIT $6
            "#,
        )
        .bind(query.table_name.as_deref())
        .bind(query.record_id)
        .bind(query.date_from)
        .bind(query.date_to)
        .bind(pagination.offset())
        .bind(pagination.limit())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch audit logs: {:?}", e);
            AppError::Database(e)
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM audit_log a
            WHERE ($1::text IS NULL OR a.table_name = $1)
              AND ($2::int4 IS NULL OR a.record_id = $2)
              AND ($3::timestamptz IS NULL OR a.created_at >= $3)
              AND ($4::timestamptz IS NULL OR a.created_at <= $4)
            "#,
        )
        .bind(query.table_name.as_deref())
        .bind(query.record_id)
        .bind(query.date_from)
        .bind(query.date_to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count audit logs: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((rows, total))
    }
}
