use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use veriguard_application::{
    NewVerificationLogEntry, VerificationLogEntry, VerificationLogQuery, VerificationLogRepository,
};
use veriguard_core::{AppError, AppResult};

/// PostgreSQL-backed verification log.
#[derive(Clone)]
pub struct PostgresVerificationLogRepository {
    pool: PgPool,
}

impl PostgresVerificationLogRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct VerificationRow {
    id: i64,
    token_ref: String,
    page: Option<String>,
    success: bool,
    ip_address: Option<String>,
    user_agent: Option<String>,
    device: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<VerificationRow> for VerificationLogEntry {
    fn from(row: VerificationRow) -> Self {
        Self {
            id: row.id,
            token_ref: row.token_ref,
            page: row.page,
            success: row.success,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            device: row.device,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl VerificationLogRepository for PostgresVerificationLogRepository {
    async fn append_entry(&self, entry: NewVerificationLogEntry) -> AppResult<VerificationLogEntry> {
        let row = sqlx::query_as::<_, VerificationRow>(
            r#"
            INSERT INTO verifications (token_ref, page, success, ip_address, user_agent, device)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, token_ref, page, success, ip_address, user_agent, device, created_at
            "#,
        )
        .bind(entry.token_ref)
        .bind(entry.page)
        .bind(entry.success)
        .bind(entry.ip_address)
        .bind(entry.user_agent)
        .bind(entry.device)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to append verification log entry: {error}"))
        })?;

        Ok(row.into())
    }

    async fn list_entries(
        &self,
        query: &VerificationLogQuery,
    ) -> AppResult<(Vec<VerificationLogEntry>, u64)> {
        let rows = sqlx::query_as::<_, VerificationRow>(
            r#"
            SELECT id, token_ref, page, success, ip_address, user_agent, device, created_at
            FROM verifications
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
                AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
                AND ($3::BOOLEAN IS NULL OR success = $3)
                AND ($4::TEXT IS NULL OR page = $4)
            ORDER BY created_at DESC, id DESC
            LIMIT $5
            OFFSET $6
            "#,
        )
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.success)
        .bind(query.page.as_deref())
        .bind(i64::from(query.limit))
        .bind(i64::from(query.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list verification log entries: {error}"))
        })?;

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM verifications
            WHERE ($1::TIMESTAMPTZ IS NULL OR created_at >= $1)
                AND ($2::TIMESTAMPTZ IS NULL OR created_at <= $2)
                AND ($3::BOOLEAN IS NULL OR success = $3)
                AND ($4::TEXT IS NULL OR page = $4)
            "#,
        )
        .bind(query.start_date)
        .bind(query.end_date)
        .bind(query.success)
        .bind(query.page.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count verification log entries: {error}"))
        })?;

        Ok((
            rows.into_iter().map(VerificationLogEntry::from).collect(),
            u64::try_from(total).unwrap_or_default(),
        ))
    }
}

/// Applies the verification log schema migrations.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))
}
