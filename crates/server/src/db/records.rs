//! `PostgreSQL` implementation of [`RecordStore`].
//!
//! The upsert is one `INSERT ... ON CONFLICT DO UPDATE` statement, so the
//! lookup and the write cannot interleave with another request for the same
//! `(owner_id, client_id)`. The `CASE` arms mirror [`Record::apply`]: only the
//! sub-type columns of the incoming category are overwritten.

use async_trait::async_trait;
use uuid::Uuid;

use babytrack_core::{ClientRecordId, RecordKind, UserId};

use super::{PgStore, RecordStore, RepositoryError};
use crate::models::{Record, RecordFields};

const RECORD_COLUMNS: &str = "owner_id, client_id, event_date, event_time, kind, \
     feeding_type, diaper_type, details, amount, event_timestamp";

#[derive(sqlx::FromRow)]
struct RecordRow {
    owner_id: Uuid,
    client_id: i64,
    event_date: String,
    event_time: String,
    kind: String,
    feeding_type: Option<String>,
    diaper_type: Option<String>,
    details: Option<String>,
    amount: Option<f64>,
    event_timestamp: i64,
}

impl TryFrom<RecordRow> for Record {
    type Error = RepositoryError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<RecordKind>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid record kind in database: {e}"))
        })?;

        Ok(Self {
            owner: UserId::new(row.owner_id),
            id: ClientRecordId::new(row.client_id),
            date: row.event_date,
            time: row.event_time,
            kind,
            feeding_type: row.feeding_type,
            diaper_type: row.diaper_type,
            details: row.details,
            amount: row.amount,
            timestamp: row.event_timestamp,
        })
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn upsert(
        &self,
        owner: UserId,
        id: ClientRecordId,
        fields: RecordFields,
    ) -> Result<Record, RepositoryError> {
        let (feeding_type, amount) = fields.feeding_parts();
        let sql = format!(
            r"
            INSERT INTO records ({RECORD_COLUMNS})
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (owner_id, client_id) DO UPDATE SET
                event_date = EXCLUDED.event_date,
                event_time = EXCLUDED.event_time,
                kind = EXCLUDED.kind,
                feeding_type = CASE WHEN EXCLUDED.kind = 'feeding'
                    THEN EXCLUDED.feeding_type ELSE records.feeding_type END,
                amount = CASE WHEN EXCLUDED.kind = 'feeding'
                    THEN EXCLUDED.amount ELSE records.amount END,
                diaper_type = CASE WHEN EXCLUDED.kind = 'diaper'
                    THEN EXCLUDED.diaper_type ELSE records.diaper_type END,
                details = EXCLUDED.details,
                event_timestamp = EXCLUDED.event_timestamp
            RETURNING {RECORD_COLUMNS}
            "
        );

        let row: RecordRow = sqlx::query_as(&sql)
            .bind(owner)
            .bind(id)
            .bind(&fields.date)
            .bind(&fields.time)
            .bind(fields.kind.as_str())
            .bind(feeding_type)
            .bind(fields.diaper_part())
            .bind(fields.details.as_deref())
            .bind(amount)
            .bind(fields.timestamp)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Record>, RepositoryError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM records WHERE owner_id = $1 \
             ORDER BY event_timestamp DESC, client_id"
        );

        let rows: Vec<RecordRow> = sqlx::query_as(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Record::try_from).collect()
    }

    async fn delete_by_owner_and_id(
        &self,
        owner: UserId,
        id: ClientRecordId,
    ) -> Result<Option<Record>, RepositoryError> {
        let sql = format!(
            "DELETE FROM records WHERE owner_id = $1 AND client_id = $2 \
             RETURNING {RECORD_COLUMNS}"
        );

        let row: Option<RecordRow> = sqlx::query_as(&sql)
            .bind(owner)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Record::try_from).transpose()
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
