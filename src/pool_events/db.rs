use super::store::PoolEventStore;
use crate::types::{Amount, EventType, PoolEvent};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::{eyre, WrapErr};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

/// Rows per INSERT statement (12 binds per row, well under the 65535 limit).
const INSERT_CHUNK: usize = 1000;

/// Checkpoint table holds a single row.
const CHECKPOINT_ROW: i32 = 0;

/// A PoolEvent with its integers narrowed to the column types.
struct PoolEventRow<'a> {
    id: &'a str,
    event_type: &'static str,
    to_address: Option<&'a str>,
    sender_address: Option<&'a str>,
    signer_address: Option<&'a str>,
    block_height: i32,
    index_in_block: i32,
    amount1: Option<&'a str>, // decimal string, cast to NUMERIC in SQL
    amount2: Option<&'a str>,
    amount_in1: Option<&'a str>,
    amount_in2: Option<&'a str>,
    timestamp: DateTime<Utc>,
}

impl<'a> TryFrom<&'a PoolEvent> for PoolEventRow<'a> {
    type Error = eyre::Report;

    fn try_from(event: &'a PoolEvent) -> eyre::Result<Self> {
        Ok(Self {
            id: &event.id,
            event_type: event.event_type.as_str(),
            to_address: event.to_address.as_deref(),
            sender_address: event.sender_address.as_deref(),
            signer_address: event.signer_address.as_deref(),
            block_height: i32::try_from(event.block_height)
                .wrap_err_with(|| format!("block height {} out of range", event.block_height))?,
            index_in_block: i32::try_from(event.index_in_block).wrap_err_with(|| {
                format!("index in block {} out of range", event.index_in_block)
            })?,
            amount1: event.amount1.as_ref().map(Amount::as_str),
            amount2: event.amount2.as_ref().map(Amount::as_str),
            amount_in1: event.amount_in1.as_ref().map(Amount::as_str),
            amount_in2: event.amount_in2.as_ref().map(Amount::as_str),
            timestamp: event.timestamp,
        })
    }
}

pub struct PoolEventDb {
    pool: PgPool,
}

impl PoolEventDb {
    pub async fn new(database_url: &str) -> eyre::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .min_connections(1)
            .acquire_timeout(Duration::from_secs(60))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> eyre::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pool_event (
                id              CHARACTER VARYING NOT NULL,
                "type"          CHARACTER VARYING(8) NOT NULL,
                to_address      TEXT,
                sender_address  TEXT,
                signer_address  TEXT,
                block_height    INTEGER NOT NULL,
                index_in_block  INTEGER NOT NULL,
                amount1         NUMERIC,
                amount2         NUMERIC,
                amount_in1      NUMERIC,
                amount_in2      NUMERIC,
                "timestamp"     TIMESTAMP WITH TIME ZONE NOT NULL,
                CONSTRAINT pool_event_pkey PRIMARY KEY (id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for (index, column) in [
            ("idx_pool_event_type", "\"type\""),
            ("idx_pool_event_to_address", "to_address"),
            ("idx_pool_event_sender_address", "sender_address"),
            ("idx_pool_event_signer_address", "signer_address"),
            ("idx_pool_event_block_height", "block_height"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {index} ON pool_event ({column})"
            ))
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pool_event_checkpoint (
                id      INTEGER PRIMARY KEY,
                height  BIGINT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Last occurrence of each id, in delivery order. One INSERT .. ON CONFLICT
/// statement cannot touch the same row twice.
fn latest_by_id(events: &[PoolEvent]) -> Vec<&PoolEvent> {
    let mut seen = HashSet::with_capacity(events.len());
    let mut latest: Vec<&PoolEvent> = events
        .iter()
        .rev()
        .filter(|event| seen.insert(event.id.as_str()))
        .collect();
    latest.reverse();
    latest
}

fn event_from_row(row: &PgRow) -> eyre::Result<PoolEvent> {
    let event_type: String = row.try_get("type")?;
    let amount = |column: &str| -> eyre::Result<Option<Amount>> {
        row.try_get::<Option<String>, _>(column)?
            .map(|value| value.parse::<Amount>().map_err(|e| eyre!(e)))
            .transpose()
    };

    Ok(PoolEvent {
        id: row.try_get("id")?,
        event_type: event_type.parse::<EventType>().map_err(|e| eyre!(e))?,
        to_address: row.try_get("to_address")?,
        sender_address: row.try_get("sender_address")?,
        signer_address: row.try_get("signer_address")?,
        block_height: u64::try_from(row.try_get::<i32, _>("block_height")?)?,
        index_in_block: u32::try_from(row.try_get::<i32, _>("index_in_block")?)?,
        amount1: amount("amount1")?,
        amount2: amount("amount2")?,
        amount_in1: amount("amount_in1")?,
        amount_in2: amount("amount_in2")?,
        timestamp: row.try_get("timestamp")?,
    })
}

#[async_trait]
impl PoolEventStore for PoolEventDb {
    /// Upsert in one transaction together with the checkpoint.
    async fn save(&self, events: &[PoolEvent], checkpoint: u64) -> eyre::Result<()> {
        let rows = latest_by_id(events)
            .into_iter()
            .map(PoolEventRow::try_from)
            .collect::<eyre::Result<Vec<_>>>()?;
        let checkpoint = i64::try_from(checkpoint)?;

        let mut tx = self.pool.begin().await?;

        for chunk in rows.chunks(INSERT_CHUNK) {
            let mut qb = sqlx::QueryBuilder::new(
                r#"INSERT INTO pool_event (id, "type", to_address, sender_address, signer_address, block_height, index_in_block, amount1, amount2, amount_in1, amount_in2, "timestamp") "#,
            );

            qb.push_values(chunk, |mut b, r| {
                b.push_bind(r.id)
                    .push_bind(r.event_type)
                    .push_bind(r.to_address)
                    .push_bind(r.sender_address)
                    .push_bind(r.signer_address)
                    .push_bind(r.block_height)
                    .push_bind(r.index_in_block)
                    .push_bind(r.amount1)
                    .push_unseparated("::NUMERIC")
                    .push_bind(r.amount2)
                    .push_unseparated("::NUMERIC")
                    .push_bind(r.amount_in1)
                    .push_unseparated("::NUMERIC")
                    .push_bind(r.amount_in2)
                    .push_unseparated("::NUMERIC")
                    .push_bind(r.timestamp);
            });

            qb.push(
                r#" ON CONFLICT (id) DO UPDATE SET
                    "type" = EXCLUDED."type",
                    to_address = EXCLUDED.to_address,
                    sender_address = EXCLUDED.sender_address,
                    signer_address = EXCLUDED.signer_address,
                    block_height = EXCLUDED.block_height,
                    index_in_block = EXCLUDED.index_in_block,
                    amount1 = EXCLUDED.amount1,
                    amount2 = EXCLUDED.amount2,
                    amount_in1 = EXCLUDED.amount_in1,
                    amount_in2 = EXCLUDED.amount_in2,
                    "timestamp" = EXCLUDED."timestamp""#,
            );
            qb.build().execute(&mut *tx).await?;
        }

        sqlx::query(
            "INSERT INTO pool_event_checkpoint (id, height) VALUES ($1, $2) \
             ON CONFLICT (id) DO UPDATE SET height = EXCLUDED.height",
        )
        .bind(CHECKPOINT_ROW)
        .bind(checkpoint)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn fetch(&self, id: &str) -> eyre::Result<Option<PoolEvent>> {
        let row = sqlx::query(
            r#"
            SELECT id, "type", to_address, sender_address, signer_address,
                   block_height, index_in_block,
                   amount1::TEXT AS amount1, amount2::TEXT AS amount2,
                   amount_in1::TEXT AS amount_in1, amount_in2::TEXT AS amount_in2,
                   "timestamp"
            FROM pool_event
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(event_from_row).transpose()
    }

    async fn checkpoint(&self) -> eyre::Result<Option<u64>> {
        let height: Option<i64> =
            sqlx::query_scalar("SELECT height FROM pool_event_checkpoint WHERE id = $1")
                .bind(CHECKPOINT_ROW)
                .fetch_optional(&self.pool)
                .await?;

        height.map(u64::try_from).transpose().map_err(Into::into)
    }
}
