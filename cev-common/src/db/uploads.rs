//! Upload summary store with bounded history
//!
//! The store is the only writer of `uploads` and `upload_type_counts`.
//! Writes run inside one SQLite transaction and are additionally serialized
//! through an in-process mutex shared by every clone of the store, so an
//! insert and the retention pass that follows it are observed together or
//! not at all.

use crate::aggregate::Summary;
use crate::models::UploadSummary;
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Number of uploads kept in history
pub const RETENTION_LIMIT: u32 = 5;

type UploadRecord = (i64, String, String, i64, f64, f64, f64);

const SELECT_UPLOADS: &str = "SELECT id, filename, uploaded_at, equipment_count, \
     avg_flowrate, avg_pressure, avg_temperature FROM uploads";

/// Persistent collection of [`UploadSummary`] records
#[derive(Clone)]
pub struct UploadStore {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl UploadStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Append a summary, assigning id and timestamp
    pub async fn insert(&self, summary: &Summary, filename: &str) -> Result<UploadSummary> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let upload = insert_upload(&mut tx, summary, filename).await?;
        tx.commit().await?;
        Ok(upload)
    }

    /// Delete all but the `limit` most recent uploads
    ///
    /// Idempotent: a second call with nothing inserted in between deletes
    /// nothing. Returns the number of uploads removed.
    pub async fn enforce_retention(&self, limit: u32) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let deleted = delete_beyond(&mut tx, limit).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    /// Insert and apply retention as one unit
    ///
    /// Either both take effect or neither does. The returned record may be
    /// evicted later by another ingestion's retention pass.
    pub async fn insert_retained(
        &self,
        summary: &Summary,
        filename: &str,
        limit: u32,
    ) -> Result<UploadSummary> {
        let _guard = self.write_lock.lock().await;
        let mut tx = self.pool.begin().await?;
        let upload = insert_upload(&mut tx, summary, filename).await?;
        let deleted = delete_beyond(&mut tx, limit).await?;
        tx.commit().await?;

        if deleted > 0 {
            info!("Retention removed {} upload(s), keeping {}", deleted, limit);
        }
        Ok(upload)
    }

    /// Most recent uploads, newest first, at most `n`
    pub async fn list_recent(&self, n: u32) -> Result<Vec<UploadSummary>> {
        let mut tx = self.pool.begin().await?;

        let records: Vec<UploadRecord> = sqlx::query_as(&format!(
            "{} ORDER BY uploaded_at DESC, id DESC LIMIT ?",
            SELECT_UPLOADS
        ))
        .bind(n as i64)
        .fetch_all(&mut *tx)
        .await?;

        let mut uploads = Vec::with_capacity(records.len());
        for record in records {
            let distribution = load_distribution(&mut tx, record.0).await?;
            uploads.push(to_summary(record, distribution)?);
        }

        tx.commit().await?;
        Ok(uploads)
    }

    /// Fetch one upload by id
    pub async fn get(&self, id: i64) -> Result<UploadSummary> {
        let mut tx = self.pool.begin().await?;

        let record: Option<UploadRecord> =
            sqlx::query_as(&format!("{} WHERE id = ?", SELECT_UPLOADS))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let record = record.ok_or_else(|| Error::NotFound(format!("upload {}", id)))?;

        let distribution = load_distribution(&mut tx, record.0).await?;
        tx.commit().await?;
        to_summary(record, distribution)
    }

    /// Fetch the most recently inserted upload
    pub async fn latest(&self) -> Result<UploadSummary> {
        self.list_recent(1)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound("no uploads stored".to_string()))
    }

    /// Number of stored uploads
    pub async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uploads")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

async fn insert_upload(
    conn: &mut SqliteConnection,
    summary: &Summary,
    filename: &str,
) -> Result<UploadSummary> {
    // Never hand out a timestamp older than the newest stored one, so
    // timestamp order always agrees with insertion order.
    let newest: Option<String> = sqlx::query_scalar("SELECT MAX(uploaded_at) FROM uploads")
        .fetch_one(&mut *conn)
        .await?;
    let mut uploaded_at = Utc::now().trunc_subsecs(6);
    if let Some(newest) = newest {
        let newest = parse_timestamp(&newest)?;
        if newest > uploaded_at {
            uploaded_at = newest;
        }
    }

    let id = sqlx::query(
        r#"
        INSERT INTO uploads (
            filename, uploaded_at, equipment_count,
            avg_flowrate, avg_pressure, avg_temperature
        ) VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(filename)
    .bind(format_timestamp(&uploaded_at))
    .bind(summary.equipment_count as i64)
    .bind(summary.avg_flowrate)
    .bind(summary.avg_pressure)
    .bind(summary.avg_temperature)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    for (equipment_type, count) in &summary.type_distribution {
        sqlx::query(
            "INSERT INTO upload_type_counts (upload_id, equipment_type, count) VALUES (?, ?, ?)",
        )
        .bind(id)
        .bind(equipment_type)
        .bind(*count as i64)
        .execute(&mut *conn)
        .await?;
    }

    debug!("Inserted upload {} ({})", id, filename);

    Ok(UploadSummary {
        id,
        filename: filename.to_string(),
        uploaded_at,
        equipment_count: summary.equipment_count,
        avg_flowrate: summary.avg_flowrate,
        avg_pressure: summary.avg_pressure,
        avg_temperature: summary.avg_temperature,
        type_distribution: summary.type_distribution.clone(),
    })
}

async fn delete_beyond(conn: &mut SqliteConnection, limit: u32) -> Result<u64> {
    const STALE_IDS: &str = "SELECT id FROM uploads \
         ORDER BY uploaded_at DESC, id DESC LIMIT -1 OFFSET ?";

    sqlx::query(&format!(
        "DELETE FROM upload_type_counts WHERE upload_id IN ({})",
        STALE_IDS
    ))
    .bind(limit as i64)
    .execute(&mut *conn)
    .await?;

    let deleted = sqlx::query(&format!("DELETE FROM uploads WHERE id IN ({})", STALE_IDS))
        .bind(limit as i64)
        .execute(&mut *conn)
        .await?
        .rows_affected();

    Ok(deleted)
}

async fn load_distribution(
    conn: &mut SqliteConnection,
    upload_id: i64,
) -> Result<BTreeMap<String, u64>> {
    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT equipment_type, count FROM upload_type_counts WHERE upload_id = ?",
    )
    .bind(upload_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(equipment_type, count)| (equipment_type, count as u64))
        .collect())
}

fn to_summary(
    record: UploadRecord,
    type_distribution: BTreeMap<String, u64>,
) -> Result<UploadSummary> {
    let (id, filename, uploaded_at, equipment_count, avg_flowrate, avg_pressure, avg_temperature) =
        record;

    Ok(UploadSummary {
        id,
        filename,
        uploaded_at: parse_timestamp(&uploaded_at)?,
        equipment_count: equipment_count as u64,
        avg_flowrate,
        avg_pressure,
        avg_temperature,
        type_distribution,
    })
}

/// Fixed-width RFC 3339 so text order matches time order
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid uploaded_at '{}': {}", value, e)))
}
