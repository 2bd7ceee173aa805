//! Upload ingestion pipeline
//!
//! validate & parse → aggregate → persist + retain. Linear, no retries.
//! Parser failures return before anything touches the store; storage
//! failures leave nothing committed.

use crate::aggregate::aggregate;
use crate::db::{UploadStore, RETENTION_LIMIT};
use crate::models::UploadSummary;
use crate::tabular::{parse, ParseError, REQUIRED_COLUMNS};
use thiserror::Error;
use tracing::{error, info, warn};

/// Terminal failure of one ingestion
#[derive(Debug, Error)]
pub enum IngestError {
    /// Upload rejected by the parser (malformed, missing columns, empty)
    #[error(transparent)]
    Invalid(#[from] ParseError),

    /// Insert + retention could not complete; nothing was committed
    #[error("Error processing file: {0}")]
    StorageFailure(String),
}

/// Runs uploads through the pipeline into an [`UploadStore`]
#[derive(Clone)]
pub struct Ingestor {
    store: UploadStore,
    retention_limit: u32,
}

impl Ingestor {
    pub fn new(store: UploadStore) -> Self {
        Self {
            store,
            retention_limit: RETENTION_LIMIT,
        }
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Ingest one uploaded file
    pub async fn ingest(
        &self,
        raw_bytes: &[u8],
        filename: &str,
    ) -> Result<UploadSummary, IngestError> {
        let rows = parse(raw_bytes, &REQUIRED_COLUMNS).map_err(|e| {
            warn!("Rejected upload {}: {}", filename, e);
            e
        })?;

        let summary = aggregate(&rows);

        let upload = self
            .store
            .insert_retained(&summary, filename, self.retention_limit)
            .await
            .map_err(|e| {
                error!("Failed to store upload {}: {}", filename, e);
                IngestError::StorageFailure(e.to_string())
            })?;

        info!(
            "Ingested upload {} ({}): {} equipment rows",
            upload.id, upload.filename, upload.equipment_count
        );
        Ok(upload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use tempfile::TempDir;

    const HEADER: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n";

    async fn setup() -> (TempDir, Ingestor) {
        let dir = TempDir::new().unwrap();
        let pool = init_database(&dir.path().join("cev.db")).await.unwrap();
        (dir, Ingestor::new(UploadStore::new(pool)))
    }

    #[tokio::test]
    async fn test_end_to_end_three_rows() {
        let (_dir, ingestor) = setup().await;
        let csv = format!(
            "{}Pump A,Centrifugal,100,50,25\nPump B,Centrifugal,80,40,20\nValve C,Ball,10,5,2\n",
            HEADER
        );

        let upload = ingestor.ingest(csv.as_bytes(), "plant.csv").await.unwrap();

        assert_eq!(upload.filename, "plant.csv");
        assert_eq!(upload.equipment_count, 3);
        assert_eq!(format!("{:.2}", upload.avg_flowrate), "63.33");
        assert_eq!(upload.type_distribution.len(), 2);
        assert_eq!(upload.type_distribution["Centrifugal"], 2);
        assert_eq!(upload.type_distribution["Ball"], 1);
    }

    #[tokio::test]
    async fn test_validation_failure_persists_nothing() {
        let (_dir, ingestor) = setup().await;

        let err = ingestor
            .ingest(b"Equipment Name,Type,Flowrate,Pressure\nA,B,1,2\n", "bad.csv")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::Invalid(ParseError::MissingColumns { .. })
        ));

        let err = ingestor
            .ingest(format!("{}A,B,x,2,3\n", HEADER).as_bytes(), "empty.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Invalid(ParseError::EmptyDataset)));

        assert_eq!(ingestor.store().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_count_matches_valid_rows() {
        let (_dir, ingestor) = setup().await;
        let csv = format!(
            "{}A,X,1,1,1\nB,X,,1,1\nC,Y,2,2,2\nD,Y,3,nan,3\nE,Z,3,3,3\n",
            HEADER
        );

        let upload = ingestor.ingest(csv.as_bytes(), "mixed.csv").await.unwrap();
        assert_eq!(upload.equipment_count, 3);
        assert!((upload.avg_flowrate - 2.0).abs() < 1e-12);
        let total: u64 = upload.type_distribution.values().sum();
        assert_eq!(total, upload.equipment_count);
    }

    #[tokio::test]
    async fn test_large_values_serialize_as_numbers() {
        let (_dir, ingestor) = setup().await;
        let csv = format!("{}A,X,1e308,1,1\nB,X,1e308,1,1\n", HEADER);

        let upload = ingestor.ingest(csv.as_bytes(), "big.csv").await.unwrap();
        assert!(upload.avg_flowrate.is_finite());

        let json = serde_json::to_value(&upload).unwrap();
        assert_eq!(json["avg_flowrate"].as_f64(), Some(1e308));

        let stored = ingestor.store().get(upload.id).await.unwrap();
        assert_eq!(stored.avg_flowrate, 1e308);
    }

    #[tokio::test]
    async fn test_storage_failure_commits_nothing() {
        let (_dir, ingestor) = setup().await;
        let csv = format!("{}Pump,Centrifugal,1,2,3\n", HEADER);
        for i in 0..5 {
            ingestor
                .ingest(csv.as_bytes(), &format!("kept{}.csv", i))
                .await
                .unwrap();
        }
        let before = ingestor.store().list_recent(10).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_type_counts BEFORE INSERT ON upload_type_counts \
             BEGIN SELECT RAISE(ABORT, 'type counts unavailable'); END",
        )
        .execute(ingestor.store().pool())
        .await
        .unwrap();

        let err = ingestor
            .ingest(csv.as_bytes(), "lost.csv")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Error processing file: "));
        match err {
            IngestError::StorageFailure(msg) => assert!(msg.contains("type counts unavailable")),
            other => panic!("expected StorageFailure, got {:?}", other),
        }

        let after = ingestor.store().list_recent(10).await.unwrap();
        assert_eq!(after, before);
    }

    #[tokio::test]
    async fn test_history_cap_keeps_newest_five() {
        let (_dir, ingestor) = setup().await;
        let csv = format!("{}Pump,Centrifugal,1,2,3\n", HEADER);

        for i in 1..=7 {
            ingestor
                .ingest(csv.as_bytes(), &format!("upload{}.csv", i))
                .await
                .unwrap();
        }

        let recent = ingestor.store().list_recent(10).await.unwrap();
        let names: Vec<&str> = recent.iter().map(|u| u.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "upload7.csv",
                "upload6.csv",
                "upload5.csv",
                "upload4.csv",
                "upload3.csv"
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_ingestions_respect_cap() {
        let (_dir, ingestor) = setup().await;
        let csv = format!("{}Pump,Centrifugal,1,2,3\n", HEADER);

        let mut handles = Vec::new();
        for i in 0..12 {
            let ingestor = ingestor.clone();
            let csv = csv.clone();
            handles.push(tokio::spawn(async move {
                ingestor
                    .ingest(csv.as_bytes(), &format!("c{}.csv", i))
                    .await
                    .map(|u| u.id)
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }
        ids.sort_unstable();

        let recent = ingestor.store().list_recent(100).await.unwrap();
        assert_eq!(recent.len(), 5);
        let kept: Vec<i64> = recent.iter().map(|u| u.id).collect();
        let expected: Vec<i64> = ids.iter().rev().take(5).copied().collect();
        assert_eq!(kept, expected);
    }
}
