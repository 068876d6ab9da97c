//! In-memory car park table
//!
//! Owned by the ingestion side, which upserts records as feeds refresh.
//! Request handlers only ever see owned snapshots via [`CarParkSource`].

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{
    CarParkFeedRecord, CarParkRecord, CarParkSource, IngestError, Svy21Converter,
};

/// Concurrent table of located car parks keyed by car park id.
pub struct InMemoryCarParkTable {
    records: DashMap<String, CarParkRecord>,
    last_refreshed: RwLock<Option<DateTime<Utc>>>,
}

pub type SharedCarParkTable = Arc<InMemoryCarParkTable>;

impl InMemoryCarParkTable {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            last_refreshed: RwLock::new(None),
        }
    }

    pub fn shared() -> SharedCarParkTable {
        Arc::new(Self::new())
    }

    /// Insert or replace one located record.
    pub fn upsert(&self, record: CarParkRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn remove(&self, id: &str) -> Option<CarParkRecord> {
        self.records.remove(id).map(|(_, record)| record)
    }

    pub fn get(&self, id: &str) -> Option<CarParkRecord> {
        self.records.get(id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.last_refreshed.read().await
    }

    /// Resolve feed positions and reconcile duplicates into the table.
    ///
    /// A record whose id is already present keeps its address, type and
    /// location; only its lot details are overlaid with the newer report.
    /// Returns the number of feed records applied.
    pub async fn ingest<I>(&self, feed: I, converter: &Svy21Converter) -> usize
    where
        I: IntoIterator<Item = CarParkFeedRecord>,
    {
        let mut applied = 0;
        let mut merged = 0;
        for feed_record in feed {
            applied += 1;
            match self.records.get_mut(&feed_record.id) {
                Some(mut existing) => {
                    existing.merge_lots(feed_record.lot_details);
                    merged += 1;
                }
                None => {
                    let record = feed_record.into_record(converter);
                    self.records.insert(record.id.clone(), record);
                }
            }
        }

        *self.last_refreshed.write().await = Some(Utc::now());
        debug!(applied, merged, total = self.records.len(), "Car park feed ingested");
        applied
    }

    /// Ingest a JSON array of [`CarParkFeedRecord`]s from disk.
    pub async fn load_seed_file(
        &self,
        path: &Path,
        converter: &Svy21Converter,
    ) -> Result<usize, IngestError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let feed: Vec<CarParkFeedRecord> = serde_json::from_str(&raw)?;
        let applied = self.ingest(feed, converter).await;
        info!(
            path = %path.display(),
            applied,
            total = self.records.len(),
            "Car park seed data loaded"
        );
        Ok(applied)
    }
}

impl Default for InMemoryCarParkTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CarParkSource for InMemoryCarParkTable {
    fn snapshot(&self) -> Vec<CarParkRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::domain::{GeoPoint, LotAvailability, RecordPosition, SurveyGridPoint};

    fn lots(lot_type: &str, available: &str) -> BTreeMap<String, LotAvailability> {
        BTreeMap::from([(
            lot_type.to_string(),
            LotAvailability {
                total_lots: "100".to_string(),
                available_lots: available.to_string(),
            },
        )])
    }

    fn feed(id: &str, position: RecordPosition, lot_details: BTreeMap<String, LotAvailability>) -> CarParkFeedRecord {
        CarParkFeedRecord {
            id: id.to_string(),
            address: format!("{id} address"),
            car_park_type: "SURFACE CAR PARK".to_string(),
            position,
            lot_details,
        }
    }

    #[tokio::test]
    async fn ingest_resolves_grid_positions() {
        let table = InMemoryCarParkTable::new();
        let converter = Svy21Converter::svy21();

        table
            .ingest(
                vec![feed(
                    "ACB",
                    RecordPosition::NeedsConversion(SurveyGridPoint::new(38_744.572, 28_001.642)),
                    lots("C", "10"),
                )],
                &converter,
            )
            .await;

        let record = table.get("ACB").unwrap();
        assert_abs_diff_eq!(record.location.latitude, 1.366666, epsilon = 1e-6);
        assert!(table.last_refreshed().await.is_some());
    }

    #[tokio::test]
    async fn duplicate_ids_are_reconciled() {
        let table = InMemoryCarParkTable::new();
        let converter = Svy21Converter::svy21();
        let first = GeoPoint::new(1.30, 103.85);

        let applied = table
            .ingest(
                vec![
                    feed("BM29", RecordPosition::Located(first), lots("C", "5")),
                    feed(
                        "BM29",
                        RecordPosition::Located(GeoPoint::new(1.0, 100.0)),
                        lots("Y", "2"),
                    ),
                ],
                &converter,
            )
            .await;

        assert_eq!(applied, 2);
        assert_eq!(table.len(), 1);
        let record = table.get("BM29").unwrap();
        assert_eq!(record.location, first);
        assert_eq!(record.lot_details.len(), 2);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_writes() {
        let table = InMemoryCarParkTable::new();
        let converter = Svy21Converter::svy21();
        table
            .ingest(
                vec![feed("A1", RecordPosition::Located(GeoPoint::new(1.3, 103.8)), lots("C", "1"))],
                &converter,
            )
            .await;

        let snapshot = table.snapshot();
        table.remove("A1");
        table
            .ingest(
                vec![feed("A2", RecordPosition::Located(GeoPoint::new(1.3, 103.8)), lots("C", "1"))],
                &converter,
            )
            .await;

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, "A1");
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn seed_file_round_trip() {
        let dir = std::env::temp_dir().join(format!("sweetspot-seed-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("car_parks.json");
        let body = serde_json::json!([
            {
                "carParkID": "T1",
                "address": "1 Test Ave",
                "carParkType": "BASEMENT CAR PARK",
                "position": { "located": { "latitude": 1.3, "longitude": 103.8 } },
                "lotDetails": { "C": { "totalLots": "50", "availableLots": "20" } }
            },
            {
                "carParkID": "T2",
                "position": { "needsConversion": { "northing": 30000.0, "easting": 30000.0 } }
            }
        ]);
        tokio::fs::write(&path, body.to_string()).await.unwrap();

        let table = InMemoryCarParkTable::new();
        let applied = table
            .load_seed_file(&path, &Svy21Converter::svy21())
            .await
            .unwrap();

        assert_eq!(applied, 2);
        assert_eq!(table.get("T1").unwrap().lot_details["C"].total_lots, "50");
        assert!(table.get("T2").unwrap().lot_details.is_empty());

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn malformed_seed_file_is_a_parse_error() {
        let path = std::env::temp_dir().join(format!("sweetspot-bad-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&path, "{not json").await.unwrap();

        let err = InMemoryCarParkTable::new()
            .load_seed_file(&path, &Svy21Converter::svy21())
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::Parse(_)));

        tokio::fs::remove_file(&path).await.unwrap();
    }
}
