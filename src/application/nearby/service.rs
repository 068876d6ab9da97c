//! Nearby search: pre-filter car parks, enrich both categories concurrently

use std::sync::Arc;

use tracing::{info, warn};

use super::aggregator::{BatchOutcome, BoundedAggregator, Enriched};
use super::prefilter::SpatialPreFilter;
use crate::domain::{AggregationError, CarParkRecord, CarParkSource, EvLotCandidate, GeoPoint};

/// What the client asked for.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    /// Origin of every computed route.
    pub current_user_location: GeoPoint,
    /// Center of the car park radius search.
    pub searched_location: GeoPoint,
    pub ev_candidates: Vec<EvLotCandidate>,
}

pub type EnrichedEvLot = Enriched<EvLotCandidate>;
pub type EnrichedCarPark = Enriched<CarParkRecord>;

/// Per-category outcomes of one search. Entry order is unspecified.
#[derive(Debug, Clone)]
pub struct AggregationResult {
    pub ev_lots: BatchOutcome<EnrichedEvLot>,
    pub car_parks: BatchOutcome<EnrichedCarPark>,
}

impl AggregationResult {
    /// Wire names of the categories whose batch failed.
    pub fn failed_categories(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if self.ev_lots.is_failed() {
            failed.push("EV");
        }
        if self.car_parks.is_failed() {
            failed.push("CarPark");
        }
        failed
    }

    pub fn is_degraded(&self) -> bool {
        self.ev_lots.is_failed() || self.car_parks.is_failed()
    }
}

/// Application service behind `POST /api/carpark/nearby`.
pub struct NearbySearchService {
    car_parks: Arc<dyn CarParkSource>,
    aggregator: BoundedAggregator,
    filter: SpatialPreFilter,
}

impl NearbySearchService {
    pub fn new(
        car_parks: Arc<dyn CarParkSource>,
        aggregator: BoundedAggregator,
        filter: SpatialPreFilter,
    ) -> Self {
        Self {
            car_parks,
            aggregator,
            filter,
        }
    }

    pub fn filter(&self) -> &SpatialPreFilter {
        &self.filter
    }

    /// Run the EV batch and the car park batch side by side.
    ///
    /// Fails only when both batches fail; a single failed batch is reported
    /// as [`BatchOutcome::Failed`] and left to the caller to present.
    pub async fn search(
        &self,
        request: AggregationRequest,
    ) -> Result<AggregationResult, AggregationError> {
        let AggregationRequest {
            current_user_location,
            searched_location,
            ev_candidates,
        } = request;

        let snapshot = self.car_parks.snapshot();
        let snapshot_len = snapshot.len();
        let nearby_car_parks = self.filter.select(snapshot, searched_location);

        info!(
            ev_candidates = ev_candidates.len(),
            car_parks = nearby_car_parks.len(),
            car_parks_total = snapshot_len,
            "Nearby search"
        );

        let (ev_lots, car_parks) = tokio::join!(
            self.aggregator
                .run("ev", current_user_location, ev_candidates),
            self.aggregator
                .run("car_park", current_user_location, nearby_car_parks),
        );

        match (ev_lots.failure(), car_parks.failure()) {
            (Some(ev), Some(car_park)) => {
                return Err(AggregationError::TotalFailure {
                    ev: ev.to_string(),
                    car_park: car_park.to_string(),
                });
            }
            (Some(reason), None) => warn!(reason, "EV batch failed, returning car parks only"),
            (None, Some(reason)) => warn!(reason, "Car park batch failed, returning EV lots only"),
            (None, None) => {}
        }

        Ok(AggregationResult { ev_lots, car_parks })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::application::nearby::aggregator::test_support::{ScriptedFactory, ScriptedRoutes};

    const SEARCH: GeoPoint = GeoPoint::new(1.3000, 103.8000);

    struct FixedTable(Vec<CarParkRecord>);

    impl CarParkSource for FixedTable {
        fn snapshot(&self) -> Vec<CarParkRecord> {
            self.0.clone()
        }
    }

    fn car_park(id: &str, km_north: f64) -> CarParkRecord {
        CarParkRecord {
            id: id.to_string(),
            address: format!("{id} street"),
            car_park_type: "MULTI-STOREY CAR PARK".to_string(),
            location: GeoPoint::new(SEARCH.latitude + km_north / 111.195, SEARCH.longitude),
            lot_details: BTreeMap::new(),
        }
    }

    fn ev_lot(name: &str, latitude: f64) -> EvLotCandidate {
        EvLotCandidate {
            address: format!("{name} road"),
            location: GeoPoint::new(latitude, 103.81),
            display_name: name.to_string(),
            connectors: Vec::new(),
            total_connectors: 2,
        }
    }

    fn service(routes: &Arc<ScriptedRoutes>, car_parks: Vec<CarParkRecord>) -> NearbySearchService {
        NearbySearchService::new(
            Arc::new(FixedTable(car_parks)),
            BoundedAggregator::new(Arc::new(ScriptedFactory(routes.clone())), 10),
            SpatialPreFilter::default(),
        )
    }

    fn request(ev: Vec<EvLotCandidate>) -> AggregationRequest {
        AggregationRequest {
            current_user_location: GeoPoint::new(1.29, 103.79),
            searched_location: SEARCH,
            ev_candidates: ev,
        }
    }

    #[tokio::test]
    async fn only_car_parks_inside_final_radius_are_enriched() {
        let routes = ScriptedRoutes::with_delay(Duration::from_millis(1));
        let svc = service(
            &routes,
            vec![car_park("NEAR", 0.5), car_park("EDGE", 2.3), car_park("FAR", 3.5)],
        );

        let result = svc.search(request(vec![ev_lot("A", 1.31)])).await.unwrap();

        let car_parks = result.car_parks.into_entries();
        assert_eq!(car_parks.len(), 1);
        assert_eq!(car_parks[0].item.id, "NEAR");
        assert_eq!(result.ev_lots.len(), 1);
    }

    #[tokio::test]
    async fn no_candidates_gives_empty_outcomes() {
        let routes = ScriptedRoutes::with_delay(Duration::ZERO);
        let result = service(&routes, Vec::new()).search(request(Vec::new())).await.unwrap();

        assert_eq!(result.ev_lots, BatchOutcome::Empty);
        assert_eq!(result.car_parks, BatchOutcome::Empty);
        assert!(!result.is_degraded());
    }

    #[tokio::test]
    async fn one_failed_batch_leaves_the_other_intact() {
        // EV lot at latitude 1.31 fails; the car park batch does not touch it.
        let routes = ScriptedRoutes::failing_at(Duration::from_millis(1), &[1.31]);
        let svc = service(&routes, vec![car_park("NEAR", 0.5)]);

        let result = svc
            .search(request(vec![ev_lot("A", 1.31), ev_lot("B", 1.32)]))
            .await
            .unwrap();

        assert!(result.ev_lots.is_failed());
        assert_eq!(result.car_parks.len(), 1);
        assert_eq!(result.failed_categories(), vec!["EV"]);
    }

    #[tokio::test]
    async fn both_batches_failing_is_a_total_failure() {
        let near = car_park("NEAR", 0.5);
        let routes =
            ScriptedRoutes::failing_at(Duration::from_millis(1), &[1.31, near.location.latitude]);
        let svc = service(&routes, vec![near]);

        let err = svc.search(request(vec![ev_lot("A", 1.31)])).await.unwrap_err();
        assert!(matches!(err, AggregationError::TotalFailure { .. }));
    }
}
