use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use covoit_core::{CoreError, Ride, RideSearchRepository, RideSummary, SearchRequest};

use crate::memory::MemoryStore;

/// Read-side view over the in-memory store. Remaining seats are computed
/// from each ride's live ledger while briefly holding its cell, so a result
/// can never report seats a concurrent booking already claimed at that
/// instant.
#[async_trait]
impl RideSearchRepository for MemoryStore {
    async fn search_rides(&self, request: &SearchRequest) -> Result<Vec<RideSummary>, CoreError> {
        let now = Utc::now();
        let mut matches = Vec::new();

        for cell in self.cells().await {
            let slot = cell.lock().await;
            let remaining = slot.remaining_seats();
            if request.matches(&slot.ride, remaining, now) {
                matches.push(RideSummary::from_ride(&slot.ride, remaining));
            }
        }

        Ok(matches)
    }

    async fn fetch_ride(&self, ride_id: Uuid) -> Result<Option<Ride>, CoreError> {
        match self.cell(ride_id).await {
            Some(cell) => {
                let mut ride = cell.lock().await.ride.clone();
                // Departed rides read as completed even before the stored
                // status is flipped.
                ride.status = ride.effective_status(Utc::now());
                Ok(Some(ride))
            }
            None => Ok(None),
        }
    }
}
