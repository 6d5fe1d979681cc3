use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use covoit_core::{CoreError, CoreResult, Ride, RideSearchRepository, RideSummary, SearchRequest};

/// Read-only query façade over the availability index.
///
/// Validates the request, delegates matching to the repository (which
/// computes remaining seats from the live ledger) and applies ordering and
/// paging. Never mutates ride or booking state.
pub struct SearchService {
    repo: Arc<dyn RideSearchRepository>,
}

impl SearchService {
    pub fn new(repo: Arc<dyn RideSearchRepository>) -> Self {
        Self { repo }
    }

    /// Matching rides, ascending by departure time, restartable through
    /// `offset`/`limit`.
    pub async fn search(&self, request: SearchRequest) -> CoreResult<Vec<RideSummary>> {
        if request.origin.trim().is_empty() || request.destination.trim().is_empty() {
            return Err(CoreError::validation("origin and destination are required"));
        }
        if request.min_seats < 1 {
            return Err(CoreError::validation("at least one seat must be requested"));
        }

        let mut results = self.repo.search_rides(&request).await?;
        results.sort_by_key(|r| r.departure_time);

        let page: Vec<RideSummary> = results
            .into_iter()
            .skip(request.offset)
            .take(request.limit.unwrap_or(usize::MAX))
            .collect();

        info!(
            "Search {} -> {} returned {} rides",
            request.origin,
            request.destination,
            page.len()
        );
        Ok(page)
    }

    pub async fn get_ride(&self, ride_id: Uuid) -> CoreResult<Ride> {
        self.repo
            .fetch_ride(ride_id)
            .await?
            .ok_or_else(|| CoreError::not_found(format!("ride {}", ride_id)))
    }
}
