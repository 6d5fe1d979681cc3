use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CoreError;
use crate::ride::Ride;
use crate::search::{RideSummary, SearchRequest};

/// Read-side seam between the query façade and the backing store.
///
/// Implementations must compute `remaining_seats` from the authoritative
/// booking ledger, never from a cached value that could diverge from it.
#[async_trait]
pub trait RideSearchRepository: Send + Sync {
    /// Unordered matches for the request; the façade sorts and pages.
    async fn search_rides(&self, request: &SearchRequest) -> Result<Vec<RideSummary>, CoreError>;

    async fn fetch_ride(&self, ride_id: Uuid) -> Result<Option<Ride>, CoreError>;
}
