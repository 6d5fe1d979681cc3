use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use uuid::Uuid;

use covoit_core::{Booking, BookingStatus, CoreError, Ride};

/// A ride and its booking ledger, guarded as one unit.
///
/// Everything that must be atomic per ride (capacity check-and-write, the
/// cancellation cascade, pending expiry) happens while holding this slot's
/// mutex. Concurrency across different rides is never serialized.
#[derive(Debug)]
pub struct RideSlot {
    pub ride: Ride,
    pub bookings: HashMap<Uuid, Booking>,
}

impl RideSlot {
    pub fn new(ride: Ride) -> Self {
        Self {
            ride,
            bookings: HashMap::new(),
        }
    }

    /// Free seats = original capacity minus seats held by open bookings.
    pub fn remaining_seats(&self) -> i32 {
        let held: i32 = self
            .bookings
            .values()
            .filter(|b| b.is_open())
            .map(|b| b.seats_booked)
            .sum();
        self.ride.available_seats - held
    }

    pub fn open_booking_for(&self, passenger_id: Uuid) -> Option<&Booking> {
        self.bookings
            .values()
            .find(|b| b.passenger_id == passenger_id && b.is_open())
    }

    /// Cancels pending bookings older than `ttl`, releasing their seats.
    pub fn expire_stale_pendings(&mut self, ttl: chrono::Duration, now: DateTime<Utc>) -> usize {
        let mut expired = 0;
        for booking in self.bookings.values_mut() {
            if booking.status == BookingStatus::Pending && booking.created_at + ttl <= now {
                booking.status = BookingStatus::Cancelled;
                booking.updated_at = now;
                expired += 1;
            }
        }
        expired
    }

    /// The ride-cancellation cascade: every open booking goes to `CANCELLED`.
    pub fn cancel_open_bookings(&mut self, now: DateTime<Utc>) -> usize {
        let mut cancelled = 0;
        for booking in self.bookings.values_mut() {
            if booking.is_open() {
                booking.status = BookingStatus::Cancelled;
                booking.updated_at = now;
                cancelled += 1;
            }
        }
        cancelled
    }
}

pub type RideCell = Arc<Mutex<RideSlot>>;

/// Bounded wait for a ride cell before surfacing `StorageContention`.
#[derive(Debug, Clone, Copy)]
pub struct LockBudget {
    pub wait: Duration,
    pub attempts: u32,
}

impl Default for LockBudget {
    fn default() -> Self {
        Self {
            wait: Duration::from_millis(250),
            attempts: 3,
        }
    }
}

/// In-memory backing store: one serialization cell per ride.
///
/// The outer map is only locked to insert or look up cells; all ride and
/// booking mutation happens under the per-ride mutex.
pub struct MemoryStore {
    rides: RwLock<HashMap<Uuid, RideCell>>,
    lock_budget: LockBudget,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_lock_budget(LockBudget::default())
    }

    pub fn with_lock_budget(lock_budget: LockBudget) -> Self {
        Self {
            rides: RwLock::new(HashMap::new()),
            lock_budget,
        }
    }

    pub async fn insert_ride(&self, ride: Ride) -> Result<(), CoreError> {
        let mut rides = self.rides.write().await;
        if rides.contains_key(&ride.id) {
            return Err(CoreError::validation(format!(
                "ride {} already exists",
                ride.id
            )));
        }
        rides.insert(ride.id, Arc::new(Mutex::new(RideSlot::new(ride))));
        Ok(())
    }

    pub async fn cell(&self, ride_id: Uuid) -> Option<RideCell> {
        self.rides.read().await.get(&ride_id).cloned()
    }

    /// Acquires exclusive access to a ride's slot, retrying up to the
    /// configured budget. `NotFound` for unknown ids, `StorageContention`
    /// once the budget is exhausted.
    pub async fn lock_ride(&self, ride_id: Uuid) -> Result<OwnedMutexGuard<RideSlot>, CoreError> {
        let cell = self
            .cell(ride_id)
            .await
            .ok_or_else(|| CoreError::not_found(format!("ride {}", ride_id)))?;

        for attempt in 0..self.lock_budget.attempts {
            match tokio::time::timeout(self.lock_budget.wait, cell.clone().lock_owned()).await {
                Ok(guard) => return Ok(guard),
                Err(_) => {
                    tracing::warn!(
                        "Lock wait for ride {} timed out (attempt {})",
                        ride_id,
                        attempt + 1
                    );
                }
            }
        }

        Err(CoreError::StorageContention(format!(
            "ride {} busy after {} attempts",
            ride_id, self.lock_budget.attempts
        )))
    }

    /// Snapshot of all cells, for scans (search, expiry sweep).
    pub async fn cells(&self) -> Vec<RideCell> {
        self.rides.read().await.values().cloned().collect()
    }

    pub async fn ride_count(&self) -> usize {
        self.rides.read().await.len()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use covoit_core::NewRide;

    fn sample_ride(seats: i32) -> Ride {
        Ride::new(
            Uuid::new_v4(),
            NewRide {
                origin: "Abidjan".to_string(),
                destination: "Daloa".to_string(),
                departure_time: Utc::now() + ChronoDuration::hours(5),
                available_seats: seats,
                price_per_seat: 1500,
                description: None,
            },
        )
    }

    #[test]
    fn test_remaining_seats_counts_open_only() {
        let ride = sample_ride(4);
        let mut slot = RideSlot::new(ride.clone());

        let open = Booking::new(&ride, Uuid::new_v4(), 2, BookingStatus::Confirmed);
        let mut cancelled = Booking::new(&ride, Uuid::new_v4(), 2, BookingStatus::Pending);
        cancelled.status = BookingStatus::Cancelled;

        slot.bookings.insert(open.id, open);
        slot.bookings.insert(cancelled.id, cancelled);

        assert_eq!(slot.remaining_seats(), 2);
    }

    #[test]
    fn test_expire_stale_pendings() {
        let ride = sample_ride(4);
        let mut slot = RideSlot::new(ride.clone());

        let mut stale = Booking::new(&ride, Uuid::new_v4(), 1, BookingStatus::Pending);
        stale.created_at = Utc::now() - ChronoDuration::hours(2);
        let fresh = Booking::new(&ride, Uuid::new_v4(), 1, BookingStatus::Pending);
        let confirmed = Booking::new(&ride, Uuid::new_v4(), 1, BookingStatus::Confirmed);

        slot.bookings.insert(stale.id, stale);
        slot.bookings.insert(fresh.id, fresh);
        slot.bookings.insert(confirmed.id, confirmed);

        let expired = slot.expire_stale_pendings(ChronoDuration::minutes(30), Utc::now());
        assert_eq!(expired, 1);
        // Only the stale pending released its seat.
        assert_eq!(slot.remaining_seats(), 2);
    }

    #[test]
    fn test_cancel_open_bookings_cascade() {
        let ride = sample_ride(4);
        let mut slot = RideSlot::new(ride.clone());
        for _ in 0..3 {
            let b = Booking::new(&ride, Uuid::new_v4(), 1, BookingStatus::Confirmed);
            slot.bookings.insert(b.id, b);
        }

        assert_eq!(slot.cancel_open_bookings(Utc::now()), 3);
        assert_eq!(slot.remaining_seats(), 4);
        // Running the cascade again is a no-op.
        assert_eq!(slot.cancel_open_bookings(Utc::now()), 0);
    }

    #[tokio::test]
    async fn test_lock_unknown_ride_is_not_found() {
        let store = MemoryStore::new();
        let err = store.lock_ride(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lock_budget_exhaustion_is_contention() {
        let store = MemoryStore::with_lock_budget(LockBudget {
            wait: Duration::from_millis(10),
            attempts: 2,
        });
        let ride = sample_ride(2);
        let ride_id = ride.id;
        store.insert_ride(ride).await.unwrap();

        let _held = store.lock_ride(ride_id).await.unwrap();
        let err = store.lock_ride(ride_id).await.unwrap_err();
        assert!(matches!(err, CoreError::StorageContention(_)));
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = MemoryStore::new();
        let ride = sample_ride(2);
        store.insert_ride(ride.clone()).await.unwrap();
        let err = store.insert_ride(ride).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
