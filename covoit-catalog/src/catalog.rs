use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use covoit_core::{BusinessRules, CoreError, CoreResult, NewRide, Ride, RideStatus};
use covoit_store::MemoryStore;

/// Sole authority over ride lifecycle: creation, price changes and the
/// `ACTIVE` → `CANCELLED` / `COMPLETED` transitions. Booking records are
/// never created here, but the ride-cancellation cascade runs under the same
/// ride cell so a concurrent booking request sees either the fully pre- or
/// fully post-cascade state.
pub struct RideCatalog {
    store: Arc<MemoryStore>,
    rules: BusinessRules,
}

impl RideCatalog {
    pub fn new(store: Arc<MemoryStore>, rules: BusinessRules) -> Self {
        Self { store, rules }
    }

    /// Validates and publishes a new ride. The ride is visible to search and
    /// booking as soon as this returns.
    pub async fn create_ride(&self, driver_id: Uuid, input: NewRide) -> CoreResult<Ride> {
        self.validate(&input)?;

        let ride = Ride::new(driver_id, input);
        self.store.insert_ride(ride.clone()).await?;

        info!(
            "Ride published: {} {} -> {} ({} seats at {})",
            ride.id, ride.origin, ride.destination, ride.available_seats, ride.price_per_seat
        );
        Ok(ride)
    }

    /// Owner-only cancellation. Cascades every open booking to `CANCELLED`
    /// atomically with respect to concurrent booking requests on the ride.
    /// Cancelling an already-cancelled ride is a no-op.
    pub async fn cancel_ride(&self, ride_id: Uuid, requester_id: Uuid) -> CoreResult<()> {
        let mut slot = self.store.lock_ride(ride_id).await?;

        if slot.ride.driver_id != requester_id {
            return Err(CoreError::Authorization(format!(
                "only the driver may cancel ride {}",
                ride_id
            )));
        }

        let now = Utc::now();
        match slot.ride.effective_status(now) {
            RideStatus::Cancelled => return Ok(()),
            RideStatus::Completed => {
                return Err(CoreError::RideUnavailable(format!(
                    "ride {} already departed",
                    ride_id
                )))
            }
            RideStatus::Active => {}
        }

        slot.ride.status = RideStatus::Cancelled;
        slot.ride.updated_at = now;
        let cascaded = slot.cancel_open_bookings(now);

        info!("Ride {} cancelled, {} bookings released", ride_id, cascaded);
        Ok(())
    }

    /// Fetches a ride, persisting the lazy `ACTIVE` → `COMPLETED` transition
    /// when its departure has passed.
    pub async fn get_ride(&self, ride_id: Uuid) -> CoreResult<Ride> {
        let mut slot = self.store.lock_ride(ride_id).await?;

        let now = Utc::now();
        if slot.ride.status == RideStatus::Active && slot.ride.effective_status(now) == RideStatus::Completed {
            slot.ride.status = RideStatus::Completed;
            slot.ride.updated_at = now;
        }

        Ok(slot.ride.clone())
    }

    /// Owner-only price change for a still-bookable ride. Existing bookings
    /// keep their frozen `total_price`.
    pub async fn update_price(
        &self,
        ride_id: Uuid,
        requester_id: Uuid,
        new_price: i64,
    ) -> CoreResult<Ride> {
        if new_price < self.rules.min_price_per_seat || new_price > self.rules.max_price_per_seat {
            return Err(CoreError::validation(format!(
                "price per seat must be within [{}, {}]",
                self.rules.min_price_per_seat, self.rules.max_price_per_seat
            )));
        }

        let mut slot = self.store.lock_ride(ride_id).await?;

        if slot.ride.driver_id != requester_id {
            return Err(CoreError::Authorization(format!(
                "only the driver may reprice ride {}",
                ride_id
            )));
        }
        if !slot.ride.is_bookable(Utc::now()) {
            return Err(CoreError::RideUnavailable(format!(
                "ride {} is not active",
                ride_id
            )));
        }

        slot.ride.price_per_seat = new_price;
        slot.ride.updated_at = Utc::now();
        Ok(slot.ride.clone())
    }

    fn validate(&self, input: &NewRide) -> CoreResult<()> {
        if input.origin.trim().is_empty() || input.destination.trim().is_empty() {
            return Err(CoreError::validation("origin and destination are required"));
        }
        if input.available_seats < self.rules.min_seats || input.available_seats > self.rules.max_seats {
            return Err(CoreError::validation(format!(
                "seats must be within [{}, {}]",
                self.rules.min_seats, self.rules.max_seats
            )));
        }
        if input.price_per_seat < self.rules.min_price_per_seat
            || input.price_per_seat > self.rules.max_price_per_seat
        {
            return Err(CoreError::validation(format!(
                "price per seat must be within [{}, {}]",
                self.rules.min_price_per_seat, self.rules.max_price_per_seat
            )));
        }
        let earliest = Utc::now() + Duration::minutes(self.rules.min_lead_time_minutes);
        if input.departure_time < earliest {
            return Err(CoreError::validation(format!(
                "departure must be at least {} minutes ahead",
                self.rules.min_lead_time_minutes
            )));
        }
        Ok(())
    }
}
