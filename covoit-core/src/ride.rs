use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Active,
    Completed,
    Cancelled,
}

/// A driver-published trip with fixed seat capacity, route, time and price.
///
/// `available_seats` is the *original* capacity; remaining seats are always
/// derived from the live booking ledger, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: i32,
    pub price_per_seat: i64,
    pub description: Option<String>,
    pub status: RideStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Driver input for publishing a ride. Validated by the catalog against the
/// configured business rules before a `Ride` is created.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRide {
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub available_seats: i32,
    pub price_per_seat: i64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Ride {
    pub fn new(driver_id: Uuid, input: NewRide) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            driver_id,
            origin: input.origin,
            destination: input.destination,
            departure_time: input.departure_time,
            available_seats: input.available_seats,
            price_per_seat: input.price_per_seat,
            description: input.description,
            status: RideStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// Status as observed at `now`. An `Active` ride whose departure has
    /// passed reads as `Completed` even before the stored status is flipped
    /// by a read or the sweep.
    pub fn effective_status(&self, now: DateTime<Utc>) -> RideStatus {
        if self.status == RideStatus::Active && self.departure_time <= now {
            RideStatus::Completed
        } else {
            self.status
        }
    }

    pub fn is_bookable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == RideStatus::Active
    }
}
