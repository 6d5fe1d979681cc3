use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ride::Ride;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Open bookings hold seats against the ride's capacity.
    pub fn is_open(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

/// A passenger's reservation of one or more seats on a ride.
///
/// `total_price` is frozen at acceptance time; later price changes on the
/// ride never touch existing bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub passenger_id: Uuid,
    pub seats_booked: i32,
    pub total_price: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(ride: &Ride, passenger_id: Uuid, seats: i32, status: BookingStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ride_id: ride.id,
            passenger_id,
            seats_booked: seats,
            total_price: i64::from(seats) * ride.price_per_seat,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }
}
