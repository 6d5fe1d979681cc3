use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;
use uuid::Uuid;

use covoit_core::{Booking, BookingStatus, BusinessRules, CoreError, CoreResult, RideStatus};
use covoit_store::MemoryStore;

/// Sole authority for accepting or rejecting seat reservations and for
/// booking status transitions.
///
/// The capacity check and the booking write happen as one step while holding
/// the ride's serialization cell, so two interleaved requests for the last
/// seat can never both succeed. Requests against different rides never
/// contend with each other.
pub struct BookingEngine {
    store: Arc<MemoryStore>,
    rules: BusinessRules,
}

impl BookingEngine {
    pub fn new(store: Arc<MemoryStore>, rules: BusinessRules) -> Self {
        Self { store, rules }
    }

    /// Reserves `seats` on a ride for a passenger.
    ///
    /// Outcome per configuration: the booking starts `CONFIRMED` when
    /// `auto_confirm` is set, `PENDING` otherwise. Stale pending bookings on
    /// the ride are expired first, under the same lock, so their seats are
    /// available to this request.
    pub async fn request_booking(
        &self,
        ride_id: Uuid,
        passenger_id: Uuid,
        seats: i32,
    ) -> CoreResult<Booking> {
        if seats < 1 {
            return Err(CoreError::validation("at least one seat must be requested"));
        }

        let mut slot = self.store.lock_ride(ride_id).await?;
        let now = Utc::now();

        if slot.ride.effective_status(now) != RideStatus::Active {
            // Persist the lazy transition while we hold the lock anyway.
            if slot.ride.status == RideStatus::Active {
                slot.ride.status = RideStatus::Completed;
                slot.ride.updated_at = now;
            }
            return Err(CoreError::RideUnavailable(format!(
                "ride {} is not open for booking",
                ride_id
            )));
        }

        if slot.ride.driver_id == passenger_id {
            return Err(CoreError::validation("drivers cannot book their own ride"));
        }

        let expired = slot.expire_stale_pendings(self.pending_ttl(), now);
        if expired > 0 {
            info!("Expired {} stale pending bookings on ride {}", expired, ride_id);
        }

        if !self.rules.allow_repeat_bookings {
            if let Some(existing) = slot.open_booking_for(passenger_id) {
                return Err(CoreError::DuplicateBooking(format!(
                    "booking {} already open on ride {}",
                    existing.id, ride_id
                )));
            }
        }

        let remaining = slot.remaining_seats();
        if seats > remaining {
            return Err(CoreError::Capacity {
                requested: seats,
                remaining,
            });
        }

        let status = if self.rules.auto_confirm {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        };
        let booking = Booking::new(&slot.ride, passenger_id, seats, status);
        slot.bookings.insert(booking.id, booking.clone());

        info!(
            "Booking {} accepted: {} seats on ride {} for {}",
            booking.id, seats, ride_id, booking.total_price
        );
        Ok(booking)
    }

    /// Driver acceptance of a pending booking. Confirming a booking that is
    /// already `CONFIRMED` is a no-op; a cancelled booking cannot come back.
    pub async fn confirm_booking(
        &self,
        ride_id: Uuid,
        booking_id: Uuid,
        requester_id: Uuid,
    ) -> CoreResult<Booking> {
        let mut slot = self.store.lock_ride(ride_id).await?;

        if slot.ride.driver_id != requester_id {
            return Err(CoreError::Authorization(format!(
                "only the driver may confirm bookings on ride {}",
                ride_id
            )));
        }

        let booking = slot
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| CoreError::not_found(format!("booking {}", booking_id)))?;

        match booking.status {
            BookingStatus::Confirmed => {}
            BookingStatus::Pending => {
                booking.status = BookingStatus::Confirmed;
                booking.updated_at = Utc::now();
                info!("Booking {} confirmed on ride {}", booking_id, ride_id);
            }
            BookingStatus::Cancelled => {
                return Err(CoreError::validation(format!(
                    "booking {} is cancelled and cannot be confirmed",
                    booking_id
                )))
            }
        }

        Ok(booking.clone())
    }

    /// Passenger cancellation, releasing the held seats. Cancelling an
    /// already-cancelled booking is a no-op.
    pub async fn cancel_booking(
        &self,
        ride_id: Uuid,
        booking_id: Uuid,
        requester_id: Uuid,
    ) -> CoreResult<()> {
        let mut slot = self.store.lock_ride(ride_id).await?;

        let booking = slot
            .bookings
            .get_mut(&booking_id)
            .ok_or_else(|| CoreError::not_found(format!("booking {}", booking_id)))?;

        if booking.passenger_id != requester_id {
            return Err(CoreError::Authorization(format!(
                "only the passenger may cancel booking {}",
                booking_id
            )));
        }

        if booking.status != BookingStatus::Cancelled {
            booking.status = BookingStatus::Cancelled;
            booking.updated_at = Utc::now();
            info!("Booking {} cancelled on ride {}", booking_id, ride_id);
        }

        Ok(())
    }

    pub async fn get_booking(&self, ride_id: Uuid, booking_id: Uuid) -> CoreResult<Booking> {
        let slot = self.store.lock_ride(ride_id).await?;
        slot.bookings
            .get(&booking_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(format!("booking {}", booking_id)))
    }

    fn pending_ttl(&self) -> Duration {
        Duration::seconds(self.rules.pending_ttl_seconds)
    }
}
