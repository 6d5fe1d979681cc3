use std::sync::Arc;

use chrono::{Duration, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use covoit_booking::BookingEngine;
use covoit_core::{BusinessRules, NewRide, Ride};
use covoit_store::MemoryStore;

#[derive(Debug, Clone)]
enum Op {
    /// Passenger index requests this many seats.
    Book(usize, i32),
    /// Passenger index cancels their most recent booking.
    Cancel(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize, 1..=4i32).prop_map(|(p, s)| Op::Book(p, s)),
        (0..8usize).prop_map(Op::Cancel),
    ]
}

proptest! {
    /// Under any sequence of booking and cancellation attempts the open
    /// seats on a ride never exceed its advertised capacity.
    #[test]
    fn capacity_invariant_holds(
        capacity in 1..=8i32,
        ops in proptest::collection::vec(op_strategy(), 1..60),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        rt.block_on(async move {
            let store = Arc::new(MemoryStore::new());
            let ride = Ride::new(
                Uuid::new_v4(),
                NewRide {
                    origin: "Abidjan".to_string(),
                    destination: "Bouaké".to_string(),
                    departure_time: Utc::now() + Duration::hours(12),
                    available_seats: capacity,
                    price_per_seat: 2000,
                    description: None,
                },
            );
            let ride_id = ride.id;
            store.insert_ride(ride).await.unwrap();

            let engine = BookingEngine::new(
                store.clone(),
                BusinessRules {
                    auto_confirm: true,
                    allow_repeat_bookings: true,
                    ..BusinessRules::default()
                },
            );

            let passengers: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
            let mut last_booking: Vec<Option<Uuid>> = vec![None; passengers.len()];

            for op in ops {
                match op {
                    Op::Book(p, seats) => {
                        if let Ok(booking) =
                            engine.request_booking(ride_id, passengers[p], seats).await
                        {
                            last_booking[p] = Some(booking.id);
                        }
                    }
                    Op::Cancel(p) => {
                        if let Some(booking_id) = last_booking[p].take() {
                            engine
                                .cancel_booking(ride_id, booking_id, passengers[p])
                                .await
                                .unwrap();
                        }
                    }
                }

                let slot = store.lock_ride(ride_id).await.unwrap();
                let remaining = slot.remaining_seats();
                prop_assert!(
                    (0..=capacity).contains(&remaining),
                    "remaining {} out of range for capacity {}",
                    remaining,
                    capacity
                );
            }

            Ok(())
        })?;
    }
}
