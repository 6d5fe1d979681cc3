use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::time::{interval, Duration};
use tracing::info;

use covoit_core::{BusinessRules, RideStatus};
use covoit_store::MemoryStore;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Pending bookings cancelled because their TTL elapsed.
    pub expired_bookings: usize,
    /// Active rides flipped to `COMPLETED` after departure.
    pub completed_rides: usize,
}

/// Background pass that releases seats held by abandoned pending bookings
/// and persists the lazy `ACTIVE` → `COMPLETED` ride transition.
///
/// Each ride is processed under its own serialization cell, so the sweep is
/// safe to run concurrently with live booking requests and never blocks
/// unrelated rides.
pub struct ExpirySweeper {
    store: Arc<MemoryStore>,
    rules: BusinessRules,
}

impl ExpirySweeper {
    pub fn new(store: Arc<MemoryStore>, rules: BusinessRules) -> Self {
        Self { store, rules }
    }

    /// Loops forever at the configured cadence. Spawn this on the runtime.
    pub async fn run(self) {
        let mut ticker = interval(Duration::from_secs(self.rules.sweep_interval_seconds));
        info!(
            "Expiry sweeper started (every {}s, pending TTL {}s)",
            self.rules.sweep_interval_seconds, self.rules.pending_ttl_seconds
        );

        loop {
            ticker.tick().await;
            let report = self.run_once().await;
            if report.expired_bookings > 0 || report.completed_rides > 0 {
                info!(
                    "Sweep released {} pending bookings, completed {} rides",
                    report.expired_bookings, report.completed_rides
                );
            }
        }
    }

    pub async fn run_once(&self) -> SweepReport {
        self.run_once_at(Utc::now()).await
    }

    async fn run_once_at(&self, now: DateTime<Utc>) -> SweepReport {
        let ttl = ChronoDuration::seconds(self.rules.pending_ttl_seconds);
        let mut report = SweepReport::default();

        for cell in self.store.cells().await {
            let mut slot = cell.lock().await;
            report.expired_bookings += slot.expire_stale_pendings(ttl, now);
            if slot.ride.status == RideStatus::Active && slot.ride.departure_time <= now {
                slot.ride.status = RideStatus::Completed;
                slot.ride.updated_at = now;
                report.completed_rides += 1;
            }
        }

        report
    }
}
