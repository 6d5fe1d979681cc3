/// Unified error taxonomy for the marketplace core.
///
/// Every public operation either fully succeeds or fails with exactly one of
/// these kinds and no partial state mutation.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Malformed or out-of-range input. Caller's fault, never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Caller lacks rights over the target entity.
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// The ride is not bookable (wrong status or departure has passed).
    #[error("Ride unavailable: {0}")]
    RideUnavailable(String),

    /// Lost the race for the remaining seats. Caller may re-check
    /// availability or pick another ride.
    #[error("Insufficient seats: requested {requested}, remaining {remaining}")]
    Capacity { requested: i32, remaining: i32 },

    /// The passenger already holds an open booking on this ride.
    #[error("Duplicate booking on ride {0}")]
    DuplicateBooking(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Exhausted the bounded wait for a ride's serialization cell.
    #[error("Storage contention: {0}")]
    StorageContention(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }
}
