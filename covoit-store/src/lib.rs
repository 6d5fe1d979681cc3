pub mod memory;
pub mod search_repo;

pub use memory::{LockBudget, MemoryStore, RideCell, RideSlot};
