pub mod engine;
pub mod sweep;

pub use engine::BookingEngine;
pub use sweep::{ExpirySweeper, SweepReport};
