pub mod booking;
pub mod config;
pub mod error;
pub mod repository;
pub mod ride;
pub mod search;

pub use booking::{Booking, BookingStatus};
pub use config::{AppConfig, BusinessRules};
pub use error::CoreError;
pub use repository::RideSearchRepository;
pub use ride::{NewRide, Ride, RideStatus};
pub use search::{RideSummary, SearchRequest};

pub type CoreResult<T> = Result<T, CoreError>;
