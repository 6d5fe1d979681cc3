use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ride::{Ride, RideStatus};

/// Passenger search input. Route fields are matched as case-insensitive
/// substrings of the ride's free-text labels.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    /// When given, restricts matches to departures within that calendar day
    /// (UTC); otherwise only future departures match.
    pub date: Option<NaiveDate>,
    pub min_seats: i32,
    #[serde(default)]
    pub offset: usize,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// One search result row, with the live remaining-seat count.
#[derive(Debug, Clone, Serialize)]
pub struct RideSummary {
    pub ride_id: Uuid,
    pub driver_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub departure_time: DateTime<Utc>,
    pub remaining_seats: i32,
    pub price_per_seat: i64,
    pub description: Option<String>,
}

impl RideSummary {
    pub fn from_ride(ride: &Ride, remaining_seats: i32) -> Self {
        Self {
            ride_id: ride.id,
            driver_id: ride.driver_id,
            origin: ride.origin.clone(),
            destination: ride.destination.clone(),
            departure_time: ride.departure_time,
            remaining_seats,
            price_per_seat: ride.price_per_seat,
            description: ride.description.clone(),
        }
    }
}

impl SearchRequest {
    /// Whether a ride with `remaining` free seats matches this request as
    /// observed at `now`.
    pub fn matches(&self, ride: &Ride, remaining: i32, now: DateTime<Utc>) -> bool {
        if ride.effective_status(now) != RideStatus::Active {
            return false;
        }
        if remaining < self.min_seats {
            return false;
        }
        if !contains_ci(&ride.origin, &self.origin) || !contains_ci(&ride.destination, &self.destination) {
            return false;
        }
        match self.date {
            Some(day) => ride.departure_time.date_naive() == day,
            None => ride.departure_time >= now,
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ride::NewRide;
    use chrono::Duration;

    fn ride_tomorrow() -> Ride {
        Ride::new(
            Uuid::new_v4(),
            NewRide {
                origin: "Abidjan, Plateau".to_string(),
                destination: "Bouaké, Centre-ville".to_string(),
                departure_time: Utc::now() + Duration::days(1),
                available_seats: 3,
                price_per_seat: 2000,
                description: None,
            },
        )
    }

    fn request(origin: &str, destination: &str, min_seats: i32) -> SearchRequest {
        SearchRequest {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date: None,
            min_seats,
            offset: 0,
            limit: None,
        }
    }

    #[test]
    fn test_case_insensitive_substring_match() {
        let ride = ride_tomorrow();
        let now = Utc::now();
        assert!(request("abidjan", "bouaké", 2).matches(&ride, 3, now));
        assert!(request("ABIDJAN", "centre", 1).matches(&ride, 3, now));
        assert!(!request("korhogo", "bouaké", 1).matches(&ride, 3, now));
    }

    #[test]
    fn test_min_seats_filter() {
        let ride = ride_tomorrow();
        let now = Utc::now();
        assert!(request("abidjan", "bouaké", 3).matches(&ride, 3, now));
        assert!(!request("abidjan", "bouaké", 4).matches(&ride, 3, now));
    }

    #[test]
    fn test_cancelled_ride_never_matches() {
        let mut ride = ride_tomorrow();
        ride.status = RideStatus::Cancelled;
        assert!(!request("abidjan", "bouaké", 1).matches(&ride, 3, Utc::now()));
    }

    #[test]
    fn test_date_window() {
        let ride = ride_tomorrow();
        let now = Utc::now();
        let departure_day = ride.departure_time.date_naive();

        let mut req = request("abidjan", "bouaké", 1);
        req.date = Some(departure_day);
        assert!(req.matches(&ride, 3, now));

        req.date = Some(departure_day + Duration::days(1));
        assert!(!req.matches(&ride, 3, now));
    }

    #[test]
    fn test_past_departure_excluded_without_date() {
        let mut ride = ride_tomorrow();
        ride.departure_time = Utc::now() - Duration::hours(1);
        assert!(!request("abidjan", "bouaké", 1).matches(&ride, 3, Utc::now()));
    }
}
