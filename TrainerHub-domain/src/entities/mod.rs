// Domain entities
// Records persisted in the key-value store plus the request and view types built from them.

pub mod metric;
pub mod notification;
pub mod program;
pub mod records;
pub mod roster;
pub mod schedule;
pub mod session_card;
pub mod stats;
pub mod user;

use chrono::NaiveTime;
use validator::ValidationError;

pub use metric::*;
pub use notification::*;
pub use program::*;
pub use records::*;
pub use roster::*;
pub use schedule::*;
pub use session_card::*;
pub use stats::*;
pub use user::*;

/// Validate a wall-clock time written as `HH:MM`
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    if value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok() {
        Ok(())
    } else {
        let mut error = ValidationError::new("time_format");
        error.message = Some("Time must use the HH:MM format".into());
        Err(error)
    }
}

/// Generate a new record identifier
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time_of_day() {
        assert!(validate_time_of_day("09:30").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("9:30").is_err());
        assert!(validate_time_of_day("09:30:00").is_err());
        assert!(validate_time_of_day("noon").is_err());
    }
}
