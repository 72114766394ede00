//! crates/mentor_booking_core/src/domain.rs
//!
//! Defines the pure, core data structures for the booking service.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Enumerations
//=========================================================================================

/// Error returned when a stored enum value does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Which dashboard and which actions a user gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            other => Err(ParseEnumError::new("role", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    Open,
    /// Terminal. There is no reopen path.
    Cancelled,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Open => "open",
            SlotStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for SlotStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(SlotStatus::Open),
            "cancelled" => Ok(SlotStatus::Cancelled),
            other => Err(ParseEnumError::new("slot status", other)),
        }
    }
}

/// Approval state of a booking.
///
/// `Pending` moves to `Confirmed` or `Declined` through the teacher dashboard.
/// `Confirmed` may become `Completed` through mechanisms outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Declined,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Declined => "declined",
            BookingStatus::Completed => "completed",
        }
    }

    /// Whether the booking state machine allows moving from `self` to `next`.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Confirmed)
                | (BookingStatus::Pending, BookingStatus::Declined)
                | (BookingStatus::Confirmed, BookingStatus::Completed)
        )
    }
}

impl FromStr for BookingStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "declined" => Ok(BookingStatus::Declined),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(ParseEnumError::new("booking status", other)),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Records
//=========================================================================================

/// What the identity provider knows about a signed-in person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// The provider's stable identifier. Becomes the `User` id.
    pub uid: Uuid,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
}

// Represents a user - created on first sign-in
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// A teacher-owned topic with a per-minute price.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject {
    pub id: Uuid,
    pub name: String,
    pub price_per_duration: f64,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub created_at: DateTime<Utc>,
}

/// A bookable time window. `subject_name` and `price` are captured when the
/// slot is created.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub capacity: u32,
    pub price: f64,
    pub status: SlotStatus,
    pub created_at: DateTime<Utc>,
}

/// A student's request against a slot. Slot details are a snapshot taken at
/// request time.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub teacher_id: Uuid,
    pub slot_id: Uuid,
    pub subject_name: String,
    pub slot_date: NaiveDate,
    pub slot_time: NaiveTime,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Testimonial {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub testimonial_text: String,
    pub created_at: DateTime<Utc>,
}

//=========================================================================================
// Insert Payloads (id and creation timestamp are assigned by the store)
//=========================================================================================

#[derive(Debug, Clone)]
pub struct NewUser {
    /// Taken from the identity provider rather than generated.
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub role: Role,
}

#[derive(Debug, Clone)]
pub struct NewSubject {
    pub name: String,
    pub price_per_duration: f64,
    pub teacher_id: Uuid,
    pub teacher_name: String,
}

#[derive(Debug, Clone)]
pub struct NewSlot {
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub capacity: u32,
    pub price: f64,
    pub status: SlotStatus,
}

#[derive(Debug, Clone)]
pub struct NewBooking {
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub teacher_id: Uuid,
    pub slot_id: Uuid,
    pub subject_name: String,
    pub slot_date: NaiveDate,
    pub slot_time: NaiveTime,
    pub status: BookingStatus,
}

#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub user_id: Uuid,
    pub user_name: String,
    pub testimonial_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_parse_their_own_wire_names() {
        for role in [Role::Student, Role::Teacher] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        for status in [SlotStatus::Open, SlotStatus::Cancelled] {
            assert_eq!(status.as_str().parse::<SlotStatus>().unwrap(), status);
        }
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Declined,
            BookingStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<BookingStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_role_is_rejected() {
        let err = "admin".parse::<Role>().unwrap_err();
        assert_eq!(err.to_string(), "unknown role 'admin'");
    }

    #[test]
    fn booking_transitions_follow_the_state_machine() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Declined));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Declined.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Declined));
        assert!(!Completed.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Pending));
    }
}
