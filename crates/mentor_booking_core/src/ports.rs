//! crates/mentor_booking_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the booking core.
//! These traits form the boundary of the hexagonal architecture, so the core
//! stays independent of the concrete document store and identity provider.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, Identity, NewBooking, NewSlot, NewSubject, NewTestimonial, NewUser,
    Slot, SlotStatus, Subject, Testimonial, User,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// Failures reported by the identity provider.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("An account already exists for {0}")]
    AccountExists(String),
    #[error("Sign-in failed: {0}")]
    Provider(String),
}

//=========================================================================================
// Read Filters
//=========================================================================================
// Each `Some` field is an equality predicate; all present predicates must hold.
//=========================================================================================

#[derive(Debug, Clone, Default)]
pub struct SubjectFilter {
    pub teacher_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct SlotFilter {
    pub teacher_id: Option<Uuid>,
    pub status: Option<SlotStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub user_id: Option<Uuid>,
    pub slot_id: Option<Uuid>,
    /// Set-membership predicate on `slot_id`. An empty set matches nothing.
    pub slot_ids: Option<Vec<Uuid>>,
    pub status: Option<BookingStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct TestimonialFilter {
    pub user_id: Option<Uuid>,
}

impl BookingFilter {
    /// Whether `booking` satisfies every predicate present in the filter.
    pub fn matches(&self, booking: &Booking) -> bool {
        self.user_id.map_or(true, |id| booking.user_id == id)
            && self.slot_id.map_or(true, |id| booking.slot_id == id)
            && self
                .slot_ids
                .as_ref()
                .map_or(true, |ids| ids.contains(&booking.slot_id))
            && self.status.map_or(true, |s| booking.status == s)
    }
}

impl SlotFilter {
    pub fn matches(&self, slot: &Slot) -> bool {
        self.teacher_id.map_or(true, |id| slot.teacher_id == id)
            && self.status.map_or(true, |s| slot.status == s)
    }
}

impl SubjectFilter {
    pub fn matches(&self, subject: &Subject) -> bool {
        self.teacher_id.map_or(true, |id| subject.teacher_id == id)
    }
}

impl TestimonialFilter {
    pub fn matches(&self, testimonial: &Testimonial) -> bool {
        self.user_id.map_or(true, |id| testimonial.user_id == id)
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    /// Returns `None` when no record exists for the id.
    async fn get_user(&self, user_id: Uuid) -> PortResult<Option<User>>;

    /// Inserts the user unless a record with the same id already exists.
    ///
    /// Returns `None` when the existing record was kept.
    async fn insert_user(&self, user: NewUser) -> PortResult<Option<User>>;

    // --- Subjects ---
    async fn find_subjects(&self, filter: &SubjectFilter) -> PortResult<Vec<Subject>>;

    async fn get_subject(&self, subject_id: Uuid) -> PortResult<Subject>;

    async fn insert_subject(&self, subject: NewSubject) -> PortResult<Subject>;

    // --- Slots ---
    async fn find_slots(&self, filter: &SlotFilter) -> PortResult<Vec<Slot>>;

    async fn get_slot(&self, slot_id: Uuid) -> PortResult<Slot>;

    async fn insert_slot(&self, slot: NewSlot) -> PortResult<Slot>;

    async fn update_slot_status(&self, slot_id: Uuid, status: SlotStatus) -> PortResult<()>;

    // --- Bookings ---
    async fn find_bookings(&self, filter: &BookingFilter) -> PortResult<Vec<Booking>>;

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking>;

    async fn insert_booking(&self, booking: NewBooking) -> PortResult<Booking>;

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<()>;

    // --- Testimonials ---
    async fn find_testimonials(&self, filter: &TestimonialFilter) -> PortResult<Vec<Testimonial>>;

    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> PortResult<Testimonial>;

    // --- Auth Sessions ---
    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the session's user id, or `Unauthorized` for unknown or expired sessions.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Creates a provider account and returns its identity.
    async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        photo_url: Option<&str>,
    ) -> Result<Identity, AuthError>;

    /// Verifies credentials and returns the account's identity.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;
}
