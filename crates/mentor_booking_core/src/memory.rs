//! crates/mentor_booking_core/src/memory.rs
//!
//! An in-process implementation of `DatabaseService`, used by tests and local
//! experiments. Records live in plain vectors behind a `RwLock`.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, NewBooking, NewSlot, NewSubject, NewTestimonial, NewUser, Role, Slot,
    SlotStatus, Subject, Testimonial, User,
};
use crate::ports::{
    BookingFilter, DatabaseService, PortError, PortResult, SlotFilter, SubjectFilter,
    TestimonialFilter,
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    subjects: Vec<Subject>,
    slots: Vec<Slot>,
    bookings: Vec<Booking>,
    testimonials: Vec<Testimonial>,
    auth_sessions: HashMap<String, (Uuid, DateTime<Utc>)>,
}

/// Every call yields once before touching the tables, so concurrent callers
/// interleave at store calls.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    reads: Mutex<Vec<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the read operations issued so far, oldest first.
    pub async fn reads(&self) -> Vec<&'static str> {
        self.reads.lock().await.clone()
    }

    pub async fn clear_reads(&self) {
        self.reads.lock().await.clear();
    }

    /// Changes a user's role. The application itself never does this; it
    /// stands in for an administrator editing the record directly.
    pub async fn assign_role(&self, user_id: Uuid, role: Role) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        user.role = role;
        Ok(())
    }

    /// Renames a subject in place, leaving slots that copied the old name untouched.
    pub async fn rename_subject(&self, subject_id: Uuid, name: &str) -> PortResult<()> {
        let mut tables = self.tables.write().await;
        let subject = tables
            .subjects
            .iter_mut()
            .find(|s| s.id == subject_id)
            .ok_or_else(|| PortError::NotFound(format!("Subject {} not found", subject_id)))?;
        subject.name = name.to_string();
        Ok(())
    }

    async fn enter(&self, read: Option<&'static str>) {
        tokio::task::yield_now().await;
        if let Some(name) = read {
            self.reads.lock().await.push(name);
        }
    }
}

#[async_trait]
impl DatabaseService for MemoryStore {
    async fn get_user(&self, user_id: Uuid) -> PortResult<Option<User>> {
        self.enter(Some("users.get")).await;
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == user_id).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> PortResult<Option<User>> {
        self.enter(None).await;
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.id == user.id) {
            return Ok(None);
        }
        let record = User {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            photo_url: user.photo_url,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(record.clone());
        Ok(Some(record))
    }

    async fn find_subjects(&self, filter: &SubjectFilter) -> PortResult<Vec<Subject>> {
        self.enter(Some("subjects.find")).await;
        let tables = self.tables.read().await;
        Ok(tables
            .subjects
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn get_subject(&self, subject_id: Uuid) -> PortResult<Subject> {
        self.enter(Some("subjects.get")).await;
        let tables = self.tables.read().await;
        tables
            .subjects
            .iter()
            .find(|s| s.id == subject_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Subject {} not found", subject_id)))
    }

    async fn insert_subject(&self, subject: NewSubject) -> PortResult<Subject> {
        self.enter(None).await;
        let record = Subject {
            id: Uuid::new_v4(),
            name: subject.name,
            price_per_duration: subject.price_per_duration,
            teacher_id: subject.teacher_id,
            teacher_name: subject.teacher_name,
            created_at: Utc::now(),
        };
        self.tables.write().await.subjects.push(record.clone());
        Ok(record)
    }

    async fn find_slots(&self, filter: &SlotFilter) -> PortResult<Vec<Slot>> {
        self.enter(Some("slots.find")).await;
        let tables = self.tables.read().await;
        Ok(tables
            .slots
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    async fn get_slot(&self, slot_id: Uuid) -> PortResult<Slot> {
        self.enter(Some("slots.get")).await;
        let tables = self.tables.read().await;
        tables
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Slot {} not found", slot_id)))
    }

    async fn insert_slot(&self, slot: NewSlot) -> PortResult<Slot> {
        self.enter(None).await;
        let record = Slot {
            id: Uuid::new_v4(),
            teacher_id: slot.teacher_id,
            teacher_name: slot.teacher_name,
            subject_id: slot.subject_id,
            subject_name: slot.subject_name,
            date: slot.date,
            time: slot.time,
            duration_minutes: slot.duration_minutes,
            capacity: slot.capacity,
            price: slot.price,
            status: slot.status,
            created_at: Utc::now(),
        };
        self.tables.write().await.slots.push(record.clone());
        Ok(record)
    }

    async fn update_slot_status(&self, slot_id: Uuid, status: SlotStatus) -> PortResult<()> {
        self.enter(None).await;
        let mut tables = self.tables.write().await;
        let slot = tables
            .slots
            .iter_mut()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| PortError::NotFound(format!("Slot {} not found", slot_id)))?;
        slot.status = status;
        Ok(())
    }

    async fn find_bookings(&self, filter: &BookingFilter) -> PortResult<Vec<Booking>> {
        self.enter(Some("bookings.find")).await;
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect())
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        self.enter(Some("bookings.get")).await;
        let tables = self.tables.read().await;
        tables
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))
    }

    async fn insert_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        self.enter(None).await;
        let record = Booking {
            id: Uuid::new_v4(),
            user_id: booking.user_id,
            user_name: booking.user_name,
            user_email: booking.user_email,
            teacher_id: booking.teacher_id,
            slot_id: booking.slot_id,
            subject_name: booking.subject_name,
            slot_date: booking.slot_date,
            slot_time: booking.slot_time,
            status: booking.status,
            created_at: Utc::now(),
        };
        self.tables.write().await.bookings.push(record.clone());
        Ok(record)
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<()> {
        self.enter(None).await;
        let mut tables = self.tables.write().await;
        let booking = tables
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))?;
        booking.status = status;
        Ok(())
    }

    async fn find_testimonials(&self, filter: &TestimonialFilter) -> PortResult<Vec<Testimonial>> {
        self.enter(Some("testimonials.find")).await;
        let tables = self.tables.read().await;
        Ok(tables
            .testimonials
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> PortResult<Testimonial> {
        self.enter(None).await;
        let record = Testimonial {
            id: Uuid::new_v4(),
            user_id: testimonial.user_id,
            user_name: testimonial.user_name,
            testimonial_text: testimonial.testimonial_text,
            created_at: Utc::now(),
        };
        self.tables.write().await.testimonials.push(record.clone());
        Ok(record)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.enter(None).await;
        self.tables
            .write()
            .await
            .auth_sessions
            .insert(session_id.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        self.enter(None).await;
        let tables = self.tables.read().await;
        match tables.auth_sessions.get(session_id) {
            Some((user_id, expires_at)) if *expires_at > Utc::now() => Ok(*user_id),
            _ => Err(PortError::Unauthorized),
        }
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.enter(None).await;
        self.tables.write().await.auth_sessions.remove(session_id);
        Ok(())
    }
}
