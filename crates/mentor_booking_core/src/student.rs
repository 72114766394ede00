//! crates/mentor_booking_core/src/student.rs
//!
//! Builds the student dashboard: open slots joined against bookings to work
//! out occupancy and what the student can do with each slot.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::domain::{Booking, BookingStatus, Slot, SlotStatus, Testimonial, User};
use crate::ports::{BookingFilter, DatabaseService, PortResult, SlotFilter, TestimonialFilter};

/// Shown when a slot's teacher has no user record.
pub const UNKNOWN_TEACHER: &str = "N/A";

/// What a student may do with an open slot. Exactly one holds per (student, slot).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    /// Confirmed bookings have reached capacity.
    Full,
    /// The student already holds a confirmed (or completed) booking.
    Confirmed,
    /// The student has a pending request.
    Requested,
    Requestable,
}

impl SlotAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotAction::Full => "full",
            SlotAction::Confirmed => "confirmed",
            SlotAction::Requested => "requested",
            SlotAction::Requestable => "requestable",
        }
    }
}

/// Derives the action state for one slot.
///
/// `own_bookings` may contain bookings for other slots; only those on `slot` count.
/// `Full` wins over the student's own status.
pub fn slot_action(slot: &Slot, occupancy: u32, own_bookings: &[Booking]) -> SlotAction {
    if occupancy >= slot.capacity {
        return SlotAction::Full;
    }
    let mut pending = false;
    for booking in own_bookings.iter().filter(|b| b.slot_id == slot.id) {
        match booking.status {
            BookingStatus::Confirmed | BookingStatus::Completed => return SlotAction::Confirmed,
            BookingStatus::Pending => pending = true,
            BookingStatus::Declined => {}
        }
    }
    if pending {
        SlotAction::Requested
    } else {
        SlotAction::Requestable
    }
}

/// Counts confirmed bookings per slot id.
pub fn occupancy_by_slot(confirmed: &[Booking]) -> HashMap<Uuid, u32> {
    let mut counts = HashMap::new();
    for booking in confirmed
        .iter()
        .filter(|b| b.status == BookingStatus::Confirmed)
    {
        *counts.entry(booking.slot_id).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotListing {
    pub slot: Slot,
    pub teacher_name: String,
    pub occupancy: u32,
    pub action: SlotAction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentDashboard {
    pub user: User,
    pub upcoming: Vec<Booking>,
    pub pending: Vec<Booking>,
    pub completed: Vec<Booking>,
    pub slots: Vec<SlotListing>,
    pub testimonials: Vec<Testimonial>,
}

impl StudentDashboard {
    pub fn listing(&self, slot_id: Uuid) -> Option<&SlotListing> {
        self.slots.iter().find(|l| l.slot.id == slot_id)
    }
}

#[derive(Clone)]
pub struct StudentView {
    db: Arc<dyn DatabaseService>,
}

impl StudentView {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Fetches everything the student dashboard shows. Reads are sequential and
    /// always in the same order: own bookings, open slots, confirmed bookings,
    /// then one teacher lookup per slot, then testimonials.
    pub async fn load(&self, student: &User) -> PortResult<StudentDashboard> {
        let my_bookings = self
            .db
            .find_bookings(&BookingFilter {
                user_id: Some(student.id),
                ..Default::default()
            })
            .await?;

        let open_slots = self
            .db
            .find_slots(&SlotFilter {
                status: Some(SlotStatus::Open),
                ..Default::default()
            })
            .await?;

        let confirmed = self
            .db
            .find_bookings(&BookingFilter {
                status: Some(BookingStatus::Confirmed),
                ..Default::default()
            })
            .await?;
        let occupancy = occupancy_by_slot(&confirmed);

        let mut slots = Vec::with_capacity(open_slots.len());
        for slot in open_slots {
            let teacher_name = match self.db.get_user(slot.teacher_id).await? {
                Some(teacher) => teacher.display_name,
                None => UNKNOWN_TEACHER.to_string(),
            };
            let taken = occupancy.get(&slot.id).copied().unwrap_or(0);
            let action = slot_action(&slot, taken, &my_bookings);
            slots.push(SlotListing {
                slot,
                teacher_name,
                occupancy: taken,
                action,
            });
        }

        let testimonials = self
            .db
            .find_testimonials(&TestimonialFilter {
                user_id: Some(student.id),
            })
            .await?;

        let own = split_own_bookings(my_bookings);
        debug!(
            user_id = %student.id,
            slots = slots.len(),
            upcoming = own.upcoming.len(),
            pending = own.pending.len(),
            completed = own.completed.len(),
            "Loaded student dashboard"
        );

        Ok(StudentDashboard {
            user: student.clone(),
            upcoming: own.upcoming,
            pending: own.pending,
            completed: own.completed,
            slots,
            testimonials,
        })
    }
}

#[derive(Default)]
struct OwnBookings {
    upcoming: Vec<Booking>,
    pending: Vec<Booking>,
    completed: Vec<Booking>,
}

fn split_own_bookings(bookings: Vec<Booking>) -> OwnBookings {
    let mut own = OwnBookings::default();
    for booking in bookings {
        match booking.status {
            BookingStatus::Confirmed => own.upcoming.push(booking),
            BookingStatus::Pending => own.pending.push(booking),
            BookingStatus::Completed => own.completed.push(booking),
            BookingStatus::Declined => {}
        }
    }
    own
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn slot(capacity: u32) -> Slot {
        Slot {
            id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            teacher_name: "Grace".to_string(),
            subject_id: Uuid::new_v4(),
            subject_name: "Algebra".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
            duration_minutes: 30,
            capacity,
            price: 60.0,
            status: SlotStatus::Open,
            created_at: Utc::now(),
        }
    }

    fn booking_on(slot: &Slot, status: BookingStatus) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            user_name: "Sam".to_string(),
            user_email: "sam@example.com".to_string(),
            teacher_id: slot.teacher_id,
            slot_id: slot.id,
            subject_name: slot.subject_name.clone(),
            slot_date: slot.date,
            slot_time: slot.time,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn full_wins_over_own_status() {
        let s = slot(1);
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Declined,
        ] {
            let own = vec![booking_on(&s, status)];
            assert_eq!(slot_action(&s, 1, &own), SlotAction::Full);
        }
        assert_eq!(slot_action(&s, 3, &[]), SlotAction::Full);
    }

    #[test]
    fn own_status_decides_when_not_full() {
        let s = slot(2);
        assert_eq!(slot_action(&s, 0, &[]), SlotAction::Requestable);
        assert_eq!(
            slot_action(&s, 1, &[booking_on(&s, BookingStatus::Pending)]),
            SlotAction::Requested
        );
        assert_eq!(
            slot_action(&s, 1, &[booking_on(&s, BookingStatus::Confirmed)]),
            SlotAction::Confirmed
        );
        assert_eq!(
            slot_action(&s, 0, &[booking_on(&s, BookingStatus::Declined)]),
            SlotAction::Requestable
        );
    }

    #[test]
    fn bookings_on_other_slots_are_ignored() {
        let s = slot(2);
        let other = slot(2);
        let own = vec![booking_on(&other, BookingStatus::Confirmed)];
        assert_eq!(slot_action(&s, 0, &own), SlotAction::Requestable);
    }

    #[test]
    fn confirmed_beats_a_stray_pending_duplicate() {
        let s = slot(3);
        let own = vec![
            booking_on(&s, BookingStatus::Pending),
            booking_on(&s, BookingStatus::Confirmed),
        ];
        assert_eq!(slot_action(&s, 1, &own), SlotAction::Confirmed);
    }

    #[test]
    fn occupancy_counts_only_confirmed() {
        let a = slot(2);
        let b = slot(2);
        let bookings = vec![
            booking_on(&a, BookingStatus::Confirmed),
            booking_on(&a, BookingStatus::Confirmed),
            booking_on(&a, BookingStatus::Pending),
            booking_on(&b, BookingStatus::Declined),
        ];
        let counts = occupancy_by_slot(&bookings);
        assert_eq!(counts.get(&a.id), Some(&2));
        assert_eq!(counts.get(&b.id), None);
    }
}
