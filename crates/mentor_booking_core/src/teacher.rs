//! crates/mentor_booking_core/src/teacher.rs
//!
//! Builds the teacher dashboard: own slots, own subjects, and the pending
//! requests against those slots.

use std::sync::Arc;

use tracing::debug;

use crate::domain::{Booking, BookingStatus, Slot, Subject, User};
use crate::ports::{BookingFilter, DatabaseService, PortResult, SlotFilter, SubjectFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeacherStats {
    pub slot_count: usize,
    pub pending_count: usize,
    pub subject_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeacherDashboard {
    pub user: User,
    pub slots: Vec<Slot>,
    pub subjects: Vec<Subject>,
    pub pending_requests: Vec<Booking>,
}

impl TeacherDashboard {
    pub fn stats(&self) -> TeacherStats {
        TeacherStats {
            slot_count: self.slots.len(),
            pending_count: self.pending_requests.len(),
            subject_count: self.subjects.len(),
        }
    }
}

#[derive(Clone)]
pub struct TeacherView {
    db: Arc<dyn DatabaseService>,
}

impl TeacherView {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Reads own slots, then pending bookings on those slots, then own subjects.
    ///
    /// With no slots the pending-bookings read is never issued.
    pub async fn load(&self, teacher: &User) -> PortResult<TeacherDashboard> {
        let slots = self
            .db
            .find_slots(&SlotFilter {
                teacher_id: Some(teacher.id),
                ..Default::default()
            })
            .await?;

        let slot_ids: Vec<_> = slots.iter().map(|s| s.id).collect();
        let pending_requests = if slot_ids.is_empty() {
            Vec::new()
        } else {
            self.db
                .find_bookings(&BookingFilter {
                    slot_ids: Some(slot_ids),
                    status: Some(BookingStatus::Pending),
                    ..Default::default()
                })
                .await?
        };

        let subjects = self
            .db
            .find_subjects(&SubjectFilter {
                teacher_id: Some(teacher.id),
            })
            .await?;

        debug!(
            user_id = %teacher.id,
            slots = slots.len(),
            pending = pending_requests.len(),
            subjects = subjects.len(),
            "Loaded teacher dashboard"
        );

        Ok(TeacherDashboard {
            user: teacher.clone(),
            slots,
            subjects,
            pending_requests,
        })
    }
}
