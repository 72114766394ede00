//! Shared fixtures for the core integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use mentor_booking_core::{
    BookingActions, DatabaseService, Identity, IdentityResolver, MemoryStore, Role, Slot,
    SlotForm, StudentView, Subject, TeacherView, User,
};
use uuid::Uuid;

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub resolver: IdentityResolver,
    pub students: StudentView,
    pub teachers: TeacherView,
    pub actions: BookingActions,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let db: Arc<dyn DatabaseService> = store.clone();
        Self {
            store,
            resolver: IdentityResolver::new(db.clone()),
            students: StudentView::new(db.clone()),
            teachers: TeacherView::new(db.clone()),
            actions: BookingActions::new(db),
        }
    }

    /// Signs a fresh identity in and, for teachers, promotes the record the
    /// way an administrator would.
    pub async fn user(&self, name: &str, role: Role) -> User {
        let resolution = self.resolver.resolve(&identity(name)).await.unwrap();
        if role == Role::Teacher {
            self.store
                .assign_role(resolution.user.id, Role::Teacher)
                .await
                .unwrap();
        }
        let mut user = resolution.user;
        user.role = role;
        user
    }

    pub async fn subject(&self, teacher: &User, name: &str, price_per_minute: f64) -> Subject {
        self.actions
            .create_subject(teacher, name, price_per_minute)
            .await
            .unwrap()
            .record
    }

    pub async fn slot(&self, teacher: &User, subject: &Subject, capacity: u32) -> Slot {
        self.actions
            .create_slot(teacher, form(subject.id, 30, capacity))
            .await
            .unwrap()
            .record
    }
}

pub fn identity(name: &str) -> Identity {
    Identity {
        uid: Uuid::new_v4(),
        display_name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        photo_url: None,
    }
}

pub fn form(subject_id: Uuid, duration_minutes: u32, capacity: u32) -> SlotForm {
    SlotForm {
        subject_id,
        date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
        time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
        duration_minutes,
        capacity,
    }
}
