//! crates/mentor_booking_core/src/actions.rs
//!
//! The mutating operations available from the dashboards. Every operation is a
//! short sequence of store calls; none of them is transactional.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    Booking, BookingStatus, NewBooking, NewSlot, NewSubject, NewTestimonial, Role, Slot,
    SlotStatus, Subject, Testimonial, User,
};
use crate::notice::Notice;
use crate::ports::{BookingFilter, DatabaseService, PortError};

//=========================================================================================
// Errors
//=========================================================================================

/// Why an action was refused. The display text is what the user is shown.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("This action is only available to {}s.", .0.as_str())]
    Forbidden(Role),
    #[error("You can only manage your own {0}.")]
    NotOwner(&'static str),
    #[error("You already requested this slot.")]
    AlreadyRequested,
    #[error("Slot no longer exists.")]
    SlotUnavailable,
    #[error("{0} no longer exists.")]
    Missing(&'static str),
    #[error("Booking is already {0}.")]
    InvalidTransition(BookingStatus),
    #[error("Slot is already cancelled.")]
    AlreadyCancelled,
    #[error("Please confirm before cancelling this slot.")]
    ConfirmationRequired,
    #[error("{0}")]
    Invalid(String),
    /// The store rejected a read or write; `context` is the user-facing message.
    #[error("{context}")]
    Store {
        context: &'static str,
        #[source]
        source: PortError,
    },
}

impl ActionError {
    pub fn notice(&self) -> Notice {
        Notice::error(self.to_string())
    }
}

pub type ActionResult<T> = Result<T, ActionError>;

/// Tags a store error with the message shown when the action fails.
trait StoreContext<T> {
    fn context(self, context: &'static str) -> ActionResult<T>;
}

impl<T> StoreContext<T> for Result<T, PortError> {
    fn context(self, context: &'static str) -> ActionResult<T> {
        self.map_err(|source| ActionError::Store { context, source })
    }
}

//=========================================================================================
// Inputs and Outputs
//=========================================================================================

/// Fields a teacher fills in to create a slot.
#[derive(Debug, Clone)]
pub struct SlotForm {
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub duration_minutes: u32,
    pub capacity: u32,
}

/// A completed action: the affected record plus the notice to show.
#[derive(Debug, Clone)]
pub struct Outcome<T> {
    pub record: T,
    pub notice: Notice,
}

impl<T> Outcome<T> {
    fn new(record: T, message: impl Into<String>) -> Self {
        Self {
            record,
            notice: Notice::success(message),
        }
    }
}

//=========================================================================================
// BookingActions
//=========================================================================================

#[derive(Clone)]
pub struct BookingActions {
    db: Arc<dyn DatabaseService>,
}

impl BookingActions {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Files a pending booking for `student` on `slot_id`.
    ///
    /// The duplicate check and the insert are separate store calls, so two
    /// concurrent requests for the same (student, slot) can both get through.
    pub async fn request_slot(
        &self,
        student: &User,
        slot_id: Uuid,
    ) -> ActionResult<Outcome<Booking>> {
        require_role(student, Role::Student)?;

        let existing = self
            .db
            .find_bookings(&BookingFilter {
                user_id: Some(student.id),
                slot_id: Some(slot_id),
                ..Default::default()
            })
            .await
            .context("Failed to send request.")?;
        if existing.iter().any(|b| b.status != BookingStatus::Declined) {
            return Err(ActionError::AlreadyRequested);
        }

        let slot = match self.db.get_slot(slot_id).await {
            Ok(slot) => slot,
            Err(PortError::NotFound(_)) => return Err(ActionError::SlotUnavailable),
            Err(e) => return Err(e).context("Failed to send request."),
        };
        if slot.status != SlotStatus::Open {
            return Err(ActionError::SlotUnavailable);
        }

        let booking = self
            .db
            .insert_booking(NewBooking {
                user_id: student.id,
                user_name: student.display_name.clone(),
                user_email: student.email.clone(),
                teacher_id: slot.teacher_id,
                slot_id: slot.id,
                subject_name: slot.subject_name.clone(),
                slot_date: slot.date,
                slot_time: slot.time,
                status: BookingStatus::Pending,
            })
            .await
            .context("Failed to send request.")?;
        info!(
            booking_id = %booking.id,
            slot_id = %slot.id,
            user_id = %student.id,
            "Booking requested"
        );

        Ok(Outcome::new(booking, "Request sent! Waiting for teacher approval."))
    }

    /// Confirms or declines a pending booking on one of the teacher's slots.
    ///
    /// Confirming does not check the slot's capacity.
    pub async fn update_booking_status(
        &self,
        teacher: &User,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> ActionResult<Outcome<Booking>> {
        require_role(teacher, Role::Teacher)?;
        if !matches!(status, BookingStatus::Confirmed | BookingStatus::Declined) {
            return Err(ActionError::Invalid(format!(
                "A booking cannot be marked {} from the dashboard.",
                status
            )));
        }

        let mut booking = match self.db.get_booking(booking_id).await {
            Ok(booking) => booking,
            Err(PortError::NotFound(_)) => return Err(ActionError::Missing("Booking")),
            Err(e) => return Err(e).context("Action failed."),
        };
        if booking.teacher_id != teacher.id {
            return Err(ActionError::NotOwner("bookings"));
        }
        if !booking.status.can_transition_to(status) {
            return Err(ActionError::InvalidTransition(booking.status));
        }

        self.db
            .update_booking_status(booking_id, status)
            .await
            .context("Action failed.")?;
        info!(booking_id = %booking_id, status = status.as_str(), "Booking status updated");

        booking.status = status;
        Ok(Outcome::new(booking, format!("Booking {} successfully!", status)))
    }

    pub async fn create_subject(
        &self,
        teacher: &User,
        name: &str,
        price_per_minute: f64,
    ) -> ActionResult<Outcome<Subject>> {
        require_role(teacher, Role::Teacher)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(ActionError::Invalid("Subject name is required.".to_string()));
        }
        if !price_per_minute.is_finite() || price_per_minute < 0.0 {
            return Err(ActionError::Invalid(
                "Price per minute must be a non-negative number.".to_string(),
            ));
        }

        let subject = self
            .db
            .insert_subject(NewSubject {
                name: name.to_string(),
                price_per_duration: price_per_minute,
                teacher_id: teacher.id,
                teacher_name: teacher.display_name.clone(),
            })
            .await
            .context("Error adding subject")?;
        info!(subject_id = %subject.id, teacher_id = %teacher.id, "Subject created");

        Ok(Outcome::new(subject, "Subject added!"))
    }

    /// Creates an open slot priced at the subject's per-minute rate times the duration.
    pub async fn create_slot(&self, teacher: &User, form: SlotForm) -> ActionResult<Outcome<Slot>> {
        require_role(teacher, Role::Teacher)?;
        if form.duration_minutes == 0 {
            return Err(ActionError::Invalid("Duration must be at least one minute.".to_string()));
        }
        if form.capacity == 0 {
            return Err(ActionError::Invalid("Capacity must be at least one.".to_string()));
        }

        let subject = match self.db.get_subject(form.subject_id).await {
            Ok(subject) => subject,
            Err(PortError::NotFound(_)) => return Err(ActionError::Missing("Subject")),
            Err(e) => return Err(e).context("Error creating slot"),
        };
        if subject.teacher_id != teacher.id {
            return Err(ActionError::NotOwner("subjects"));
        }

        let slot = self
            .db
            .insert_slot(NewSlot {
                teacher_id: teacher.id,
                teacher_name: teacher.display_name.clone(),
                subject_id: subject.id,
                subject_name: subject.name.clone(),
                date: form.date,
                time: form.time,
                duration_minutes: form.duration_minutes,
                capacity: form.capacity,
                price: slot_price(subject.price_per_duration, form.duration_minutes),
                status: SlotStatus::Open,
            })
            .await
            .context("Error creating slot")?;
        info!(slot_id = %slot.id, teacher_id = %teacher.id, "Slot created");

        Ok(Outcome::new(slot, "Slot created successfully!"))
    }

    /// Cancels an open slot once the teacher has confirmed the prompt.
    ///
    /// Pending bookings on the slot are left as they are.
    pub async fn cancel_slot(
        &self,
        teacher: &User,
        slot_id: Uuid,
        confirmed: bool,
    ) -> ActionResult<Outcome<Slot>> {
        require_role(teacher, Role::Teacher)?;
        if !confirmed {
            return Err(ActionError::ConfirmationRequired);
        }

        let mut slot = match self.db.get_slot(slot_id).await {
            Ok(slot) => slot,
            Err(PortError::NotFound(_)) => return Err(ActionError::SlotUnavailable),
            Err(e) => return Err(e).context("Error cancelling."),
        };
        if slot.teacher_id != teacher.id {
            return Err(ActionError::NotOwner("slots"));
        }
        if slot.status == SlotStatus::Cancelled {
            return Err(ActionError::AlreadyCancelled);
        }

        self.db
            .update_slot_status(slot_id, SlotStatus::Cancelled)
            .await
            .context("Error cancelling.")?;
        warn!(slot_id = %slot_id, "Slot cancelled; pending bookings are not declined");

        slot.status = SlotStatus::Cancelled;
        Ok(Outcome::new(slot, "Slot cancelled."))
    }

    pub async fn submit_testimonial(
        &self,
        user: &User,
        text: &str,
    ) -> ActionResult<Outcome<Testimonial>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ActionError::Invalid("Please write a message".to_string()));
        }

        let testimonial = self
            .db
            .insert_testimonial(NewTestimonial {
                user_id: user.id,
                user_name: user.display_name.clone(),
                testimonial_text: text.to_string(),
            })
            .await
            .context("Error submitting.")?;
        info!(testimonial_id = %testimonial.id, user_id = %user.id, "Testimonial submitted");

        Ok(Outcome::new(testimonial, "Thanks for your feedback!"))
    }
}

fn require_role(user: &User, role: Role) -> ActionResult<()> {
    if user.role == role {
        Ok(())
    } else {
        Err(ActionError::Forbidden(role))
    }
}

/// Price of a slot: per-minute price times duration.
pub fn slot_price(price_per_minute: f64, duration_minutes: u32) -> f64 {
    price_per_minute * f64::from(duration_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_is_rate_times_duration() {
        assert_eq!(slot_price(2.0, 30), 60.0);
        assert_eq!(slot_price(0.0, 45), 0.0);
        assert_eq!(slot_price(1.5, 40), 60.0);
    }

    #[test]
    fn errors_read_as_notices() {
        let notice = ActionError::AlreadyRequested.notice();
        assert!(notice.is_error());
        assert_eq!(notice.message, "You already requested this slot.");
        assert_eq!(
            ActionError::Forbidden(Role::Teacher).to_string(),
            "This action is only available to teachers."
        );
        assert_eq!(ActionError::Missing("Subject").to_string(), "Subject no longer exists.");
        let store = ActionError::Store {
            context: "Error adding subject",
            source: PortError::Unexpected("connection reset".to_string()),
        };
        assert_eq!(store.notice().message, "Error adding subject");
    }
}
