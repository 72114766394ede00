//! services/api/src/web/dto.rs
//!
//! Request and response payloads for the REST API. Core types are converted
//! into these view-models at the edge, so the core stays free of serde.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mentor_booking_core::{
    Booking, Notice, NoticeKind, Slot, SlotListing, StudentDashboard, Subject, TeacherDashboard,
    TeacherStats, Testimonial, User, NOTICE_DISMISS_AFTER,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;

//=========================================================================================
// Formatting Helpers
//=========================================================================================

/// Renders a slot's date and time for display, e.g. `Oct 15, 2026, 02:30 PM`.
pub fn format_when(date: NaiveDate, time: NaiveTime) -> String {
    NaiveDateTime::new(date, time)
        .format("%b %-d, %Y, %I:%M %p")
        .to_string()
}

/// Accepts `YYYY-MM-DD`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid date (YYYY-MM-DD)", raw)))
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| ApiError::BadRequest(format!("'{}' is not a valid time (HH:MM)", raw)))
}

//=========================================================================================
// Notices and Errors
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct NoticePayload {
    /// `success` or `error`.
    pub kind: String,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl From<Notice> for NoticePayload {
    fn from(notice: Notice) -> Self {
        let kind = match notice.kind {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
        };
        Self {
            kind: kind.to_string(),
            message: notice.message,
            dismiss_after_ms: NOTICE_DISMISS_AFTER.as_millis() as u64,
        }
    }
}

/// Body of every error response.
#[derive(Serialize, ToSchema, Debug)]
pub struct ErrorResponse {
    pub notice: NoticePayload,
    /// Inline error for the login view; only set for sign-in failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

//=========================================================================================
// Records
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct UserPayload {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub role: String,
}

impl From<&User> for UserPayload {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            photo_url: user.photo_url.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SubjectPayload {
    pub id: Uuid,
    pub name: String,
    pub price_per_duration: f64,
    pub teacher_id: Uuid,
    pub teacher_name: String,
}

impl From<&Subject> for SubjectPayload {
    fn from(subject: &Subject) -> Self {
        Self {
            id: subject.id,
            name: subject.name.clone(),
            price_per_duration: subject.price_per_duration,
            teacher_id: subject.teacher_id,
            teacher_name: subject.teacher_name.clone(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SlotPayload {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub teacher_name: String,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub date: String,
    pub time: String,
    pub when: String,
    pub duration_minutes: u32,
    pub capacity: u32,
    pub price: f64,
    pub status: String,
}

impl From<&Slot> for SlotPayload {
    fn from(slot: &Slot) -> Self {
        Self {
            id: slot.id,
            teacher_id: slot.teacher_id,
            teacher_name: slot.teacher_name.clone(),
            subject_id: slot.subject_id,
            subject_name: slot.subject_name.clone(),
            date: slot.date.format("%Y-%m-%d").to_string(),
            time: slot.time.format("%H:%M").to_string(),
            when: format_when(slot.date, slot.time),
            duration_minutes: slot.duration_minutes,
            capacity: slot.capacity,
            price: slot.price,
            status: slot.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct BookingPayload {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub user_email: String,
    pub teacher_id: Uuid,
    pub slot_id: Uuid,
    pub subject_name: String,
    pub slot_date: String,
    pub slot_time: String,
    pub when: String,
    pub status: String,
}

impl From<&Booking> for BookingPayload {
    fn from(booking: &Booking) -> Self {
        Self {
            id: booking.id,
            user_id: booking.user_id,
            user_name: booking.user_name.clone(),
            user_email: booking.user_email.clone(),
            teacher_id: booking.teacher_id,
            slot_id: booking.slot_id,
            subject_name: booking.subject_name.clone(),
            slot_date: booking.slot_date.format("%Y-%m-%d").to_string(),
            slot_time: booking.slot_time.format("%H:%M").to_string(),
            when: format_when(booking.slot_date, booking.slot_time),
            status: booking.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TestimonialPayload {
    pub id: Uuid,
    pub user_name: String,
    pub testimonial_text: String,
}

impl From<&Testimonial> for TestimonialPayload {
    fn from(t: &Testimonial) -> Self {
        Self {
            id: t.id,
            user_name: t.user_name.clone(),
            testimonial_text: t.testimonial_text.clone(),
        }
    }
}

//=========================================================================================
// Dashboards
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct SlotListingPayload {
    pub slot: SlotPayload,
    pub teacher_name: String,
    pub occupancy: u32,
    /// One of `full`, `confirmed`, `requested`, `requestable`.
    pub action: String,
}

impl From<&SlotListing> for SlotListingPayload {
    fn from(listing: &SlotListing) -> Self {
        Self {
            slot: (&listing.slot).into(),
            teacher_name: listing.teacher_name.clone(),
            occupancy: listing.occupancy,
            action: listing.action.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct StudentDashboardPayload {
    pub user: UserPayload,
    pub upcoming_count: usize,
    pub pending_count: usize,
    pub completed_count: usize,
    pub upcoming: Vec<BookingPayload>,
    pub pending: Vec<BookingPayload>,
    pub completed: Vec<BookingPayload>,
    pub slots: Vec<SlotListingPayload>,
    pub testimonials: Vec<TestimonialPayload>,
}

impl From<&StudentDashboard> for StudentDashboardPayload {
    fn from(d: &StudentDashboard) -> Self {
        Self {
            user: (&d.user).into(),
            upcoming_count: d.upcoming.len(),
            pending_count: d.pending.len(),
            completed_count: d.completed.len(),
            upcoming: d.upcoming.iter().map(Into::into).collect(),
            pending: d.pending.iter().map(Into::into).collect(),
            completed: d.completed.iter().map(Into::into).collect(),
            slots: d.slots.iter().map(Into::into).collect(),
            testimonials: d.testimonials.iter().map(Into::into).collect(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TeacherStatsPayload {
    pub slot_count: usize,
    pub pending_count: usize,
    pub subject_count: usize,
}

impl From<TeacherStats> for TeacherStatsPayload {
    fn from(s: TeacherStats) -> Self {
        Self {
            slot_count: s.slot_count,
            pending_count: s.pending_count,
            subject_count: s.subject_count,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct TeacherDashboardPayload {
    pub user: UserPayload,
    pub stats: TeacherStatsPayload,
    pub pending_requests: Vec<BookingPayload>,
    pub slots: Vec<SlotPayload>,
    pub subjects: Vec<SubjectPayload>,
}

impl From<&TeacherDashboard> for TeacherDashboardPayload {
    fn from(d: &TeacherDashboard) -> Self {
        Self {
            user: (&d.user).into(),
            stats: d.stats().into(),
            pending_requests: d.pending_requests.iter().map(Into::into).collect(),
            slots: d.slots.iter().map(Into::into).collect(),
            subjects: d.subjects.iter().map(Into::into).collect(),
        }
    }
}

/// Current sign-in state and the page to show.
#[derive(Serialize, ToSchema, Debug)]
pub struct SessionResponse {
    /// One of `login`, `student`, `teacher`.
    pub view: String,
    pub user: Option<UserPayload>,
}

/// Result of a student action: the notice plus a freshly loaded dashboard.
#[derive(Serialize, ToSchema, Debug)]
pub struct StudentActionResponse {
    pub notice: NoticePayload,
    pub dashboard: StudentDashboardPayload,
}

/// Result of a teacher action: the notice plus a freshly loaded dashboard.
#[derive(Serialize, ToSchema, Debug)]
pub struct TeacherActionResponse {
    pub notice: NoticePayload,
    pub dashboard: TeacherDashboardPayload,
}

//=========================================================================================
// Action Requests
//=========================================================================================

#[derive(Deserialize, ToSchema, Debug)]
pub struct RequestSlotRequest {
    pub slot_id: Uuid,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct UpdateBookingStatusRequest {
    /// `confirmed` or `declined`.
    pub status: String,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateSubjectRequest {
    pub name: String,
    pub price_per_minute: f64,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct CreateSlotRequest {
    pub subject_id: Uuid,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub duration_minutes: u32,
    pub capacity: u32,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
pub struct CancelSlotRequest {
    /// Must be `true`; the client asks the teacher before sending it.
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct TestimonialRequest {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mentor_booking_core::{SlotAction, SlotStatus};

    #[test]
    fn when_reads_like_a_us_calendar_entry() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        let time = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(format_when(date, time), "Oct 5, 2026, 02:30 PM");

        let morning = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(format_when(date, morning), "Oct 5, 2026, 09:05 AM");
    }

    #[test]
    fn form_values_parse_or_explain() {
        assert_eq!(
            parse_date("2026-11-03").unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 3).unwrap()
        );
        assert_eq!(
            parse_time("16:00").unwrap(),
            NaiveTime::from_hms_opt(16, 0, 0).unwrap()
        );
        assert_eq!(
            parse_time("16:00:30").unwrap(),
            NaiveTime::from_hms_opt(16, 0, 30).unwrap()
        );
        assert!(matches!(parse_date("03/11/2026"), Err(ApiError::BadRequest(_))));
        assert!(matches!(parse_time("4pm"), Err(ApiError::BadRequest(_))));
    }

    #[test]
    fn notices_carry_the_dismiss_delay() {
        let payload = NoticePayload::from(Notice::success("Subject added!"));
        assert_eq!(payload.kind, "success");
        assert_eq!(payload.dismiss_after_ms, 3000);

        let json = serde_json::to_value(ErrorResponse {
            notice: Notice::error("Action failed.").into(),
            banner: None,
        })
        .unwrap();
        assert_eq!(json["notice"]["kind"], "error");
        assert!(json.get("banner").is_none());
    }

    #[test]
    fn listing_exposes_action_and_slot_fields() {
        let slot = Slot {
            id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            teacher_name: "Tess Teacher".to_string(),
            subject_id: Uuid::new_v4(),
            subject_name: "Algebra".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 11, 3).unwrap(),
            time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
            duration_minutes: 30,
            capacity: 1,
            price: 60.0,
            status: SlotStatus::Open,
            created_at: Utc::now(),
        };
        let listing = SlotListing {
            slot,
            teacher_name: "Tess Teacher".to_string(),
            occupancy: 1,
            action: SlotAction::Full,
        };

        let json = serde_json::to_value(SlotListingPayload::from(&listing)).unwrap();
        assert_eq!(json["action"], "full");
        assert_eq!(json["occupancy"], 1);
        assert_eq!(json["slot"]["date"], "2026-11-03");
        assert_eq!(json["slot"]["time"], "16:00");
        assert_eq!(json["slot"]["price"], 60.0);
        assert_eq!(json["slot"]["status"], "open");
    }
}
