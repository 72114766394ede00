//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the dashboard endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every mutating handler answers with the action's notice and a freshly
//! loaded dashboard, so the client never patches its own copy.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use mentor_booking_core::{route, ActionError, BookingStatus, Notice, Role, SlotForm, User, View};
use std::sync::Arc;
use tracing::debug;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::auth;
use crate::web::dto::{
    parse_date, parse_time, BookingPayload, CancelSlotRequest, CreateSlotRequest,
    CreateSubjectRequest, ErrorResponse, NoticePayload, RequestSlotRequest, SessionResponse,
    SlotListingPayload, SlotPayload, StudentActionResponse, StudentDashboardPayload,
    SubjectPayload, TeacherActionResponse, TeacherDashboardPayload, TeacherStatsPayload,
    TestimonialPayload, TestimonialRequest, UpdateBookingStatusRequest, UserPayload,
};
use crate::web::state::{AppState, CurrentUser};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::session_handler,
        student_dashboard_handler,
        teacher_dashboard_handler,
        request_slot_handler,
        update_booking_status_handler,
        create_subject_handler,
        create_slot_handler,
        cancel_slot_handler,
        submit_testimonial_handler,
    ),
    components(
        schemas(
            auth::SignupRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::LogoutResponse,
            NoticePayload,
            ErrorResponse,
            SessionResponse,
            UserPayload,
            SubjectPayload,
            SlotPayload,
            BookingPayload,
            TestimonialPayload,
            SlotListingPayload,
            StudentDashboardPayload,
            TeacherStatsPayload,
            TeacherDashboardPayload,
            StudentActionResponse,
            TeacherActionResponse,
            RequestSlotRequest,
            UpdateBookingStatusRequest,
            CreateSubjectRequest,
            CreateSlotRequest,
            CancelSlotRequest,
            TestimonialRequest,
        )
    ),
    tags(
        (name = "Mentor Booking API", description = "Slot booking between students and teachers.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Helpers
//=========================================================================================

/// Refuses the request unless the user's role routes to `view`.
fn require_view(user: &User, view: View) -> Result<(), ApiError> {
    let current = route(Some(user));
    if current == view {
        return Ok(());
    }
    debug!(user_id = %user.id, view = current.as_str(), "Dashboard not available for role");
    let role = match view {
        View::TeacherDashboard => Role::Teacher,
        _ => Role::Student,
    };
    Err(ActionError::Forbidden(role).into())
}

async fn student_refresh(
    state: &AppState,
    user: &User,
    notice: Notice,
) -> Result<Json<StudentActionResponse>, ApiError> {
    let dashboard = state.students.load(user).await?;
    Ok(Json(StudentActionResponse {
        notice: notice.into(),
        dashboard: (&dashboard).into(),
    }))
}

async fn teacher_refresh(
    state: &AppState,
    user: &User,
    notice: Notice,
) -> Result<Json<TeacherActionResponse>, ApiError> {
    let dashboard = state.teachers.load(user).await?;
    Ok(Json(TeacherActionResponse {
        notice: notice.into(),
        dashboard: (&dashboard).into(),
    }))
}

//=========================================================================================
// Dashboards
//=========================================================================================

/// GET /dashboard/student - Bookings, open slots and testimonials for a student
#[utoipa::path(
    get,
    path = "/dashboard/student",
    responses(
        (status = 200, description = "Student dashboard", body = StudentDashboardPayload),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Signed-in user is not a student", body = ErrorResponse)
    )
)]
pub async fn student_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<StudentDashboardPayload>, ApiError> {
    require_view(&user, View::StudentDashboard)?;
    let dashboard = state.students.load(&user).await?;
    Ok(Json((&dashboard).into()))
}

/// GET /dashboard/teacher - Slots, subjects and pending requests for a teacher
#[utoipa::path(
    get,
    path = "/dashboard/teacher",
    responses(
        (status = 200, description = "Teacher dashboard", body = TeacherDashboardPayload),
        (status = 401, description = "Not signed in", body = ErrorResponse),
        (status = 403, description = "Signed-in user is not a teacher", body = ErrorResponse)
    )
)]
pub async fn teacher_dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<TeacherDashboardPayload>, ApiError> {
    require_view(&user, View::TeacherDashboard)?;
    let dashboard = state.teachers.load(&user).await?;
    Ok(Json((&dashboard).into()))
}

//=========================================================================================
// Student Actions
//=========================================================================================

/// POST /bookings - Request a seat in an open slot
#[utoipa::path(
    post,
    path = "/bookings",
    request_body = RequestSlotRequest,
    responses(
        (status = 201, description = "Request filed", body = StudentActionResponse),
        (status = 404, description = "Slot no longer exists", body = ErrorResponse),
        (status = 409, description = "Already requested", body = ErrorResponse)
    )
)]
pub async fn request_slot_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<RequestSlotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.actions.request_slot(&user, req.slot_id).await?;
    let body = student_refresh(&state, &user, outcome.notice).await?;
    Ok((StatusCode::CREATED, body))
}

/// POST /testimonials - Leave feedback about the service
#[utoipa::path(
    post,
    path = "/testimonials",
    request_body = TestimonialRequest,
    responses(
        (status = 201, description = "Testimonial saved", body = StudentActionResponse),
        (status = 400, description = "Empty message", body = ErrorResponse)
    )
)]
pub async fn submit_testimonial_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<TestimonialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_view(&user, View::StudentDashboard)?;
    let outcome = state.actions.submit_testimonial(&user, &req.text).await?;
    let body = student_refresh(&state, &user, outcome.notice).await?;
    Ok((StatusCode::CREATED, body))
}

//=========================================================================================
// Teacher Actions
//=========================================================================================

/// PUT /bookings/{id}/status - Confirm or decline a pending request
#[utoipa::path(
    put,
    path = "/bookings/{id}/status",
    request_body = UpdateBookingStatusRequest,
    params(
        ("id" = Uuid, Path, description = "Booking id")
    ),
    responses(
        (status = 200, description = "Booking updated", body = TeacherActionResponse),
        (status = 400, description = "Unknown or disallowed status", body = ErrorResponse),
        (status = 403, description = "Booking belongs to another teacher", body = ErrorResponse),
        (status = 409, description = "Booking is no longer pending", body = ErrorResponse)
    )
)]
pub async fn update_booking_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<UpdateBookingStatusRequest>,
) -> Result<Json<TeacherActionResponse>, ApiError> {
    // 1. Parse the requested status
    let status: BookingStatus = req
        .status
        .trim()
        .to_lowercase()
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("{}", e)))?;

    // 2. Apply the transition
    let outcome = state
        .actions
        .update_booking_status(&user, booking_id, status)
        .await?;

    // 3. Reload the dashboard
    teacher_refresh(&state, &user, outcome.notice).await
}

/// POST /subjects - Add a subject with a per-minute price
#[utoipa::path(
    post,
    path = "/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject added", body = TeacherActionResponse),
        (status = 400, description = "Invalid name or price", body = ErrorResponse)
    )
)]
pub async fn create_subject_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state
        .actions
        .create_subject(&user, &req.name, req.price_per_minute)
        .await?;
    let body = teacher_refresh(&state, &user, outcome.notice).await?;
    Ok((StatusCode::CREATED, body))
}

/// POST /slots - Publish an open slot for one of the teacher's subjects
#[utoipa::path(
    post,
    path = "/slots",
    request_body = CreateSlotRequest,
    responses(
        (status = 201, description = "Slot created", body = TeacherActionResponse),
        (status = 400, description = "Invalid slot form values", body = ErrorResponse),
        (status = 404, description = "Subject no longer exists", body = ErrorResponse)
    )
)]
pub async fn create_slot_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateSlotRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // 1. Parse the form values
    let form = SlotForm {
        subject_id: req.subject_id,
        date: parse_date(&req.date)?,
        time: parse_time(&req.time)?,
        duration_minutes: req.duration_minutes,
        capacity: req.capacity,
    };

    // 2. Create the slot and reload
    let outcome = state.actions.create_slot(&user, form).await?;
    let body = teacher_refresh(&state, &user, outcome.notice).await?;
    Ok((StatusCode::CREATED, body))
}

/// POST /slots/{id}/cancel - Cancel an open slot
///
/// The body must carry `"confirm": true`. Pending requests on the slot are
/// left untouched.
#[utoipa::path(
    post,
    path = "/slots/{id}/cancel",
    request_body = CancelSlotRequest,
    params(
        ("id" = Uuid, Path, description = "Slot id")
    ),
    responses(
        (status = 200, description = "Slot cancelled", body = TeacherActionResponse),
        (status = 400, description = "Cancellation not confirmed", body = ErrorResponse),
        (status = 409, description = "Slot already cancelled", body = ErrorResponse)
    )
)]
pub async fn cancel_slot_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slot_id): Path<Uuid>,
    Json(req): Json<CancelSlotRequest>,
) -> Result<Json<TeacherActionResponse>, ApiError> {
    let outcome = state
        .actions
        .cancel_slot(&user, slot_id, req.confirm)
        .await?;
    teacher_refresh(&state, &user, outcome.notice).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "someone@example.com".to_string(),
            display_name: "Someone".to_string(),
            photo_url: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn dashboards_are_gated_by_role() {
        let student = user(Role::Student);
        let teacher = user(Role::Teacher);

        assert!(require_view(&student, View::StudentDashboard).is_ok());
        assert!(require_view(&teacher, View::TeacherDashboard).is_ok());

        let err = require_view(&student, View::TeacherDashboard).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.notice().message, "This action is only available to teachers.");
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/signup",
            "/auth/login",
            "/auth/logout",
            "/session",
            "/dashboard/student",
            "/dashboard/teacher",
            "/bookings",
            "/bookings/{id}/status",
            "/subjects",
            "/slots",
            "/slots/{id}/cancel",
            "/testimonials",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
