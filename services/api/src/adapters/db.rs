//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mentor_booking_core::domain::{
    Booking, BookingStatus, NewBooking, NewSlot, NewSubject, NewTestimonial, NewUser, Slot,
    SlotStatus, Subject, Testimonial, User,
};
use mentor_booking_core::ports::{
    BookingFilter, DatabaseService, PortError, PortResult, SlotFilter, SubjectFilter,
    TestimonialFilter,
};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

const USER_COLUMNS: &str = "id, email, display_name, photo_url, role, created_at";
const SUBJECT_COLUMNS: &str = "id, name, price_per_duration, teacher_id, teacher_name, created_at";
const SLOT_COLUMNS: &str = "id, teacher_id, teacher_name, subject_id, subject_name, date, time, \
     duration_minutes, capacity, price, status, created_at";
const BOOKING_COLUMNS: &str = "id, user_id, user_name, user_email, teacher_id, slot_id, \
     subject_name, slot_date, slot_time, status, created_at";
const TESTIMONIAL_COLUMNS: &str = "id, user_id, user_name, testimonial_text, created_at";

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("Stored {} is invalid: {}", what, detail))
}

fn to_i32(value: u32, field: &str) -> PortResult<i32> {
    i32::try_from(value).map_err(|_| PortError::Unexpected(format!("{} is out of range", field)))
}

fn to_u32(value: i32, field: &str) -> PortResult<u32> {
    u32::try_from(value).map_err(|_| corrupt(field, value))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    display_name: String,
    photo_url: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            photo_url: self.photo_url,
            role: self.role.parse().map_err(|e| corrupt("user role", e))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct SubjectRecord {
    id: Uuid,
    name: String,
    price_per_duration: f64,
    teacher_id: Uuid,
    teacher_name: String,
    created_at: DateTime<Utc>,
}
impl SubjectRecord {
    fn to_domain(self) -> Subject {
        Subject {
            id: self.id,
            name: self.name,
            price_per_duration: self.price_per_duration,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct SlotRecord {
    id: Uuid,
    teacher_id: Uuid,
    teacher_name: String,
    subject_id: Uuid,
    subject_name: String,
    date: NaiveDate,
    time: NaiveTime,
    duration_minutes: i32,
    capacity: i32,
    price: f64,
    status: String,
    created_at: DateTime<Utc>,
}
impl SlotRecord {
    fn to_domain(self) -> PortResult<Slot> {
        Ok(Slot {
            id: self.id,
            teacher_id: self.teacher_id,
            teacher_name: self.teacher_name,
            subject_id: self.subject_id,
            subject_name: self.subject_name,
            date: self.date,
            time: self.time,
            duration_minutes: to_u32(self.duration_minutes, "slot duration")?,
            capacity: to_u32(self.capacity, "slot capacity")?,
            price: self.price,
            status: self.status.parse().map_err(|e| corrupt("slot status", e))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct BookingRecord {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    user_email: String,
    teacher_id: Uuid,
    slot_id: Uuid,
    subject_name: String,
    slot_date: NaiveDate,
    slot_time: NaiveTime,
    status: String,
    created_at: DateTime<Utc>,
}
impl BookingRecord {
    fn to_domain(self) -> PortResult<Booking> {
        Ok(Booking {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name,
            user_email: self.user_email,
            teacher_id: self.teacher_id,
            slot_id: self.slot_id,
            subject_name: self.subject_name,
            slot_date: self.slot_date,
            slot_time: self.slot_time,
            status: self.status.parse().map_err(|e| corrupt("booking status", e))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct TestimonialRecord {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    testimonial_text: String,
    created_at: DateTime<Utc>,
}
impl TestimonialRecord {
    fn to_domain(self) -> Testimonial {
        Testimonial {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name,
            testimonial_text: self.testimonial_text,
            created_at: self.created_at,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_user(&self, user_id: Uuid) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(UserRecord::to_domain).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (id, email, display_name, photo_url, role) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (id) DO NOTHING RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.photo_url)
        .bind(user.role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        record.map(UserRecord::to_domain).transpose()
    }

    async fn find_subjects(&self, filter: &SubjectFilter) -> PortResult<Vec<Subject>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM subjects WHERE TRUE",
            SUBJECT_COLUMNS
        ));
        if let Some(teacher_id) = filter.teacher_id {
            qb.push(" AND teacher_id = ").push_bind(teacher_id);
        }
        qb.push(" ORDER BY created_at ASC");

        let records = qb
            .build_query_as::<SubjectRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(SubjectRecord::to_domain).collect())
    }

    async fn get_subject(&self, subject_id: Uuid) -> PortResult<Subject> {
        let record = sqlx::query_as::<_, SubjectRecord>(&format!(
            "SELECT {} FROM subjects WHERE id = $1",
            SUBJECT_COLUMNS
        ))
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Subject {} not found", subject_id)))?;

        Ok(record.to_domain())
    }

    async fn insert_subject(&self, subject: NewSubject) -> PortResult<Subject> {
        let record = sqlx::query_as::<_, SubjectRecord>(&format!(
            "INSERT INTO subjects (id, name, price_per_duration, teacher_id, teacher_name) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SUBJECT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&subject.name)
        .bind(subject.price_per_duration)
        .bind(subject.teacher_id)
        .bind(&subject.teacher_name)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn find_slots(&self, filter: &SlotFilter) -> PortResult<Vec<Slot>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM slots WHERE TRUE", SLOT_COLUMNS));
        if let Some(teacher_id) = filter.teacher_id {
            qb.push(" AND teacher_id = ").push_bind(teacher_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY date ASC, time ASC, created_at ASC");

        let records = qb
            .build_query_as::<SlotRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(SlotRecord::to_domain).collect()
    }

    async fn get_slot(&self, slot_id: Uuid) -> PortResult<Slot> {
        let record = sqlx::query_as::<_, SlotRecord>(&format!(
            "SELECT {} FROM slots WHERE id = $1",
            SLOT_COLUMNS
        ))
        .bind(slot_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Slot {} not found", slot_id)))?;

        record.to_domain()
    }

    async fn insert_slot(&self, slot: NewSlot) -> PortResult<Slot> {
        let record = sqlx::query_as::<_, SlotRecord>(&format!(
            "INSERT INTO slots (id, teacher_id, teacher_name, subject_id, subject_name, \
             date, time, duration_minutes, capacity, price, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING {}",
            SLOT_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(slot.teacher_id)
        .bind(&slot.teacher_name)
        .bind(slot.subject_id)
        .bind(&slot.subject_name)
        .bind(slot.date)
        .bind(slot.time)
        .bind(to_i32(slot.duration_minutes, "duration_minutes")?)
        .bind(to_i32(slot.capacity, "capacity")?)
        .bind(slot.price)
        .bind(slot.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn update_slot_status(&self, slot_id: Uuid, status: SlotStatus) -> PortResult<()> {
        let result = sqlx::query("UPDATE slots SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(slot_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Slot {} not found", slot_id)));
        }
        Ok(())
    }

    async fn find_bookings(&self, filter: &BookingFilter) -> PortResult<Vec<Booking>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM bookings WHERE TRUE",
            BOOKING_COLUMNS
        ));
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(slot_id) = filter.slot_id {
            qb.push(" AND slot_id = ").push_bind(slot_id);
        }
        if let Some(slot_ids) = &filter.slot_ids {
            qb.push(" AND slot_id = ANY(")
                .push_bind(slot_ids.clone())
                .push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        qb.push(" ORDER BY created_at ASC");

        let records = qb
            .build_query_as::<BookingRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        records.into_iter().map(BookingRecord::to_domain).collect()
    }

    async fn get_booking(&self, booking_id: Uuid) -> PortResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "SELECT {} FROM bookings WHERE id = $1",
            BOOKING_COLUMNS
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?
        .ok_or_else(|| PortError::NotFound(format!("Booking {} not found", booking_id)))?;

        record.to_domain()
    }

    async fn insert_booking(&self, booking: NewBooking) -> PortResult<Booking> {
        let record = sqlx::query_as::<_, BookingRecord>(&format!(
            "INSERT INTO bookings (id, user_id, user_name, user_email, teacher_id, slot_id, \
             subject_name, slot_date, slot_time, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING {}",
            BOOKING_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(booking.user_id)
        .bind(&booking.user_name)
        .bind(&booking.user_email)
        .bind(booking.teacher_id)
        .bind(booking.slot_id)
        .bind(&booking.subject_name)
        .bind(booking.slot_date)
        .bind(booking.slot_time)
        .bind(booking.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        record.to_domain()
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> PortResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Booking {} not found", booking_id)));
        }
        Ok(())
    }

    async fn find_testimonials(&self, filter: &TestimonialFilter) -> PortResult<Vec<Testimonial>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM testimonials WHERE TRUE",
            TESTIMONIAL_COLUMNS
        ));
        if let Some(user_id) = filter.user_id {
            qb.push(" AND user_id = ").push_bind(user_id);
        }
        qb.push(" ORDER BY created_at ASC");

        let records = qb
            .build_query_as::<TestimonialRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;

        Ok(records.into_iter().map(TestimonialRecord::to_domain).collect())
    }

    async fn insert_testimonial(&self, testimonial: NewTestimonial) -> PortResult<Testimonial> {
        let record = sqlx::query_as::<_, TestimonialRecord>(&format!(
            "INSERT INTO testimonials (id, user_id, user_name, testimonial_text) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            TESTIMONIAL_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(testimonial.user_id)
        .bind(&testimonial.user_name)
        .bind(&testimonial.testimonial_text)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<Uuid> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM auth_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        user_id.ok_or(PortError::Unauthorized)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
