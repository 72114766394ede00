//! Teacher dashboard loading and the guard rails on teacher actions.

mod common;

use common::{form, Harness};
use mentor_booking_core::{ActionError, BookingStatus, Role};

#[tokio::test]
async fn teacher_without_slots_skips_the_pending_read() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    h.subject(&teacher, "Algebra", 2.0).await;
    h.store.clear_reads().await;

    let dashboard = h.teachers.load(&teacher).await.unwrap();

    assert!(dashboard.pending_requests.is_empty());
    assert_eq!(dashboard.stats().subject_count, 1);
    assert_eq!(h.store.reads().await, vec!["slots.find", "subjects.find"]);
}

#[tokio::test]
async fn teacher_reads_are_ordered() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let subject = h.subject(&teacher, "Algebra", 2.0).await;
    h.slot(&teacher, &subject, 2).await;
    h.store.clear_reads().await;

    h.teachers.load(&teacher).await.unwrap();

    assert_eq!(
        h.store.reads().await,
        vec!["slots.find", "bookings.find", "subjects.find"]
    );
}

#[tokio::test]
async fn student_reads_are_ordered() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let subject = h.subject(&teacher, "Algebra", 2.0).await;
    h.slot(&teacher, &subject, 2).await;
    h.slot(&teacher, &subject, 2).await;
    let student = h.user("Sam Student", Role::Student).await;
    h.store.clear_reads().await;

    h.students.load(&student).await.unwrap();

    assert_eq!(
        h.store.reads().await,
        vec![
            "bookings.find",
            "slots.find",
            "bookings.find",
            "users.get",
            "users.get",
            "testimonials.find",
        ]
    );
}

#[tokio::test]
async fn dashboard_only_shows_own_records() {
    let h = Harness::new();
    let tess = h.user("Tess Teacher", Role::Teacher).await;
    let tom = h.user("Tom Teacher", Role::Teacher).await;
    let student = h.user("Sam Student", Role::Student).await;

    let mine = h.subject(&tess, "Algebra", 2.0).await;
    let theirs = h.subject(&tom, "Chemistry", 3.0).await;
    let my_slot = h.slot(&tess, &mine, 2).await;
    let their_slot = h.slot(&tom, &theirs, 2).await;
    h.actions.request_slot(&student, my_slot.id).await.unwrap();
    h.actions.request_slot(&student, their_slot.id).await.unwrap();

    let dashboard = h.teachers.load(&tess).await.unwrap();
    let stats = dashboard.stats();
    assert_eq!(stats.slot_count, 1);
    assert_eq!(stats.subject_count, 1);
    assert_eq!(stats.pending_count, 1);
    assert_eq!(dashboard.pending_requests[0].slot_id, my_slot.id);
    assert_eq!(dashboard.pending_requests[0].user_name, "Sam Student");
}

#[tokio::test]
async fn confirmed_requests_leave_the_pending_list() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let subject = h.subject(&teacher, "Algebra", 2.0).await;
    let slot = h.slot(&teacher, &subject, 2).await;
    let student = h.user("Sam Student", Role::Student).await;
    let booking = h.actions.request_slot(&student, slot.id).await.unwrap().record;

    h.actions
        .update_booking_status(&teacher, booking.id, BookingStatus::Confirmed)
        .await
        .unwrap();

    let dashboard = h.teachers.load(&teacher).await.unwrap();
    assert!(dashboard.pending_requests.is_empty());

    let err = h
        .actions
        .update_booking_status(&teacher, booking.id, BookingStatus::Declined)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::InvalidTransition(BookingStatus::Confirmed)));
}

#[tokio::test]
async fn only_confirm_and_decline_are_offered() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let subject = h.subject(&teacher, "Algebra", 2.0).await;
    let slot = h.slot(&teacher, &subject, 2).await;
    let student = h.user("Sam Student", Role::Student).await;
    let booking = h.actions.request_slot(&student, slot.id).await.unwrap().record;

    for status in [BookingStatus::Pending, BookingStatus::Completed] {
        let err = h
            .actions
            .update_booking_status(&teacher, booking.id, status)
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
    }
}

#[tokio::test]
async fn teachers_cannot_touch_each_others_records() {
    let h = Harness::new();
    let tess = h.user("Tess Teacher", Role::Teacher).await;
    let tom = h.user("Tom Teacher", Role::Teacher).await;
    let student = h.user("Sam Student", Role::Student).await;
    let subject = h.subject(&tess, "Algebra", 2.0).await;
    let slot = h.slot(&tess, &subject, 2).await;
    let booking = h.actions.request_slot(&student, slot.id).await.unwrap().record;

    let err = h
        .actions
        .update_booking_status(&tom, booking.id, BookingStatus::Confirmed)
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotOwner("bookings")));

    let err = h.actions.cancel_slot(&tom, slot.id, true).await.unwrap_err();
    assert!(matches!(err, ActionError::NotOwner("slots")));

    let err = h
        .actions
        .create_slot(&tom, form(subject.id, 30, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::NotOwner("subjects")));
}

#[tokio::test]
async fn actions_are_gated_by_role() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let student = h.user("Sam Student", Role::Student).await;
    let subject = h.subject(&teacher, "Algebra", 2.0).await;
    let slot = h.slot(&teacher, &subject, 2).await;

    let err = h.actions.create_subject(&student, "Physics", 1.0).await.unwrap_err();
    assert!(matches!(err, ActionError::Forbidden(Role::Teacher)));

    let err = h.actions.cancel_slot(&student, slot.id, true).await.unwrap_err();
    assert!(matches!(err, ActionError::Forbidden(Role::Teacher)));

    let err = h.actions.request_slot(&teacher, slot.id).await.unwrap_err();
    assert!(matches!(err, ActionError::Forbidden(Role::Student)));
}

#[tokio::test]
async fn subject_and_slot_input_is_validated() {
    let h = Harness::new();
    let teacher = h.user("Tess Teacher", Role::Teacher).await;

    for (name, price) in [("  ", 2.0), ("Algebra", -1.0), ("Algebra", f64::NAN)] {
        let err = h.actions.create_subject(&teacher, name, price).await.unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
    }

    let subject = h.subject(&teacher, "  Algebra ", 2.0).await;
    assert_eq!(subject.name, "Algebra");
    assert_eq!(subject.teacher_name, "Tess Teacher");

    for (duration, capacity) in [(0, 1), (30, 0)] {
        let err = h
            .actions
            .create_slot(&teacher, form(subject.id, duration, capacity))
            .await
            .unwrap_err();
        assert!(matches!(err, ActionError::Invalid(_)));
    }

    let err = h
        .actions
        .create_slot(&teacher, form(uuid::Uuid::new_v4(), 30, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ActionError::Missing("Subject")));
}
