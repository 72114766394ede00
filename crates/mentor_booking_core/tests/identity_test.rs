//! First sign-in bootstrap and the polled auth state.

mod common;

use common::{identity, Harness};
use mentor_booking_core::{AuthState, DatabaseService, Role, View};
use uuid::Uuid;

#[tokio::test]
async fn first_sign_in_creates_one_student_record() {
    let h = Harness::new();
    let who = identity("Ada Lovelace");

    let first = h.resolver.resolve(&who).await.unwrap();
    assert!(first.bootstrapped);
    assert_eq!(first.user.id, who.uid);
    assert_eq!(first.user.role, Role::Student);
    assert_eq!(first.user.display_name, "Ada Lovelace");
    assert_eq!(first.user.email, "ada.lovelace@example.com");

    let second = h.resolver.resolve(&who).await.unwrap();
    assert!(!second.bootstrapped);
    assert_eq!(second.user, first.user);
}

#[tokio::test]
async fn concurrent_first_sign_ins_share_one_record() {
    let h = Harness::new();
    let who = identity("Ada Lovelace");

    let (a, b) = tokio::join!(h.resolver.resolve(&who), h.resolver.resolve(&who));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.user, b.user);
    assert_eq!(a.user.role, Role::Student);
    assert_eq!(
        [a.bootstrapped, b.bootstrapped].iter().filter(|created| **created).count(),
        1
    );
}

#[tokio::test]
async fn later_sign_ins_keep_an_assigned_role() {
    let h = Harness::new();
    let who = identity("Grace Hopper");
    let first = h.resolver.resolve(&who).await.unwrap();
    h.store.assign_role(first.user.id, Role::Teacher).await.unwrap();

    let again = h.resolver.resolve(&who).await.unwrap();
    assert!(!again.bootstrapped);
    assert_eq!(again.user.role, Role::Teacher);
    assert_eq!(again.user.created_at, first.user.created_at);
}

#[tokio::test]
async fn current_state_drives_the_router() {
    let h = Harness::new();

    let signed_out = h.resolver.current(None).await.unwrap();
    assert_eq!(signed_out, AuthState::SignedOut);
    assert_eq!(signed_out.view(), View::Login);

    let student = h.user("Sam Student", Role::Student).await;
    let state = h.resolver.current(Some(student.id)).await.unwrap();
    assert_eq!(state.view(), View::StudentDashboard);

    let teacher = h.user("Tess Teacher", Role::Teacher).await;
    let state = h.resolver.current(Some(teacher.id)).await.unwrap();
    assert_eq!(state.view(), View::TeacherDashboard);
}

#[tokio::test]
async fn session_for_an_unknown_user_is_signed_out() {
    let h = Harness::new();
    let state = h.resolver.current(Some(Uuid::new_v4())).await.unwrap();
    assert_eq!(state, AuthState::SignedOut);
}

#[tokio::test]
async fn expired_auth_sessions_are_rejected() {
    let h = Harness::new();
    let user = h.user("Sam Student", Role::Student).await;

    h.store
        .create_auth_session("live", user.id, chrono::Utc::now() + chrono::Duration::days(1))
        .await
        .unwrap();
    h.store
        .create_auth_session("stale", user.id, chrono::Utc::now() - chrono::Duration::seconds(1))
        .await
        .unwrap();

    assert_eq!(h.store.validate_auth_session("live").await.unwrap(), user.id);
    assert!(h.store.validate_auth_session("stale").await.is_err());

    h.store.delete_auth_session("live").await.unwrap();
    assert!(h.store.validate_auth_session("live").await.is_err());
}
