//! crates/mentor_booking_core/src/view.rs
//!
//! Role-based view routing. Exactly one page is visible at a time.

use crate::domain::{Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    StudentDashboard,
    TeacherDashboard,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Login => "login",
            View::StudentDashboard => "student",
            View::TeacherDashboard => "teacher",
        }
    }
}

/// Picks the page for the resolved user, or the login page when signed out.
pub fn route(user: Option<&User>) -> View {
    match user {
        None => View::Login,
        Some(u) if u.role == Role::Teacher => View::TeacherDashboard,
        Some(_) => View::StudentDashboard,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn user_with(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            display_name: "Ada Lovelace".to_string(),
            photo_url: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn signed_out_goes_to_login() {
        assert_eq!(route(None), View::Login);
    }

    #[test]
    fn roles_pick_their_dashboard() {
        assert_eq!(route(Some(&user_with(Role::Teacher))), View::TeacherDashboard);
        assert_eq!(route(Some(&user_with(Role::Student))), View::StudentDashboard);
    }
}
