//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use mentor_booking_core::{
    BookingActions, DatabaseService, IdentityProvider, IdentityResolver, StudentView, TeacherView,
    User,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// The core services all share the same store handle; none of them caches reads.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub config: Arc<Config>,
    pub resolver: IdentityResolver,
    pub students: StudentView,
    pub teachers: TeacherView,
    pub actions: BookingActions,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<Config>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(db.clone()),
            students: StudentView::new(db.clone()),
            teachers: TeacherView::new(db.clone()),
            actions: BookingActions::new(db.clone()),
            db,
            identity,
            config,
        }
    }
}

/// The signed-in user, placed in request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);
