//! crates/mentor_booking_core/src/identity.rs
//!
//! Resolves a provider identity into an application `User`, creating the
//! record with the default role on first sign-in.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{Identity, NewUser, Role, User};
use crate::ports::{DatabaseService, PortError, PortResult};
use crate::view::{route, View};

/// Outcome of resolving an identity.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub user: User,
    /// True when this call created the user record.
    pub bootstrapped: bool,
}

/// The answer to "who is signed in right now".
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    SignedOut,
    SignedIn(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn(user) => Some(user),
        }
    }

    pub fn view(&self) -> View {
        route(self.user())
    }
}

#[derive(Clone)]
pub struct IdentityResolver {
    db: Arc<dyn DatabaseService>,
}

impl IdentityResolver {
    pub fn new(db: Arc<dyn DatabaseService>) -> Self {
        Self { db }
    }

    /// Looks up the user for `identity`, inserting a student record if none exists.
    ///
    /// An existing record is returned as stored; its role is never touched here.
    pub async fn resolve(&self, identity: &Identity) -> PortResult<Resolution> {
        if let Some(user) = self.db.get_user(identity.uid).await? {
            debug!(user_id = %user.id, role = user.role.as_str(), "Resolved existing user");
            return Ok(Resolution {
                user,
                bootstrapped: false,
            });
        }

        let inserted = self
            .db
            .insert_user(NewUser {
                id: identity.uid,
                email: identity.email.clone(),
                display_name: identity.display_name.clone(),
                photo_url: identity.photo_url.clone(),
                role: Role::default(),
            })
            .await?;
        if let Some(user) = inserted {
            info!(user_id = %user.id, "Bootstrapped user record on first sign-in");
            return Ok(Resolution {
                user,
                bootstrapped: true,
            });
        }

        // A concurrent sign-in created the record between the read and the insert.
        let user = self
            .db
            .get_user(identity.uid)
            .await?
            .ok_or_else(|| PortError::NotFound(format!("User {}", identity.uid)))?;
        debug!(user_id = %user.id, "User record created by a concurrent sign-in");
        Ok(Resolution {
            user,
            bootstrapped: false,
        })
    }

    /// Polled state query backing the view router.
    ///
    /// A session whose user record has disappeared counts as signed out.
    pub async fn current(&self, user_id: Option<Uuid>) -> PortResult<AuthState> {
        let Some(user_id) = user_id else {
            return Ok(AuthState::SignedOut);
        };
        Ok(match self.db.get_user(user_id).await? {
            Some(user) => AuthState::SignedIn(user),
            None => AuthState::SignedOut,
        })
    }
}
