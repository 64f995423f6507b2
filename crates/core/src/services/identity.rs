//! Caller identity and role capabilities.
//!
//! Every authorization decision in the services goes through
//! [`Role::can`]-style lookups on a request-scoped [`Actor`]; there are no
//! per-post ACLs and no stored capability flags.

use pawpost_common::{AppError, AppResult};
use pawpost_db::entities::user;
use serde::Serialize;

pub use pawpost_db::entities::user::Role;

/// Something a role may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Create posts and edit or delete one's own.
    Author,
    /// Approve, reject and feature posts; manage users.
    Moderate,
    /// See pending and rejected posts of any author.
    ViewAllStatuses,
}

/// Capability lookup for a role.
#[must_use]
pub const fn role_can(role: Role, capability: Capability) -> bool {
    match capability {
        Capability::Author => matches!(role, Role::Editor | Role::Admin),
        Capability::Moderate | Capability::ViewAllStatuses => matches!(role, Role::Admin),
    }
}

/// The authenticated caller of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    /// Whether the actor's role grants a capability.
    #[must_use]
    pub const fn can(&self, capability: Capability) -> bool {
        role_can(self.role, capability)
    }

    /// Fail with `Forbidden` unless the actor's role grants a capability.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' may not {}",
                self.role.as_str(),
                describe(capability)
            )))
        }
    }

    /// Whether the actor is the given user.
    #[must_use]
    pub fn is(&self, user_id: &str) -> bool {
        self.id == user_id
    }
}

impl From<&user::Model> for Actor {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Fail with `Unauthorized` when there is no caller.
pub fn require_actor(actor: Option<&Actor>) -> AppResult<&Actor> {
    actor.ok_or(AppError::Unauthorized)
}

const fn describe(capability: Capability) -> &'static str {
    match capability {
        Capability::Author => "author posts",
        Capability::Moderate => "moderate",
        Capability::ViewAllStatuses => "view unpublished posts",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role) -> Actor {
        Actor {
            id: "u1".to_string(),
            name: "Tester".to_string(),
            role,
        }
    }

    #[test]
    fn test_capability_table() {
        assert!(!role_can(Role::Visitor, Capability::Author));
        assert!(!role_can(Role::User, Capability::Author));
        assert!(role_can(Role::Editor, Capability::Author));
        assert!(role_can(Role::Admin, Capability::Author));

        assert!(!role_can(Role::Editor, Capability::Moderate));
        assert!(role_can(Role::Admin, Capability::Moderate));

        assert!(!role_can(Role::Editor, Capability::ViewAllStatuses));
        assert!(role_can(Role::Admin, Capability::ViewAllStatuses));
    }

    #[test]
    fn test_privileges_are_ordered() {
        let roles = [Role::Visitor, Role::User, Role::Editor, Role::Admin];
        let caps = [
            Capability::Author,
            Capability::Moderate,
            Capability::ViewAllStatuses,
        ];
        for pair in roles.windows(2) {
            for cap in caps {
                if role_can(pair[0], cap) {
                    assert!(role_can(pair[1], cap), "{:?} lost {cap:?}", pair[1]);
                }
            }
        }
    }

    #[test]
    fn test_require_forbidden() {
        let err = actor(Role::Editor).require(Capability::Moderate).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(actor(Role::Admin).require(Capability::Moderate).is_ok());
    }

    #[test]
    fn test_require_actor() {
        assert!(matches!(require_actor(None), Err(AppError::Unauthorized)));
        let a = actor(Role::User);
        assert_eq!(require_actor(Some(&a)).unwrap().id, "u1");
    }
}
