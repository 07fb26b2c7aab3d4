//! Ownership checks shared by every resource handler.
//!
//! A resource describes who holds which relation to it (`Parties`) and which
//! relations are enough for each `Action` (`Guarded::grants`). `authorize`
//! then answers the question in one place: admins may do anything, everyone
//! else needs at least one granted relation.

use log::warn;
use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;

/// How a user can be related to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Creator,
    Assignee,
}

/// A mutation a caller wants to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Update,
    Delete,
    ManageMembers,
}

/// The users holding each relation to a resource.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Parties {
    pub owner: Option<Uuid>,
    pub creator: Option<Uuid>,
    pub assignee: Option<Uuid>,
}

impl Parties {
    pub fn holder(&self, relation: Relation) -> Option<Uuid> {
        match relation {
            Relation::Owner => self.owner,
            Relation::Creator => self.creator,
            Relation::Assignee => self.assignee,
        }
    }
}

/// Implemented by every resource subject to ownership checks.
pub trait Guarded {
    fn parties(&self) -> Parties;

    /// Relations that permit `action` for non-admin callers. An empty slice
    /// means the action is reserved to admins.
    fn grants(&self, action: Action) -> &'static [Relation];
}

/// Decides whether `identity` may perform `action` on `resource`.
pub fn authorize<R: Guarded>(
    identity: &Identity,
    resource: &R,
    action: Action,
) -> Result<(), AppError> {
    if is_permitted(identity, &resource.parties(), resource.grants(action)) {
        Ok(())
    } else {
        warn!("user {} denied {:?}", identity.user_id, action);
        Err(AppError::Forbidden(
            "You are not allowed to perform this action".into(),
        ))
    }
}

/// The pure rule behind `authorize`.
pub fn is_permitted(identity: &Identity, parties: &Parties, allowed: &[Relation]) -> bool {
    identity.is_admin()
        || allowed
            .iter()
            .any(|relation| parties.holder(*relation) == Some(identity.user_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: Uuid::new_v4(),
            role,
        }
    }

    #[test]
    fn test_admin_is_always_permitted() {
        let admin = identity(Role::Admin);
        assert!(is_permitted(&admin, &Parties::default(), &[]));
    }

    #[test]
    fn test_holder_of_granted_relation_is_permitted() {
        let caller = identity(Role::TeamMember);
        let parties = Parties {
            creator: Some(Uuid::new_v4()),
            assignee: Some(caller.user_id),
            ..Parties::default()
        };
        assert!(is_permitted(
            &caller,
            &parties,
            &[Relation::Creator, Relation::Assignee]
        ));
        assert!(!is_permitted(&caller, &parties, &[Relation::Creator]));
    }

    #[test]
    fn test_empty_grants_are_admin_only() {
        let caller = identity(Role::Manager);
        let parties = Parties {
            owner: Some(caller.user_id),
            ..Parties::default()
        };
        assert!(!is_permitted(&caller, &parties, &[]));
    }

    #[test]
    fn test_missing_holder_never_matches() {
        let caller = identity(Role::TeamMember);
        assert!(!is_permitted(
            &caller,
            &Parties::default(),
            &[Relation::Owner, Relation::Creator, Relation::Assignee]
        ));
    }
}
