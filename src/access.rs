//! Ownership and administrator checks.
//!
//! Every function here is pure: it looks only at the principal and the
//! record already loaded by the caller.

use thiserror::Error;

use crate::database::models::{Item, User};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct AccessDenied(pub &'static str);

impl AccessDenied {
    pub const NOT_ENOUGH_PRIVILEGES: AccessDenied =
        AccessDenied("The user doesn't have enough privileges");
    pub const SUPERUSER_SELF_DELETE: AccessDenied =
        AccessDenied("Super users are not allowed to delete themselves");
}

/// Which door a user write comes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRoute {
    /// `/users/me`: the principal acting on their own account.
    SelfService,
    /// `/users/{id}`: an administrator acting on any account.
    Administrative,
}

pub fn can_read_item(principal: &User, item: &Item) -> bool {
    principal.is_superuser || item.owner_id == principal.id
}

pub fn can_read_user(principal: &User, target: &User) -> bool {
    principal.is_superuser || principal.id == target.id
}

pub fn can_write_user(principal: &User, target: &User, route: UserRoute) -> bool {
    match route {
        UserRoute::SelfService => principal.id == target.id,
        UserRoute::Administrative => principal.is_superuser,
    }
}

pub fn can_delete_self(principal: &User) -> Result<(), AccessDenied> {
    if principal.is_superuser {
        return Err(AccessDenied::SUPERUSER_SELF_DELETE);
    }
    Ok(())
}

pub fn can_delete_other(principal: &User, target: &User) -> Result<(), AccessDenied> {
    require_superuser(principal)?;
    if principal.id == target.id {
        return Err(AccessDenied::SUPERUSER_SELF_DELETE);
    }
    Ok(())
}

pub fn require_superuser(principal: &User) -> Result<(), AccessDenied> {
    if principal.is_superuser {
        Ok(())
    } else {
        Err(AccessDenied::NOT_ENOUGH_PRIVILEGES)
    }
}
