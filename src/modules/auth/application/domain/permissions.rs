//! Role-based access rules.
//!
//! Every rule has two checks evaluated in order: an endpoint check
//! (`has_permission`) before the resource is loaded, and an object check
//! (`has_object_permission`) once the owner of the resource is known.

use super::entities::{Role, User, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Read-only verbs.
    pub fn is_safe(&self) -> bool {
        matches!(
            self,
            RequestMethod::Get | RequestMethod::Head | RequestMethod::Options
        )
    }
}

/// The signed-in account behind a request, as currently stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
    pub is_staff: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
            is_staff: user.is_staff,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(Principal),
}

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(principal) => Some(principal),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Caller::Authenticated(_))
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.principal().map(|p| p.user_id)
    }

    fn is_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_admin)
    }

    fn is_moderator(&self) -> bool {
        self.principal().is_some_and(Principal::is_moderator)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("You do not have permission to perform this action")]
    Forbidden,
}

impl AccessDenied {
    fn for_caller(caller: &Caller) -> Self {
        if caller.is_authenticated() {
            AccessDenied::Forbidden
        } else {
            AccessDenied::NotAuthenticated
        }
    }
}

pub trait Permission {
    fn has_permission(&self, caller: &Caller, method: RequestMethod) -> bool;

    fn has_object_permission(&self, _caller: &Caller, _method: RequestMethod, _owner: UserId) -> bool {
        true
    }
}

/// Signed-in admins (role admin or staff flag) only, for every verb.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOnly;

impl Permission for AdminOnly {
    fn has_permission(&self, caller: &Caller, _method: RequestMethod) -> bool {
        caller.is_admin()
    }
}

/// Anyone may read; only admins may write.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdminOrReadOnly;

impl Permission for AdminOrReadOnly {
    fn has_permission(&self, caller: &Caller, method: RequestMethod) -> bool {
        method.is_safe() || caller.is_admin()
    }
}

/// Anyone may read; signed-in callers may create; only the author,
/// a moderator or an admin may change an existing resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerOrModeratorOrAdminOrReadOnly;

impl Permission for OwnerOrModeratorOrAdminOrReadOnly {
    fn has_permission(&self, caller: &Caller, method: RequestMethod) -> bool {
        method.is_safe() || caller.is_authenticated()
    }

    fn has_object_permission(&self, caller: &Caller, method: RequestMethod, owner: UserId) -> bool {
        method.is_safe()
            || caller.user_id() == Some(owner)
            || caller.is_moderator()
            || caller.is_admin()
    }
}

/// Any signed-in caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

impl Permission for Authenticated {
    fn has_permission(&self, caller: &Caller, _method: RequestMethod) -> bool {
        caller.is_authenticated()
    }
}

/// Endpoint check.
pub fn authorize<P: Permission>(
    permission: &P,
    caller: &Caller,
    method: RequestMethod,
) -> Result<(), AccessDenied> {
    if permission.has_permission(caller, method) {
        Ok(())
    } else {
        Err(AccessDenied::for_caller(caller))
    }
}

/// Endpoint check followed by the object check; the first failure wins.
pub fn authorize_object<P: Permission>(
    permission: &P,
    caller: &Caller,
    method: RequestMethod,
    owner: UserId,
) -> Result<(), AccessDenied> {
    authorize(permission, caller, method)?;

    if permission.has_object_permission(caller, method, owner) {
        Ok(())
    } else {
        Err(AccessDenied::for_caller(caller))
    }
}
