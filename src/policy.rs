//! Ownership checks for mutating a profile, post or one of their entries.

use tracing::warn;
use uuid::Uuid;

use crate::error::AppError;

/// Anything with a recorded owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl<T: Owned + ?Sized> Owned for &T {
    fn owner_id(&self) -> Uuid {
        (**self).owner_id()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// The owner and only the owner may mutate a resource.
pub fn authorize_mutation<R: Owned + ?Sized>(resource: &R, requester: Uuid) -> Decision {
    if resource.owner_id() == requester {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Resolves a looked-up resource into either itself, `NotFound(what)` when it
/// does not exist, or `Forbidden` when someone else owns it.
pub fn ensure_owner<R: Owned>(
    resource: Option<R>,
    requester: Uuid,
    what: &'static str,
) -> Result<R, AppError> {
    let resource = resource.ok_or(AppError::NotFound(what))?;
    match authorize_mutation(&resource, requester) {
        Decision::Allow => Ok(resource),
        Decision::Deny => {
            warn!(requester = %requester, owner = %resource.owner_id(), "ownership check denied");
            Err(AppError::Forbidden)
        }
    }
}
