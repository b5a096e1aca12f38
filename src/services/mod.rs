//! Business operations behind the HTTP handlers and workers.
//!
//! Services take the repository as a generic trait object bound so tests can
//! swap in the mock repository, check the caller's roles first and translate
//! every lower-level failure into a [`ServiceError`].

use serde_json::Value;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::types::{ClientId, HubId};
use crate::forms::FormError;
use crate::pagination::MAX_PAGE;
use crate::repository::{ActivityWriter, EmployeeWriter};

pub mod activities;
pub mod clients;
pub mod deals;
pub mod employees;
pub mod errors;
pub mod migration;
pub mod offers;
pub mod payments;
pub mod reminders;
pub mod reports;
pub mod spare_parts;
pub mod visits;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{ServiceError, ServiceResult};

/// Fails with [`ServiceError::Unauthorized`] unless the user holds `role`.
pub fn ensure_role(user: &AuthenticatedUser, role: &str) -> ServiceResult<()> {
    if user.has_role(role) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Fails with [`ServiceError::Unauthorized`] unless the user holds one of
/// `roles`.
pub fn ensure_any_role(user: &AuthenticatedUser, roles: &[&str]) -> ServiceResult<()> {
    if user.has_any_role(roles) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

/// Page requested by the caller; missing means the first one.
pub(crate) fn requested_page(page: Option<usize>) -> ServiceResult<usize> {
    match page.unwrap_or(1) {
        page if page > MAX_PAGE => Err(FormError::InvalidPage(MAX_PAGE).into()),
        page => Ok(page.max(1)),
    }
}

pub(crate) fn user_hub(user: &AuthenticatedUser) -> ServiceResult<HubId> {
    Ok(HubId::new(user.hub_id)?)
}

/// Upserts the caller as an employee of their hub so history rows can
/// reference them.
pub(crate) fn current_employee<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Employee>
where
    R: EmployeeWriter + ?Sized,
{
    let new_employee = NewEmployee::try_from(user)?;
    repo.upsert_employee(&new_employee).map_err(|err| {
        log::error!("Failed to upsert employee {}: {err}", user.email);
        ServiceError::from(err)
    })
}

/// Appends an entry to the client's timeline. Failures are logged only: the
/// change that triggered the entry has already been committed.
pub(crate) fn append_activity<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: ClientId,
    kind: ActivityKind,
    payload: Value,
) where
    R: ActivityWriter + ?Sized,
{
    let author = match NewEmployee::try_from(user) {
        Ok(author) => author,
        Err(err) => {
            log::error!("Cannot record {kind} activity for {}: {err}", user.email);
            return;
        }
    };
    if let Err(err) = repo.record_activity(&author, client_id, &kind, &payload) {
        log::error!("Failed to record {kind} activity for client {client_id}: {err}");
    }
}
