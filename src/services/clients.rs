//! Client relationship management.

use std::collections::HashSet;
use std::io::Read;

use crate::auth::AuthenticatedUser;
use crate::domain::client::Client;
use crate::domain::types::{ClientId, EmployeeEmail};
use crate::dto::clients::{ActivityEntry, ClientDetails, ClientsQuery, ImportReport};
use crate::forms::clients::{ClientForm, ClientPayload, parse_clients_csv};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityListQuery, ActivityReader, ClientListQuery, ClientReader, ClientWriter,
};
use crate::services::{
    ServiceError, ServiceResult, ensure_any_role, ensure_role, requested_page, user_hub,
};
use crate::{
    ACCOUNTANT_ROLE, ENGINEER_ROLE, MAINTENANCE_MANAGER_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE,
    SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE,
};

/// Roles that see every client of their hub.
const HUB_WIDE_ROLES: &[&str] = &[
    SERVICE_ADMIN_ROLE,
    SALES_MANAGER_ROLE,
    MAINTENANCE_MANAGER_ROLE,
    ACCOUNTANT_ROLE,
    ENGINEER_ROLE,
];

const EDITOR_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE];

const RECENT_ACTIVITIES: usize = 10;

/// Loads a client of the caller's hub, enforcing that salesmen only reach the
/// clients assigned to them.
pub(crate) fn load_accessible_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<Client>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = user_hub(user)?;
    let client_id = ClientId::new(client_id)?;

    if !user.has_any_role(HUB_WIDE_ROLES) {
        if !user.has_role(SALESMAN_ROLE) {
            return Err(ServiceError::Unauthorized);
        }
        let email = EmployeeEmail::new(user.email.as_str())?;
        if !repo.check_client_assigned_to_employee(client_id, &email)? {
            return Err(ServiceError::Unauthorized);
        }
    }

    repo.get_client_by_id(client_id, hub_id)?
        .ok_or(ServiceError::NotFound)
}

/// Lists the clients visible to the caller, optionally filtered by a search
/// term.
pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ClientsQuery,
) -> ServiceResult<Paginated<Client>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = user_hub(user)?;
    let page = requested_page(query.page)?;
    let mut list_query = ClientListQuery::new(hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(term) = query
        .search
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
    {
        list_query = list_query.search(term);
    }

    let (total, clients) = if user.has_any_role(HUB_WIDE_ROLES) {
        repo.list_clients(list_query)?
    } else if user.has_role(SALESMAN_ROLE) {
        let email = EmployeeEmail::new(user.email.as_str())?;
        repo.list_clients(list_query.employee_email(email))?
    } else {
        (0, Vec::new())
    };

    Ok(Paginated::new(clients, page, total, DEFAULT_ITEMS_PER_PAGE))
}

/// Returns the client card with assigned employees and the latest activities.
pub fn get_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<ClientDetails>
where
    R: ClientReader + ActivityReader + ?Sized,
{
    let client = load_accessible_client(repo, user, client_id)?;

    let employees = repo.list_client_employees(client.id)?;
    let (_, activities) = repo
        .list_activities(ActivityListQuery::new(client.id).paginate(1, RECENT_ACTIVITIES))?;

    Ok(ClientDetails {
        client,
        employees,
        recent_activities: activities.into_iter().map(ActivityEntry::from).collect(),
    })
}

pub fn create_client<R>(repo: &R, user: &AuthenticatedUser, form: ClientForm) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_any_role(user, EDITOR_ROLES)?;

    let hub_id = user_hub(user)?;
    let payload = ClientPayload::try_from(form)?;

    if let Some(email) = &payload.email
        && repo.get_client_by_email(email, hub_id)?.is_some()
    {
        return Err(ServiceError::Conflict(format!(
            "client with email {email} already exists"
        )));
    }

    let client = repo
        .create_client(&payload.into_new_client(hub_id))
        .map_err(|err| {
            log::error!("Failed to create a client: {err}");
            err
        })?;

    log::info!("Client {} created by {}", client.id, user.email);
    Ok(client)
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientReader + ClientWriter + ?Sized,
{
    ensure_any_role(user, EDITOR_ROLES)?;

    let client = load_accessible_client(repo, user, client_id)?;
    let payload = ClientPayload::try_from(form)?;

    if let Some(email) = &payload.email
        && let Some(existing) = repo.get_client_by_email(email, client.hub_id)?
        && existing.id != client.id
    {
        return Err(ServiceError::Conflict(format!(
            "client with email {email} already exists"
        )));
    }

    repo.update_client(client.id, client.hub_id, &payload.into_update())
        .map_err(|err| {
            log::error!("Failed to update client {}: {err}", client.id);
            ServiceError::from(err)
        })
}

pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let hub_id = user_hub(user)?;
    let client_id = ClientId::new(client_id)?;

    repo.delete_client(client_id, hub_id).map_err(|err| {
        log::error!("Failed to delete client {client_id}: {err}");
        err
    })?;

    log::info!("Client {client_id} deleted by {}", user.email);
    Ok(())
}

/// Imports clients from a CSV upload. Rows whose e-mail is already known in
/// the hub, or repeats an e-mail seen earlier in the file, are skipped.
pub fn import_clients_csv<R, Rd>(
    repo: &R,
    user: &AuthenticatedUser,
    reader: Rd,
) -> ServiceResult<ImportReport>
where
    R: ClientReader + ClientWriter + ?Sized,
    Rd: Read,
{
    ensure_role(user, SERVICE_ADMIN_ROLE)?;

    let hub_id = user_hub(user)?;

    let payloads = parse_clients_csv(reader).map_err(|err| {
        log::error!("Failed to parse clients: {err}");
        ServiceError::from(err)
    })?;

    let total = payloads.len();
    let mut seen = HashSet::new();
    let mut new_clients = Vec::with_capacity(total);

    for payload in payloads {
        if let Some(email) = &payload.email
            && (!seen.insert(email.clone()) || repo.get_client_by_email(email, hub_id)?.is_some())
        {
            continue;
        }
        new_clients.push(payload.into_new_client(hub_id));
    }

    let inserted = if new_clients.is_empty() {
        0
    } else {
        repo.create_clients(&new_clients).map_err(|err| {
            log::error!("Failed to add clients: {err}");
            err
        })?
    };

    log::info!("Imported {inserted} of {total} clients into hub {hub_id}");
    Ok(ImportReport {
        inserted,
        skipped: total - inserted,
    })
}
