//! Maintenance visit scheduling.
//!
//! Every status change goes through the visit lifecycle table; the history
//! row is written in the same transaction as the new status. Timeline
//! entries and notifications follow the commit and never fail the change.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::employee::Employee;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::notification::Notification;
use crate::domain::types::{ClientEmail, ClientId, EmployeeEmail, EmployeeId, SanitizedText, VisitId};
use crate::domain::visit::{
    MaintenanceVisit, NewMaintenanceVisit, NewVisitStatusChange, PRIVILEGED_VISIT_ROLES,
    VisitStatus, VisitTransition,
};
use crate::dto::visits::{VisitDetails, VisitsQuery};
use crate::forms::visits::{
    AssignEngineerForm, ChangeVisitStatusForm, ChangeVisitStatusPayload, CreateVisitForm,
    CreateVisitPayload, RescheduleVisitForm, RescheduleVisitPayload,
};
use crate::forms::{FormError, non_blank};
use crate::notifications::{Notifier, notify_or_log};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{
    ActivityWriter, ClientReader, EmployeeReader, EmployeeWriter, VisitListQuery, VisitReader,
    VisitWriter,
};
use crate::services::{
    ServiceError, ServiceResult, append_activity, current_employee, ensure_any_role, ensure_role,
    requested_page, user_hub,
};
use crate::{
    CUSTOMER_ROLE, ENGINEER_ROLE, MAINTENANCE_MANAGER_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE,
    SERVICE_ACCESS_ROLE, SERVICE_ADMIN_ROLE,
};

/// Staff roles that may book a visit for any client of the hub. Customers
/// book only for the client registered under their e-mail.
const BOOKING_STAFF_ROLES: &[&str] = &[
    SERVICE_ADMIN_ROLE,
    MAINTENANCE_MANAGER_ROLE,
    ENGINEER_ROLE,
    SALES_MANAGER_ROLE,
    SALESMAN_ROLE,
];

/// Roles that see every visit of their hub.
const VISIT_OVERSEER_ROLES: &[&str] = &[
    SERVICE_ADMIN_ROLE,
    MAINTENANCE_MANAGER_ROLE,
    SALES_MANAGER_ROLE,
];

pub(crate) const VISIT_WORKER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, MAINTENANCE_MANAGER_ROLE, ENGINEER_ROLE];

fn is_privileged(user: &AuthenticatedUser) -> bool {
    user.has_any_role(PRIVILEGED_VISIT_ROLES)
}

/// Approving a request and cancelling are reserved to privileged roles.
fn requires_privilege(from: VisitStatus, to: VisitStatus) -> bool {
    to == VisitStatus::Cancelled
        || (from == VisitStatus::PendingApproval && to == VisitStatus::Scheduled)
}

/// Privileged roles move any visit; engineers only the ones assigned to them.
pub(crate) fn ensure_can_move(
    user: &AuthenticatedUser,
    actor: &Employee,
    visit: &MaintenanceVisit,
) -> ServiceResult<()> {
    if is_privileged(user)
        || (user.has_role(ENGINEER_ROLE) && visit.engineer_id == Some(actor.id))
    {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

pub(crate) fn load_visit<R>(
    repo: &R,
    user: &AuthenticatedUser,
    visit_id: i32,
) -> ServiceResult<MaintenanceVisit>
where
    R: VisitReader + ?Sized,
{
    let hub_id = user_hub(user)?;
    let visit_id = VisitId::new(visit_id)?;
    repo.get_visit_by_id(visit_id, hub_id)?
        .ok_or(ServiceError::NotFound)
}

/// Engineers see their own visits and customers the visits of the client
/// registered under their e-mail.
fn ensure_visit_visible<R>(
    repo: &R,
    user: &AuthenticatedUser,
    visit: &MaintenanceVisit,
) -> ServiceResult<()>
where
    R: ClientReader + EmployeeReader + ?Sized,
{
    if user.has_any_role(VISIT_OVERSEER_ROLES) {
        return Ok(());
    }
    if user.has_role(ENGINEER_ROLE) {
        let email = EmployeeEmail::new(user.email.as_str())?;
        if let Some(engineer) = repo.get_employee_by_email(&email, visit.hub_id)?
            && visit.engineer_id == Some(engineer.id)
        {
            return Ok(());
        }
    }
    if user.has_role(CUSTOMER_ROLE) {
        let email = ClientEmail::new(user.email.as_str())?;
        if let Some(client) = repo.get_client_by_id(visit.client_id, visit.hub_id)?
            && client.email.as_ref() == Some(&email)
        {
            return Ok(());
        }
    }
    Err(ServiceError::Unauthorized)
}

/// Sends a notification to the engineer assigned to the visit, if any.
pub(crate) fn notify_engineer<R, N>(
    repo: &R,
    notifier: &N,
    visit: &MaintenanceVisit,
    title: &str,
    message: &str,
) -> bool
where
    R: EmployeeReader + ?Sized,
    N: Notifier + ?Sized,
{
    let Some(engineer_id) = visit.engineer_id else {
        return false;
    };
    match repo.get_employee_by_id(engineer_id, visit.hub_id) {
        Ok(Some(engineer)) => {
            notify_or_log(
                notifier,
                &Notification::to_email(visit.hub_id, engineer.email.as_str(), title, message),
            );
            true
        }
        Ok(None) => {
            log::warn!("Engineer {engineer_id} of visit {} no longer exists", visit.id);
            false
        }
        Err(err) => {
            log::error!("Failed to load engineer {engineer_id}: {err}");
            false
        }
    }
}

fn notify_managers<N>(notifier: &N, visit: &MaintenanceVisit, title: &str, message: &str)
where
    N: Notifier + ?Sized,
{
    notify_or_log(
        notifier,
        &Notification::to_role(visit.hub_id, MAINTENANCE_MANAGER_ROLE, title, message),
    );
}

/// Creates a visit. Privileged callers schedule it directly, everyone else
/// files a request that waits for approval.
pub fn create_visit<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    form: CreateVisitForm,
) -> ServiceResult<MaintenanceVisit>
where
    R: ClientReader + EmployeeReader + VisitWriter + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let staff = user.has_any_role(BOOKING_STAFF_ROLES);
    if !staff {
        ensure_role(user, CUSTOMER_ROLE)?;
    }

    let hub_id = user_hub(user)?;
    let payload = CreateVisitPayload::try_from(form)?;

    let client = repo
        .get_client_by_id(payload.client_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    if !staff {
        let own_email = ClientEmail::new(user.email.as_str())?;
        if client.email.as_ref() != Some(&own_email) {
            return Err(ServiceError::Unauthorized);
        }
    }

    if let Some(engineer_id) = payload.engineer_id {
        if !is_privileged(user) {
            return Err(ServiceError::Unauthorized);
        }
        if repo.get_employee_by_id(engineer_id, hub_id)?.is_none() {
            return Err(ServiceError::NotFound);
        }
    }

    let new_visit = NewMaintenanceVisit {
        hub_id,
        client_id: client.id,
        engineer_id: payload.engineer_id,
        equipment: payload.equipment,
        description: payload.description,
        status: VisitStatus::initial_for_roles(&user.roles),
        scheduled_at: payload.scheduled_at,
        legacy_code: None,
    };

    let visit = repo.create_visit(&new_visit).map_err(|err| {
        log::error!("Failed to create a visit for client {}: {err}", client.id);
        err
    })?;

    log::info!("Visit {} created by {} as {}", visit.id, user.email, visit.status);

    append_activity(
        repo,
        user,
        visit.client_id,
        ActivityKind::Visit,
        json!({
            "visit_id": visit.id.get(),
            "event": "created",
            "status": visit.status.as_str(),
            "equipment": visit.equipment.as_str(),
        }),
    );

    let when = visit.scheduled_at.format("%Y-%m-%d %H:%M");
    if visit.status == VisitStatus::PendingApproval {
        notify_managers(
            notifier,
            &visit,
            "Visit awaiting approval",
            &format!("{} at {} requested for {when}", visit.equipment, client.name),
        );
    }
    notify_engineer(
        repo,
        notifier,
        &visit,
        "Visit assigned",
        &format!("{} at {} on {when}", visit.equipment, client.name),
    );

    Ok(visit)
}

/// Moves the visit to the requested status. Moving to the current status is
/// a no-op that returns the visit unchanged.
pub fn change_visit_status<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    visit_id: i32,
    form: ChangeVisitStatusForm,
) -> ServiceResult<MaintenanceVisit>
where
    R: VisitReader + VisitWriter + EmployeeReader + EmployeeWriter + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, VISIT_WORKER_ROLES)?;

    let payload = ChangeVisitStatusPayload::try_from(form)?;
    let visit = load_visit(repo, user, visit_id)?;
    let actor = current_employee(repo, user)?;

    ensure_can_move(user, &actor, &visit)?;

    let from = visit.status;
    let to = payload.status;

    from.validate_transition(to).map_err(|err| {
        log::warn!("Rejected visit {} status change: {err}", visit.id);
        err
    })?;

    if from == to {
        return Ok(visit);
    }

    if requires_privilege(from, to) && !is_privileged(user) {
        return Err(ServiceError::Unauthorized);
    }

    let transition = VisitTransition {
        visit_id: visit.id,
        from_status: from,
        to_status: to,
        scheduled_at: None,
        history: vec![NewVisitStatusChange {
            visit_id: visit.id,
            from_status: from,
            to_status: to,
            employee_id: actor.id,
            note: payload.note.clone(),
        }],
    };

    let updated = repo.apply_visit_transition(&transition).map_err(|err| {
        log::error!("Failed to move visit {} to {to}: {err}", visit.id);
        err
    })?;

    log::info!("Visit {} moved {from} -> {to} by {}", updated.id, user.email);

    append_activity(
        repo,
        user,
        updated.client_id,
        ActivityKind::Visit,
        json!({
            "visit_id": updated.id.get(),
            "from": from.as_str(),
            "to": to.as_str(),
            "note": payload.note.as_ref().map(SanitizedText::as_str),
        }),
    );

    let title = format!("Visit {} is {to}", updated.id);
    let message = format!("{}: {from} -> {to}", updated.equipment);
    notify_managers(notifier, &updated, &title, &message);
    if updated.engineer_id != Some(actor.id) {
        notify_engineer(repo, notifier, &updated, &title, &message);
    }

    Ok(updated)
}

/// Moves the visit to a new date through `Rescheduled -> Scheduled`.
pub fn reschedule_visit<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    visit_id: i32,
    form: RescheduleVisitForm,
) -> ServiceResult<MaintenanceVisit>
where
    R: VisitReader + VisitWriter + EmployeeReader + EmployeeWriter + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, VISIT_WORKER_ROLES)?;

    let payload = RescheduleVisitPayload::try_from(form)?;
    let visit = load_visit(repo, user, visit_id)?;
    let actor = current_employee(repo, user)?;

    ensure_can_move(user, &actor, &visit)?;

    visit.status.validate_transition(VisitStatus::Rescheduled)?;
    VisitStatus::Rescheduled.validate_transition(VisitStatus::Scheduled)?;

    let mut history = Vec::with_capacity(2);
    if visit.status != VisitStatus::Rescheduled {
        history.push(NewVisitStatusChange {
            visit_id: visit.id,
            from_status: visit.status,
            to_status: VisitStatus::Rescheduled,
            employee_id: actor.id,
            note: payload.note.clone(),
        });
    }
    history.push(NewVisitStatusChange {
        visit_id: visit.id,
        from_status: VisitStatus::Rescheduled,
        to_status: VisitStatus::Scheduled,
        employee_id: actor.id,
        note: None,
    });

    let transition = VisitTransition {
        visit_id: visit.id,
        from_status: visit.status,
        to_status: VisitStatus::Scheduled,
        scheduled_at: Some(payload.scheduled_at),
        history,
    };

    let updated = repo.apply_visit_transition(&transition).map_err(|err| {
        log::error!("Failed to reschedule visit {}: {err}", visit.id);
        err
    })?;

    let when = updated.scheduled_at.format("%Y-%m-%d %H:%M");
    log::info!("Visit {} rescheduled to {when} by {}", updated.id, user.email);

    append_activity(
        repo,
        user,
        updated.client_id,
        ActivityKind::Visit,
        json!({
            "visit_id": updated.id.get(),
            "event": "rescheduled",
            "previous": visit.scheduled_at,
            "scheduled_at": updated.scheduled_at,
        }),
    );

    let title = format!("Visit {} rescheduled", updated.id);
    let message = format!("{} moved to {when}", updated.equipment);
    notify_managers(notifier, &updated, &title, &message);
    if updated.engineer_id != Some(actor.id) {
        notify_engineer(repo, notifier, &updated, &title, &message);
    }

    Ok(updated)
}

pub fn assign_engineer<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    visit_id: i32,
    form: AssignEngineerForm,
) -> ServiceResult<MaintenanceVisit>
where
    R: VisitReader + VisitWriter + EmployeeReader + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, PRIVILEGED_VISIT_ROLES)?;

    let visit = load_visit(repo, user, visit_id)?;
    let engineer_id =
        EmployeeId::new(form.engineer_id).map_err(|_| FormError::InvalidId("engineer"))?;

    if visit.status.is_terminal() {
        return Err(ServiceError::BusinessRule(format!(
            "visit {} is {}",
            visit.id, visit.status
        )));
    }

    let engineer = repo
        .get_employee_by_id(engineer_id, visit.hub_id)?
        .ok_or(ServiceError::NotFound)?;

    let updated = repo.assign_engineer(visit.id, engineer.id).map_err(|err| {
        log::error!("Failed to assign engineer {} to visit {}: {err}", engineer.id, visit.id);
        err
    })?;

    notify_or_log(
        notifier,
        &Notification::to_email(
            updated.hub_id,
            engineer.email.as_str(),
            "Visit assigned",
            format!(
                "{} on {}",
                updated.equipment,
                updated.scheduled_at.format("%Y-%m-%d %H:%M")
            ),
        ),
    );

    Ok(updated)
}

/// Returns the visit with its history and the statuses it can move to.
pub fn get_visit<R>(
    repo: &R,
    user: &AuthenticatedUser,
    visit_id: i32,
) -> ServiceResult<VisitDetails>
where
    R: VisitReader + ClientReader + EmployeeReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let visit = load_visit(repo, user, visit_id)?;
    ensure_visit_visible(repo, user, &visit)?;

    let history = repo.list_visit_history(visit.id)?;
    let next_states = visit.status.next_states().to_vec();

    Ok(VisitDetails {
        visit,
        history,
        next_states,
    })
}

pub fn list_visits<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: VisitsQuery,
) -> ServiceResult<Paginated<MaintenanceVisit>>
where
    R: VisitReader + EmployeeReader + ?Sized,
{
    ensure_role(user, SERVICE_ACCESS_ROLE)?;

    let hub_id = user_hub(user)?;
    let page = requested_page(query.page)?;
    let mut list_query = VisitListQuery::new(hub_id).paginate(page, DEFAULT_ITEMS_PER_PAGE);

    if let Some(status) = non_blank(query.status) {
        let parsed = status
            .parse::<VisitStatus>()
            .map_err(|_| FormError::InvalidStatus(status.clone()))?;
        list_query = list_query.status(parsed);
    }
    if let Some(client_id) = query.client_id {
        list_query = list_query.client(ClientId::new(client_id)?);
    }
    if let Some(engineer_id) = query.engineer_id {
        list_query = list_query.engineer(EmployeeId::new(engineer_id)?);
    }

    let (total, visits) = if user.has_any_role(VISIT_OVERSEER_ROLES) {
        repo.list_visits(list_query)?
    } else if user.has_role(ENGINEER_ROLE) {
        let email = EmployeeEmail::new(user.email.as_str())?;
        match repo.get_employee_by_email(&email, hub_id)? {
            Some(engineer) => repo.list_visits(list_query.engineer(engineer.id))?,
            None => (0, Vec::new()),
        }
    } else if user.has_role(CUSTOMER_ROLE) {
        let email = ClientEmail::new(user.email.as_str())?;
        repo.list_visits(list_query.client_email(email))?
    } else {
        (0, Vec::new())
    };

    Ok(Paginated::new(visits, page, total, DEFAULT_ITEMS_PER_PAGE))
}
