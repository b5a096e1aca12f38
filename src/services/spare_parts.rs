//! Spare-part requests raised during visits and routed to the warehouse.

use crate::auth::AuthenticatedUser;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::notification::Notification;
use crate::domain::spare_part::{NewSparePartRequest, SparePartRequest, SparePartStatus};
use crate::domain::types::{HubId, SparePartRequestId};
use crate::domain::visit::VisitStatus;
use crate::dto::visits::SparePartsQuery;
use crate::forms::spare_parts::{
    SparePartDecisionForm, SparePartRequestForm, SparePartRequestPayload,
};
use crate::forms::{FormError, non_blank};
use crate::notifications::{Notifier, notify_or_log};
use crate::repository::{
    EmployeeReader, EmployeeWriter, SparePartReader, SparePartWriter, VisitReader,
};
use crate::services::visits::{VISIT_WORKER_ROLES, ensure_can_move, load_visit};
use crate::services::{ServiceError, ServiceResult, current_employee, ensure_any_role, user_hub};
use crate::{MAINTENANCE_MANAGER_ROLE, SERVICE_ADMIN_ROLE, WAREHOUSE_ROLE};

const DECIDER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, MAINTENANCE_MANAGER_ROLE];

const FULFILLER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, WAREHOUSE_ROLE];

const VIEWER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, MAINTENANCE_MANAGER_ROLE, WAREHOUSE_ROLE];

fn load_request<R>(
    repo: &R,
    hub_id: HubId,
    request_id: i32,
) -> ServiceResult<SparePartRequest>
where
    R: SparePartReader + ?Sized,
{
    let request_id = SparePartRequestId::new(request_id)?;
    repo.get_spare_part_request(request_id, hub_id)?
        .ok_or(ServiceError::NotFound)
}

fn notify_requester<R, N>(
    repo: &R,
    notifier: &N,
    hub_id: HubId,
    request: &SparePartRequest,
    title: &str,
) where
    R: EmployeeReader + ?Sized,
    N: Notifier + ?Sized,
{
    match repo.get_employee_by_id(request.requested_by, hub_id) {
        Ok(Some(engineer)) => notify_or_log(
            notifier,
            &Notification::to_email(
                hub_id,
                engineer.email.as_str(),
                title,
                format!("{} x {}", request.quantity.get(), request.part_name),
            ),
        ),
        Ok(None) => log::warn!("Requester of spare part request {} is gone", request.id),
        Err(err) => log::error!("Failed to load requester of {}: {err}", request.id),
    }
}

/// Files a part request for a visit that is waiting for parts.
pub fn request_spare_part<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    visit_id: i32,
    form: SparePartRequestForm,
) -> ServiceResult<SparePartRequest>
where
    R: VisitReader + EmployeeWriter + SparePartWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, VISIT_WORKER_ROLES)?;

    let payload = SparePartRequestPayload::try_from(form)?;
    let visit = load_visit(repo, user, visit_id)?;
    let actor = current_employee(repo, user)?;

    ensure_can_move(user, &actor, &visit)?;

    if visit.status != VisitStatus::NeedsSpareParts {
        return Err(ServiceError::BusinessRule(format!(
            "visit {} is {}, parts can only be requested while it needs spare parts",
            visit.id, visit.status
        )));
    }

    let request = repo
        .create_spare_part_request(&NewSparePartRequest {
            visit_id: visit.id,
            part_name: payload.part_name,
            quantity: payload.quantity,
            requested_by: actor.id,
        })
        .map_err(|err| {
            log::error!("Failed to create spare part request for visit {}: {err}", visit.id);
            err
        })?;

    log::info!("Spare part request {} filed for visit {}", request.id, visit.id);

    notify_or_log(
        notifier,
        &Notification::to_role(
            visit.hub_id,
            MAINTENANCE_MANAGER_ROLE,
            "Spare part requested",
            format!(
                "{} x {} for visit {} ({})",
                request.quantity.get(),
                request.part_name,
                visit.id,
                visit.equipment
            ),
        ),
    );

    Ok(request)
}

/// Approves or rejects a pending request. Approved requests are routed to
/// the warehouse.
pub fn decide_spare_part<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    request_id: i32,
    form: SparePartDecisionForm,
) -> ServiceResult<SparePartRequest>
where
    R: SparePartReader + SparePartWriter + EmployeeReader + EmployeeWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, DECIDER_ROLES)?;

    let hub_id = user_hub(user)?;
    let request = load_request(repo, hub_id, request_id)?;

    let target = if form.approve {
        SparePartStatus::Approved
    } else {
        SparePartStatus::Rejected
    };
    request.status.validate_transition(target)?;
    if request.status == target {
        return Ok(request);
    }

    let actor = current_employee(repo, user)?;
    let decided = repo
        .update_spare_part_status(request.id, target, Some(actor.id))
        .map_err(|err| {
            log::error!("Failed to decide spare part request {}: {err}", request.id);
            err
        })?;

    log::info!("Spare part request {} {target} by {}", decided.id, user.email);

    if target == SparePartStatus::Approved {
        notify_or_log(
            notifier,
            &Notification::to_role(
                hub_id,
                WAREHOUSE_ROLE,
                "Spare part to ship",
                format!(
                    "{} x {} for visit {}",
                    decided.quantity.get(),
                    decided.part_name,
                    decided.visit_id
                ),
            ),
        );
    }
    notify_requester(
        repo,
        notifier,
        hub_id,
        &decided,
        &format!("Spare part request {target}"),
    );

    Ok(decided)
}

/// Marks an approved request as shipped and tells the engineer.
pub fn fulfil_spare_part<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    request_id: i32,
) -> ServiceResult<SparePartRequest>
where
    R: SparePartReader + SparePartWriter + EmployeeReader + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, FULFILLER_ROLES)?;

    let hub_id = user_hub(user)?;
    let request = load_request(repo, hub_id, request_id)?;

    request
        .status
        .validate_transition(SparePartStatus::Fulfilled)?;
    if request.status == SparePartStatus::Fulfilled {
        return Ok(request);
    }

    let fulfilled = repo
        .update_spare_part_status(request.id, SparePartStatus::Fulfilled, None)
        .map_err(|err| {
            log::error!("Failed to fulfil spare part request {}: {err}", request.id);
            err
        })?;

    notify_requester(repo, notifier, hub_id, &fulfilled, "Spare part shipped");

    Ok(fulfilled)
}

pub fn list_spare_parts<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: SparePartsQuery,
) -> ServiceResult<Vec<SparePartRequest>>
where
    R: SparePartReader + ?Sized,
{
    ensure_any_role(user, VIEWER_ROLES)?;

    let hub_id = user_hub(user)?;
    let status = non_blank(query.status)
        .map(|raw| {
            raw.parse::<SparePartStatus>()
                .map_err(|_| FormError::InvalidStatus(raw.clone()))
        })
        .transpose()?;

    Ok(repo.list_spare_part_requests(hub_id, status)?)
}
