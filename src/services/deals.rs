//! Deal approval chain: the sales manager approves first, then the admin.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::deal::{Deal, DealStatus};
use crate::domain::lifecycle::Lifecycle;
use crate::domain::notification::Notification;
use crate::domain::payment::Payment;
use crate::domain::types::{DealId, EmployeeEmail, Money, SanitizedText};
use crate::dto::deals::{DealDetails, DealsQuery};
use crate::forms::deals::RejectDealForm;
use crate::forms::{FormError, non_blank};
use crate::notifications::{Notifier, notify_or_log};
use crate::repository::{ActivityWriter, DealReader, DealWriter, EmployeeReader, PaymentReader};
use crate::services::{ServiceError, ServiceResult, append_activity, ensure_role, user_hub};
use crate::{ACCOUNTANT_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE, SERVICE_ADMIN_ROLE};

const DEAL_OVERSEER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, SALES_MANAGER_ROLE, ACCOUNTANT_ROLE];

/// Sum of the payments and the part of `total` they leave unpaid.
pub(crate) fn balance(total: Money, payments: &[Payment]) -> (Money, Money) {
    let paid: Money = payments.iter().map(|payment| payment.amount).sum();
    (paid, total.saturating_sub(paid))
}

/// Keeps the deals the caller may see: overseers see the hub, salesmen their
/// own deals.
fn visible_to<R>(repo: &R, user: &AuthenticatedUser, deals: Vec<Deal>) -> ServiceResult<Vec<Deal>>
where
    R: EmployeeReader + ?Sized,
{
    if user.has_any_role(DEAL_OVERSEER_ROLES) {
        return Ok(deals);
    }
    if !user.has_role(SALESMAN_ROLE) {
        return Err(ServiceError::Unauthorized);
    }
    let hub_id = user_hub(user)?;
    let email = EmployeeEmail::new(user.email.as_str())?;
    let Some(me) = repo.get_employee_by_email(&email, hub_id)? else {
        return Ok(Vec::new());
    };
    Ok(deals
        .into_iter()
        .filter(|deal| deal.salesman_id == me.id)
        .collect())
}

pub(crate) fn load_deal<R>(repo: &R, user: &AuthenticatedUser, deal_id: i32) -> ServiceResult<Deal>
where
    R: DealReader + EmployeeReader + ?Sized,
{
    let hub_id = user_hub(user)?;
    let deal_id = DealId::new(deal_id)?;
    let deal = repo
        .get_deal_by_id(deal_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    visible_to(repo, user, vec![deal])?
        .pop()
        .ok_or(ServiceError::Unauthorized)
}

pub(crate) fn notify_salesman<R, N>(repo: &R, notifier: &N, deal: &Deal, title: &str)
where
    R: EmployeeReader + ?Sized,
    N: Notifier + ?Sized,
{
    match repo.get_employee_by_id(deal.salesman_id, deal.hub_id) {
        Ok(Some(salesman)) => notify_or_log(
            notifier,
            &Notification::to_email(
                deal.hub_id,
                salesman.email.as_str(),
                title,
                format!("{} ({})", deal.title, deal.total),
            ),
        ),
        Ok(None) => log::warn!("Salesman of deal {} no longer exists", deal.id),
        Err(err) => log::error!("Failed to load salesman of deal {}: {err}", deal.id),
    }
}

/// Returns the deal with its payments and outstanding balance.
pub fn get_deal<R>(repo: &R, user: &AuthenticatedUser, deal_id: i32) -> ServiceResult<DealDetails>
where
    R: DealReader + EmployeeReader + PaymentReader + ?Sized,
{
    let deal = load_deal(repo, user, deal_id)?;
    let payments = repo.list_payments(deal.id)?;
    let (paid, outstanding) = balance(deal.total, &payments);

    Ok(DealDetails {
        deal,
        payments,
        paid,
        outstanding,
    })
}

pub fn list_deals<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: DealsQuery,
) -> ServiceResult<Vec<Deal>>
where
    R: DealReader + EmployeeReader + ?Sized,
{
    if !user.has_any_role(DEAL_OVERSEER_ROLES) && !user.has_role(SALESMAN_ROLE) {
        return Err(ServiceError::Unauthorized);
    }

    let hub_id = user_hub(user)?;
    let status = non_blank(query.status)
        .map(|raw| {
            raw.parse::<DealStatus>()
                .map_err(|_| FormError::InvalidStatus(raw.clone()))
        })
        .transpose()?;

    let deals = repo.list_deals(hub_id, status)?;
    visible_to(repo, user, deals)
}

/// Approves the current step. Only the step's approver may act; approving
/// an already approved deal returns it unchanged.
pub fn approve_deal<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    deal_id: i32,
) -> ServiceResult<Deal>
where
    R: DealReader + DealWriter + EmployeeReader + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let deal = load_deal(repo, user, deal_id)?;

    let (Some(next), Some(approver)) = (deal.status.approved(), deal.status.approver_role())
    else {
        deal.status.validate_transition(DealStatus::Approved)?;
        return Ok(deal);
    };

    ensure_role(user, approver)?;
    deal.status.validate_transition(next)?;

    let updated = repo.update_deal_status(deal.id, next, None).map_err(|err| {
        log::error!("Failed to approve deal {}: {err}", deal.id);
        err
    })?;

    log::info!("Deal {} moved {} -> {next} by {}", updated.id, deal.status, user.email);

    append_activity(
        repo,
        user,
        updated.client_id,
        ActivityKind::Deal,
        json!({
            "deal_id": updated.id.get(),
            "from": deal.status.as_str(),
            "to": next.as_str(),
        }),
    );

    match next.approver_role() {
        Some(role) => notify_or_log(
            notifier,
            &Notification::to_role(
                updated.hub_id,
                role,
                "Deal awaiting approval",
                format!("{} for {}", updated.title, updated.total),
            ),
        ),
        None => {
            notify_salesman(repo, notifier, &updated, "Deal approved");
            notify_or_log(
                notifier,
                &Notification::to_role(
                    updated.hub_id,
                    ACCOUNTANT_ROLE,
                    "Deal ready for invoicing",
                    format!("{} for {}", updated.title, updated.total),
                ),
            );
        }
    }

    Ok(updated)
}

/// Rejects the deal at either pending step, recording the reason.
pub fn reject_deal<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    deal_id: i32,
    form: RejectDealForm,
) -> ServiceResult<Deal>
where
    R: DealReader + DealWriter + EmployeeReader + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    let reason = SanitizedText::try_from(form)?;
    let deal = load_deal(repo, user, deal_id)?;

    let Some(approver) = deal.status.approver_role() else {
        deal.status.validate_transition(DealStatus::Rejected)?;
        return Ok(deal);
    };

    ensure_role(user, approver)?;
    deal.status.validate_transition(DealStatus::Rejected)?;

    let updated = repo
        .update_deal_status(deal.id, DealStatus::Rejected, Some(reason.clone()))
        .map_err(|err| {
            log::error!("Failed to reject deal {}: {err}", deal.id);
            err
        })?;

    log::info!("Deal {} rejected by {}", updated.id, user.email);

    append_activity(
        repo,
        user,
        updated.client_id,
        ActivityKind::Deal,
        json!({
            "deal_id": updated.id.get(),
            "from": deal.status.as_str(),
            "to": DealStatus::Rejected.as_str(),
            "reason": reason.as_str(),
        }),
    );

    notify_salesman(repo, notifier, &updated, "Deal rejected");

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::Recipient;
    use crate::domain::payment::PaymentMethod;
    use crate::notifications::RecordingNotifier;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{deal, employee, expect_activities, payment, user};

    fn expect_status_update(repo: &mut MockRepository) {
        repo.expect_update_deal_status()
            .returning(|id, status, reason| {
                let mut updated = deal(id.get(), status, 10_000);
                updated.rejection_reason = reason;
                Ok(updated)
            });
    }

    #[test]
    fn sales_manager_approves_the_first_step() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::PendingManagerApproval, 10_000))));
        expect_status_update(&mut repo);
        expect_activities(&mut repo);

        let notifier = RecordingNotifier::new();
        let manager = user(&[SALES_MANAGER_ROLE]);
        let approved = approve_deal(&repo, &notifier, &manager, 2).unwrap();

        assert_eq!(approved.status, DealStatus::PendingAdminApproval);
        assert_eq!(
            notifier.sent()[0].recipient,
            Recipient::Role(SERVICE_ADMIN_ROLE.to_string())
        );
    }

    #[test]
    fn admin_cannot_skip_the_manager_step() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::PendingManagerApproval, 10_000))));
        repo.expect_update_deal_status().times(0);

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        assert!(matches!(
            approve_deal(&repo, &notifier, &admin, 2),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn admin_gives_final_approval() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::PendingAdminApproval, 10_000))));
        expect_status_update(&mut repo);
        expect_activities(&mut repo);
        repo.expect_get_employee_by_id()
            .returning(|id, _| Ok(Some(employee(id.get(), "sales@example.com"))));

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let approved = approve_deal(&repo, &notifier, &admin, 2).unwrap();

        assert_eq!(approved.status, DealStatus::Approved);
        let recipients: Vec<_> = notifier.sent().into_iter().map(|n| n.recipient).collect();
        assert_eq!(
            recipients,
            vec![
                Recipient::Email("sales@example.com".to_string()),
                Recipient::Role(ACCOUNTANT_ROLE.to_string()),
            ]
        );
    }

    #[test]
    fn closed_deals_cannot_be_approved() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::Closed, 10_000))));

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        assert!(matches!(
            approve_deal(&repo, &notifier, &admin, 2),
            Err(ServiceError::InvalidTransition(_))
        ));
    }

    #[test]
    fn rejection_keeps_the_reason() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::PendingAdminApproval, 10_000))));
        expect_status_update(&mut repo);
        expect_activities(&mut repo);
        repo.expect_get_employee_by_id().returning(|_, _| Ok(None));

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let form = RejectDealForm {
            reason: "Discount <b>too</b> deep".to_string(),
        };
        let rejected = reject_deal(&repo, &notifier, &admin, 2, form).unwrap();

        assert_eq!(rejected.status, DealStatus::Rejected);
        assert_eq!(
            rejected.rejection_reason.as_ref().map(SanitizedText::as_str),
            Some("Discount <b>too</b> deep")
        );
    }

    #[test]
    fn accountants_cannot_reject() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::PendingManagerApproval, 10_000))));
        repo.expect_update_deal_status().times(0);

        let notifier = RecordingNotifier::new();
        let accountant = user(&[ACCOUNTANT_ROLE]);
        let form = RejectDealForm {
            reason: "No budget".to_string(),
        };
        assert!(matches!(
            reject_deal(&repo, &notifier, &accountant, 2, form),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn details_report_the_outstanding_balance() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::Approved, 10_000))));
        repo.expect_list_payments().returning(|deal_id| {
            Ok(vec![
                payment(1, deal_id.get(), 2_500, PaymentMethod::Cash),
                payment(2, deal_id.get(), 1_500, PaymentMethod::BankTransfer),
            ])
        });

        let accountant = user(&[ACCOUNTANT_ROLE]);
        let details = get_deal(&repo, &accountant, 2).unwrap();

        assert_eq!(details.paid.cents(), 4_000);
        assert_eq!(details.outstanding.cents(), 6_000);
    }
}
