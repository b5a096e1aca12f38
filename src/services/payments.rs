//! Payments against approved deals.

use chrono::Utc;
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::deal::DealStatus;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::notification::Notification;
use crate::domain::payment::{NewPayment, Payment};
use crate::forms::payments::{PaymentForm, PaymentPayload};
use crate::gateway::{Charge, PaymentGateway};
use crate::notifications::{Notifier, notify_or_log};
use crate::repository::{
    ActivityWriter, DealReader, EmployeeReader, EmployeeWriter, PaymentReader, PaymentWriter,
};
use crate::services::deals::{balance, load_deal, notify_salesman};
use crate::services::{
    ServiceError, ServiceResult, append_activity, current_employee, ensure_any_role,
};
use crate::{ACCOUNTANT_ROLE, SALES_MANAGER_ROLE, SERVICE_ADMIN_ROLE};

const CASHIER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, ACCOUNTANT_ROLE];

/// Charges the payment through the gateway and stores it. A payment that
/// covers the outstanding balance closes the deal.
pub fn record_payment<R, G, N>(
    repo: &R,
    gateway: &G,
    notifier: &N,
    user: &AuthenticatedUser,
    deal_id: i32,
    form: PaymentForm,
) -> ServiceResult<Payment>
where
    R: DealReader
        + EmployeeReader
        + EmployeeWriter
        + PaymentReader
        + PaymentWriter
        + ActivityWriter
        + ?Sized,
    G: PaymentGateway + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, CASHIER_ROLES)?;

    let payload = PaymentPayload::try_from(form)?;
    let deal = load_deal(repo, user, deal_id)?;

    if deal.status != DealStatus::Approved {
        return Err(ServiceError::BusinessRule(format!(
            "deal {} is {}, payments are accepted for approved deals only",
            deal.id, deal.status
        )));
    }

    let payments = repo.list_payments(deal.id)?;
    let (_, outstanding) = balance(deal.total, &payments);

    if payload.amount > outstanding {
        return Err(ServiceError::BusinessRule(format!(
            "payment of {} exceeds the outstanding balance of {outstanding}",
            payload.amount
        )));
    }

    let settles_deal = payload.amount == outstanding;
    if settles_deal {
        deal.status.validate_transition(DealStatus::Closed)?;
    }

    let reference = gateway
        .charge(&Charge {
            deal_id: deal.id,
            amount: payload.amount,
            method: payload.method,
            reference: payload.reference.as_ref(),
        })
        .map_err(|err| {
            log::warn!("Gateway refused payment for deal {}: {err}", deal.id);
            ServiceError::from(err)
        })?;

    let recorder = current_employee(repo, user)?;
    let new_payment = NewPayment {
        deal_id: deal.id,
        amount: payload.amount,
        method: payload.method,
        reference,
        paid_at: payload.paid_at.unwrap_or_else(|| Utc::now().naive_utc()),
        recorded_by: recorder.id,
    };

    let payment = repo
        .record_payment(&new_payment, settles_deal)
        .map_err(|err| {
            log::error!("Failed to record payment for deal {}: {err}", deal.id);
            err
        })?;

    log::info!(
        "Payment {} of {} recorded for deal {}",
        payment.id,
        payment.amount,
        deal.id
    );

    append_activity(
        repo,
        user,
        deal.client_id,
        ActivityKind::Payment,
        json!({
            "deal_id": deal.id.get(),
            "payment_id": payment.id.get(),
            "amount_cents": payment.amount.cents(),
            "method": payment.method.as_str(),
            "settled": settles_deal,
        }),
    );

    if settles_deal {
        notify_salesman(repo, notifier, &deal, "Deal paid in full");
        notify_or_log(
            notifier,
            &Notification::to_role(
                deal.hub_id,
                SALES_MANAGER_ROLE,
                "Deal closed",
                format!("{} ({})", deal.title, deal.total),
            ),
        );
    }

    Ok(payment)
}

pub fn list_payments<R>(
    repo: &R,
    user: &AuthenticatedUser,
    deal_id: i32,
) -> ServiceResult<Vec<Payment>>
where
    R: DealReader + EmployeeReader + PaymentReader + ?Sized,
{
    let deal = load_deal(repo, user, deal_id)?;
    Ok(repo.list_payments(deal.id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;
    use crate::gateway::OfflineGateway;
    use crate::notifications::RecordingNotifier;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        deal, employee, expect_activities, expect_employee_upsert, payment, user,
    };

    fn form(cents: i64, method: &str) -> PaymentForm {
        PaymentForm {
            amount_cents: cents,
            method: method.to_string(),
            reference: None,
            paid_at: None,
        }
    }

    fn approved_deal_with_paid(repo: &mut MockRepository, paid: i64) {
        repo.expect_get_deal_by_id()
            .returning(|id, _| Ok(Some(deal(id.get(), DealStatus::Approved, 10_000))));
        repo.expect_list_payments().returning(move |deal_id| {
            Ok(vec![payment(1, deal_id.get(), paid, PaymentMethod::Cash)])
        });
    }

    #[test]
    fn partial_payment_keeps_the_deal_open() {
        let mut repo = MockRepository::new();
        approved_deal_with_paid(&mut repo, 4_000);
        expect_employee_upsert(&mut repo, 3);
        repo.expect_record_payment()
            .withf(|new_payment, settles| new_payment.amount.cents() == 1_000 && !settles)
            .times(1)
            .returning(|new_payment, _| {
                Ok(payment(2, new_payment.deal_id.get(), 1_000, new_payment.method))
            });
        expect_activities(&mut repo);

        let notifier = RecordingNotifier::new();
        let accountant = user(&[ACCOUNTANT_ROLE]);
        record_payment(&repo, &OfflineGateway, &notifier, &accountant, 2, form(1_000, "Cash"))
            .unwrap();

        assert!(notifier.sent().is_empty());
    }

    #[test]
    fn settling_payment_closes_the_deal() {
        let mut repo = MockRepository::new();
        approved_deal_with_paid(&mut repo, 4_000);
        expect_employee_upsert(&mut repo, 3);
        repo.expect_record_payment()
            .withf(|new_payment, settles| new_payment.amount.cents() == 6_000 && *settles)
            .times(1)
            .returning(|new_payment, _| {
                Ok(payment(2, new_payment.deal_id.get(), 6_000, new_payment.method))
            });
        expect_activities(&mut repo);
        repo.expect_get_employee_by_id()
            .returning(|id, _| Ok(Some(employee(id.get(), "sales@example.com"))));

        let notifier = RecordingNotifier::new();
        let accountant = user(&[ACCOUNTANT_ROLE]);
        record_payment(
            &repo,
            &OfflineGateway,
            &notifier,
            &accountant,
            2,
            form(6_000, "BankTransfer"),
        )
        .unwrap();

        assert_eq!(notifier.sent().len(), 2);
    }

    #[test]
    fn overpayment_is_rejected() {
        let mut repo = MockRepository::new();
        approved_deal_with_paid(&mut repo, 4_000);
        repo.expect_record_payment().times(0);

        let notifier = RecordingNotifier::new();
        let accountant = user(&[ACCOUNTANT_ROLE]);
        assert!(matches!(
            record_payment(&repo, &OfflineGateway, &notifier, &accountant, 2, form(6_001, "Cash")),
            Err(ServiceError::BusinessRule(_))
        ));
    }

    #[test]
    fn card_gateways_are_unsupported() {
        let mut repo = MockRepository::new();
        approved_deal_with_paid(&mut repo, 0);
        repo.expect_record_payment().times(0);

        let notifier = RecordingNotifier::new();
        let accountant = user(&[ACCOUNTANT_ROLE]);
        assert!(matches!(
            record_payment(&repo, &OfflineGateway, &notifier, &accountant, 2, form(500, "Stripe")),
            Err(ServiceError::Unsupported(_))
        ));
    }

    #[test]
    fn unapproved_deals_take_no_payments() {
        let mut repo = MockRepository::new();
        repo.expect_get_deal_by_id().returning(|id, _| {
            Ok(Some(deal(id.get(), DealStatus::PendingAdminApproval, 10_000)))
        });
        repo.expect_record_payment().times(0);

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        assert!(matches!(
            record_payment(&repo, &OfflineGateway, &notifier, &admin, 2, form(500, "Cash")),
            Err(ServiceError::BusinessRule(_))
        ));
    }

    #[test]
    fn salesmen_cannot_record_payments() {
        let repo = MockRepository::new();
        let notifier = RecordingNotifier::new();
        let salesman = user(&[crate::SALESMAN_ROLE]);
        assert!(matches!(
            record_payment(&repo, &OfflineGateway, &notifier, &salesman, 2, form(500, "Cash")),
            Err(ServiceError::Unauthorized)
        ));
    }
}
