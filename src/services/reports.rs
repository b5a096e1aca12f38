//! Accounting report over a payment window.

use std::collections::{BTreeMap, HashMap};

use crate::auth::AuthenticatedUser;
use crate::domain::deal::DealStatus;
use crate::domain::payment::{Payment, PaymentMethod};
use crate::domain::types::{DealId, Money};
use crate::dto::reports::{AccountingReport, DealBalance, MethodTotal, ReportQuery};
use crate::repository::{DealReader, PaymentReader};
use crate::services::deals::balance;
use crate::services::{ServiceError, ServiceResult, ensure_any_role, user_hub};
use crate::{ACCOUNTANT_ROLE, SERVICE_ADMIN_ROLE};

/// Collected totals for `[from, to)` and the open balance of every approved
/// deal of the hub.
pub fn accounting_report<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ReportQuery,
) -> ServiceResult<AccountingReport>
where
    R: DealReader + PaymentReader + ?Sized,
{
    ensure_any_role(user, &[SERVICE_ADMIN_ROLE, ACCOUNTANT_ROLE])?;

    if query.from >= query.to {
        return Err(ServiceError::Form(
            "report window must start before it ends".to_string(),
        ));
    }

    let hub_id = user_hub(user)?;

    let payments = repo.list_payments_between(hub_id, query.from, query.to)?;

    let mut per_method: BTreeMap<PaymentMethod, (Money, usize)> = BTreeMap::new();
    let mut total_collected = Money::ZERO;
    for payment in &payments {
        total_collected = total_collected.checked_add(payment.amount)?;
        let entry = per_method.entry(payment.method).or_insert((Money::ZERO, 0));
        entry.0 = entry.0.checked_add(payment.amount)?;
        entry.1 += 1;
    }

    let by_method = per_method
        .into_iter()
        .map(|(method, (total, count))| MethodTotal {
            method,
            total,
            count,
        })
        .collect();

    let open = repo.list_deals(hub_id, Some(DealStatus::Approved))?;
    let deal_ids = open.iter().map(|deal| deal.id).collect::<Vec<DealId>>();

    let mut payments_per_deal: HashMap<DealId, Vec<Payment>> = HashMap::new();
    if !deal_ids.is_empty() {
        for payment in repo.list_payments_for_deals(&deal_ids)? {
            payments_per_deal
                .entry(payment.deal_id)
                .or_default()
                .push(payment);
        }
    }

    let open_deals = open
        .into_iter()
        .map(|deal| {
            let payments = payments_per_deal
                .get(&deal.id)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let (paid, outstanding) = balance(deal.total, payments);
            DealBalance {
                deal,
                paid,
                outstanding,
            }
        })
        .collect();

    Ok(AccountingReport {
        from: query.from,
        to: query.to,
        total_collected,
        payment_count: payments.len(),
        by_method,
        open_deals,
    })
}
