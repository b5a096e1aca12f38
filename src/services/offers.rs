//! Sales offers and their acceptance into deals.

use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::ActivityKind;
use crate::domain::deal::NewDeal;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::notification::Notification;
use crate::domain::offer::{NewOffer, Offer, OfferStatus};
use crate::domain::types::{ClientId, DealTitle, EmployeeEmail, OfferId};
use crate::dto::offers::{AcceptedOffer, OffersQuery};
use crate::forms::offers::{CreateOfferForm, CreateOfferPayload};
use crate::notifications::{Notifier, notify_or_log};
use crate::repository::{
    ActivityWriter, ClientReader, DealReader, EmployeeReader, EmployeeWriter, OfferReader,
    OfferWriter,
};
use crate::services::clients::load_accessible_client;
use crate::services::{
    ServiceError, ServiceResult, append_activity, current_employee, ensure_any_role, user_hub,
};
use crate::{ACCOUNTANT_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE, SERVICE_ADMIN_ROLE};

pub(crate) const SALES_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, SALES_MANAGER_ROLE, SALESMAN_ROLE];

const OFFER_OVERSEER_ROLES: &[&str] = &[SERVICE_ADMIN_ROLE, SALES_MANAGER_ROLE, ACCOUNTANT_ROLE];

/// Salesmen only work with their own offers.
fn visible_to<R>(repo: &R, user: &AuthenticatedUser, offers: Vec<Offer>) -> ServiceResult<Vec<Offer>>
where
    R: EmployeeReader + ?Sized,
{
    if user.has_any_role(OFFER_OVERSEER_ROLES) {
        return Ok(offers);
    }
    if !user.has_role(SALESMAN_ROLE) {
        return Err(ServiceError::Unauthorized);
    }
    let hub_id = user_hub(user)?;
    let email = EmployeeEmail::new(user.email.as_str())?;
    let Some(me) = repo.get_employee_by_email(&email, hub_id)? else {
        return Ok(Vec::new());
    };
    Ok(offers
        .into_iter()
        .filter(|offer| offer.salesman_id == me.id)
        .collect())
}

fn load_offer<R>(repo: &R, user: &AuthenticatedUser, offer_id: i32) -> ServiceResult<Offer>
where
    R: OfferReader + EmployeeReader + ?Sized,
{
    let hub_id = user_hub(user)?;
    let offer_id = OfferId::new(offer_id)?;
    let offer = repo
        .get_offer_by_id(offer_id, hub_id)?
        .ok_or(ServiceError::NotFound)?;

    visible_to(repo, user, vec![offer])?
        .pop()
        .ok_or(ServiceError::Unauthorized)
}

/// Validates the move, persists it and records it on the client timeline.
fn move_offer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    offer: Offer,
    to: OfferStatus,
) -> ServiceResult<Offer>
where
    R: OfferWriter + ActivityWriter + ?Sized,
{
    offer.status.validate_transition(to)?;
    if offer.status == to {
        return Ok(offer);
    }

    let updated = repo.update_offer_status(offer.id, to).map_err(|err| {
        log::error!("Failed to move offer {} to {to}: {err}", offer.id);
        err
    })?;

    append_activity(
        repo,
        user,
        updated.client_id,
        ActivityKind::Offer,
        json!({
            "offer_id": updated.id.get(),
            "from": offer.status.as_str(),
            "to": to.as_str(),
        }),
    );

    Ok(updated)
}

/// Creates a draft offer for a client; the total is the sum of its lines.
pub fn create_offer<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateOfferForm,
) -> ServiceResult<Offer>
where
    R: ClientReader + EmployeeWriter + OfferWriter + ActivityWriter + ?Sized,
{
    ensure_any_role(user, SALES_ROLES)?;

    let payload = CreateOfferPayload::try_from(form)?;
    let client = load_accessible_client(repo, user, payload.client_id.get())?;
    let salesman = current_employee(repo, user)?;

    let new_offer = NewOffer::try_new(
        client.hub_id,
        client.id,
        salesman.id,
        payload.notes,
        payload.items,
    )?;

    let offer = repo.create_offer(&new_offer).map_err(|err| {
        log::error!("Failed to create an offer for client {}: {err}", client.id);
        err
    })?;

    log::info!("Offer {} for {} created by {}", offer.id, offer.total, user.email);

    append_activity(
        repo,
        user,
        offer.client_id,
        ActivityKind::Offer,
        json!({
            "offer_id": offer.id.get(),
            "event": "created",
            "total_cents": offer.total.cents(),
        }),
    );

    Ok(offer)
}

pub fn get_offer<R>(repo: &R, user: &AuthenticatedUser, offer_id: i32) -> ServiceResult<Offer>
where
    R: OfferReader + EmployeeReader + ?Sized,
{
    load_offer(repo, user, offer_id)
}

pub fn list_offers<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: OffersQuery,
) -> ServiceResult<Vec<Offer>>
where
    R: OfferReader + EmployeeReader + ?Sized,
{
    let hub_id = user_hub(user)?;
    let client_id = query.client_id.map(ClientId::new).transpose()?;

    if !user.has_any_role(OFFER_OVERSEER_ROLES) && !user.has_role(SALESMAN_ROLE) {
        return Err(ServiceError::Unauthorized);
    }

    let offers = repo.list_offers(hub_id, client_id)?;
    visible_to(repo, user, offers)
}

/// Marks the draft as sent and e-mails the client contact when known.
pub fn send_offer<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    offer_id: i32,
) -> ServiceResult<Offer>
where
    R: OfferReader + OfferWriter + EmployeeReader + ClientReader + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, SALES_ROLES)?;

    let offer = load_offer(repo, user, offer_id)?;
    let was_sent = offer.status == OfferStatus::Sent;
    let sent = move_offer(repo, user, offer, OfferStatus::Sent)?;

    if !was_sent
        && let Some(client) = repo.get_client_by_id(sent.client_id, sent.hub_id)?
        && let Some(email) = &client.email
    {
        notify_or_log(
            notifier,
            &Notification::to_email(
                sent.hub_id,
                email.as_str(),
                format!("Offer #{}", sent.id),
                format!("Total {}", sent.total),
            ),
        );
    }

    Ok(sent)
}

pub fn reject_offer<R>(repo: &R, user: &AuthenticatedUser, offer_id: i32) -> ServiceResult<Offer>
where
    R: OfferReader + OfferWriter + EmployeeReader + ActivityWriter + ?Sized,
{
    ensure_any_role(user, SALES_ROLES)?;

    let offer = load_offer(repo, user, offer_id)?;
    move_offer(repo, user, offer, OfferStatus::Rejected)
}

/// Accepts a sent offer and opens a deal for its total, waiting for the
/// sales manager's approval. An offer yields at most one deal.
pub fn accept_offer<R, N>(
    repo: &R,
    notifier: &N,
    user: &AuthenticatedUser,
    offer_id: i32,
) -> ServiceResult<AcceptedOffer>
where
    R: OfferReader + OfferWriter + DealReader + EmployeeReader + ActivityWriter + ?Sized,
    N: Notifier + ?Sized,
{
    ensure_any_role(user, SALES_ROLES)?;

    let offer = load_offer(repo, user, offer_id)?;

    if repo.get_deal_by_offer(offer.id)?.is_some() {
        return Err(ServiceError::Conflict(format!(
            "offer {} already has a deal",
            offer.id
        )));
    }

    offer.status.validate_transition(OfferStatus::Accepted)?;
    if offer.status == OfferStatus::Accepted {
        return Err(ServiceError::BusinessRule(format!(
            "offer {} is accepted but has no deal",
            offer.id
        )));
    }

    let new_deal = NewDeal {
        hub_id: offer.hub_id,
        client_id: offer.client_id,
        offer_id: Some(offer.id),
        salesman_id: offer.salesman_id,
        title: DealTitle::new(format!("Offer #{}", offer.id))?,
        total: offer.total,
    };

    let (offer, deal) = repo.accept_offer(offer.id, &new_deal).map_err(|err| {
        log::error!("Failed to accept offer {}: {err}", offer.id);
        err
    })?;

    log::info!("Offer {} accepted, deal {} opened", offer.id, deal.id);

    append_activity(
        repo,
        user,
        deal.client_id,
        ActivityKind::Deal,
        json!({
            "deal_id": deal.id.get(),
            "offer_id": offer.id.get(),
            "event": "opened",
            "total_cents": deal.total.cents(),
        }),
    );

    notify_or_log(
        notifier,
        &Notification::to_role(
            deal.hub_id,
            SALES_MANAGER_ROLE,
            "Deal awaiting approval",
            format!("{} for {}", deal.title, deal.total),
        ),
    );

    Ok(AcceptedOffer { offer, deal })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::deal::DealStatus;
    use crate::domain::notification::Recipient;
    use crate::forms::offers::OfferItemForm;
    use crate::notifications::RecordingNotifier;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        client, deal, employee, expect_activities, expect_employee_upsert, offer, user,
    };

    fn offer_form() -> CreateOfferForm {
        CreateOfferForm {
            client_id: 3,
            notes: None,
            items: vec![
                OfferItemForm {
                    description: "Defibrillator".to_string(),
                    quantity: 2,
                    unit_price_cents: 250_000,
                },
                OfferItemForm {
                    description: "Installation".to_string(),
                    quantity: 1,
                    unit_price_cents: 15_000,
                },
            ],
        }
    }

    #[test]
    fn offer_total_is_computed_from_lines() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id()
            .returning(|id, _| Ok(Some(client(id.get()))));
        expect_employee_upsert(&mut repo, 7);
        repo.expect_create_offer()
            .withf(|new_offer| new_offer.total.cents() == 515_000 && new_offer.items.len() == 2)
            .times(1)
            .returning(|new_offer| Ok(offer(1, OfferStatus::Draft, new_offer.total.cents())));
        expect_activities(&mut repo);

        let manager = user(&[SALES_MANAGER_ROLE]);
        let created = create_offer(&repo, &manager, offer_form()).unwrap();
        assert_eq!(created.status, OfferStatus::Draft);
    }

    #[test]
    fn draft_cannot_be_accepted() {
        let mut repo = MockRepository::new();
        repo.expect_get_offer_by_id()
            .returning(|id, _| Ok(Some(offer(id.get(), OfferStatus::Draft, 1_000))));
        repo.expect_get_deal_by_offer().returning(|_| Ok(None));
        repo.expect_accept_offer().times(0);

        let notifier = RecordingNotifier::new();
        let manager = user(&[SALES_MANAGER_ROLE]);
        assert!(matches!(
            accept_offer(&repo, &notifier, &manager, 1),
            Err(ServiceError::InvalidTransition(_))
        ));
    }

    #[test]
    fn second_deal_for_an_offer_is_a_conflict() {
        let mut repo = MockRepository::new();
        repo.expect_get_offer_by_id()
            .returning(|id, _| Ok(Some(offer(id.get(), OfferStatus::Accepted, 1_000))));
        repo.expect_get_deal_by_offer()
            .returning(|_| Ok(Some(deal(2, DealStatus::PendingManagerApproval, 1_000))));
        repo.expect_accept_offer().times(0);

        let notifier = RecordingNotifier::new();
        let manager = user(&[SALES_MANAGER_ROLE]);
        assert!(matches!(
            accept_offer(&repo, &notifier, &manager, 1),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn acceptance_opens_a_deal_for_the_offer_total() {
        let mut repo = MockRepository::new();
        repo.expect_get_offer_by_id()
            .returning(|id, _| Ok(Some(offer(id.get(), OfferStatus::Sent, 42_000))));
        repo.expect_get_deal_by_offer().returning(|_| Ok(None));
        repo.expect_accept_offer()
            .withf(|_, new_deal| {
                new_deal.total.cents() == 42_000 && new_deal.offer_id.map(OfferId::get) == Some(1)
            })
            .times(1)
            .returning(|id, new_deal| {
                let mut opened = deal(2, DealStatus::PendingManagerApproval, new_deal.total.cents());
                opened.offer_id = Some(id);
                Ok((offer(id.get(), OfferStatus::Accepted, 42_000), opened))
            });
        expect_activities(&mut repo);

        let notifier = RecordingNotifier::new();
        let manager = user(&[SALES_MANAGER_ROLE]);
        let accepted = accept_offer(&repo, &notifier, &manager, 1).unwrap();

        assert_eq!(accepted.offer.status, OfferStatus::Accepted);
        assert_eq!(accepted.deal.status, DealStatus::PendingManagerApproval);
        assert_eq!(
            notifier.sent()[0].recipient,
            Recipient::Role(SALES_MANAGER_ROLE.to_string())
        );
    }

    #[test]
    fn salesmen_do_not_see_colleagues_offers() {
        let mut repo = MockRepository::new();
        repo.expect_list_offers()
            .returning(|_, _| Ok(vec![offer(1, OfferStatus::Draft, 100), offer(2, OfferStatus::Sent, 100)]));
        repo.expect_get_employee_by_email()
            .returning(|email, _| Ok(Some(employee(8, email.as_str()))));

        let salesman = user(&[SALESMAN_ROLE]);
        let offers = list_offers(&repo, &salesman, OffersQuery::default()).unwrap();
        assert!(offers.is_empty());
    }

    #[test]
    fn sending_notifies_the_client_contact() {
        let mut repo = MockRepository::new();
        repo.expect_get_offer_by_id()
            .returning(|id, _| Ok(Some(offer(id.get(), OfferStatus::Draft, 100))));
        repo.expect_update_offer_status()
            .returning(|id, status| Ok(offer(id.get(), status, 100)));
        repo.expect_get_client_by_id().returning(|id, _| {
            let mut contact = client(id.get());
            contact.email = Some(crate::domain::types::ClientEmail::new("desk@clinic.org").unwrap());
            Ok(Some(contact))
        });
        expect_activities(&mut repo);

        let notifier = RecordingNotifier::new();
        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let sent = send_offer(&repo, &notifier, &admin, 1).unwrap();

        assert_eq!(sent.status, OfferStatus::Sent);
        assert_eq!(
            notifier.sent()[0].recipient,
            Recipient::Email("desk@clinic.org".to_string())
        );
    }

    #[test]
    fn rejected_offers_are_final() {
        let mut repo = MockRepository::new();
        repo.expect_get_offer_by_id()
            .returning(|id, _| Ok(Some(offer(id.get(), OfferStatus::Rejected, 100))));
        repo.expect_update_offer_status().times(0);

        let admin = user(&[SERVICE_ADMIN_ROLE]);
        let unchanged = reject_offer(&repo, &admin, 1).unwrap();
        assert_eq!(unchanged.status, OfferStatus::Rejected);
    }
}
