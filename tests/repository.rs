use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use medequip_erp::domain::activity::ActivityKind;
use medequip_erp::domain::client::{NewClient, UpdateClient};
use medequip_erp::domain::deal::{DealStatus, NewDeal};
use medequip_erp::domain::employee::NewEmployee;
use medequip_erp::domain::offer::{NewOffer, NewOfferItem, OfferStatus};
use medequip_erp::domain::payment::{NewPayment, PaymentMethod};
use medequip_erp::domain::types::{
    ClientEmail, ClientName, DealTitle, EmployeeEmail, EquipmentName, HubId, ItemDescription,
    LegacyCode, Money, PhoneNumber, Quantity, SanitizedText,
};
use medequip_erp::domain::visit::{
    NewMaintenanceVisit, NewVisitStatusChange, VisitStatus, VisitTransition,
};
use medequip_erp::repository::errors::RepositoryError;
use medequip_erp::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, ClientListQuery, ClientReader,
    ClientWriter, DealReader, DieselRepository, EmployeeReader, EmployeeWriter, OfferReader,
    OfferWriter, PaymentReader, PaymentWriter, VisitListQuery, VisitReader, VisitWriter,
};

mod common;

fn hub() -> HubId {
    HubId::new(1).unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn new_client(name: &str, email: &str) -> NewClient {
    NewClient::new(
        hub(),
        ClientName::new(name).unwrap(),
        Some(ClientEmail::new(email).unwrap()),
        Some(PhoneNumber::new("+1 415 555 2671").unwrap()),
        None,
    )
}

fn new_visit(client: &medequip_erp::domain::client::Client) -> NewMaintenanceVisit {
    NewMaintenanceVisit {
        hub_id: hub(),
        client_id: client.id,
        engineer_id: None,
        equipment: EquipmentName::new("CT scanner SN-77").unwrap(),
        description: None,
        status: VisitStatus::Scheduled,
        scheduled_at: at(10, 9),
        legacy_code: None,
    }
}

#[test]
fn test_client_repository_crud() {
    let test_db = common::TestDb::new("test_client_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let alice = repo
        .create_client(&new_client("Alice Clinic", "alice@example.com"))
        .unwrap();
    assert_eq!(
        repo.create_clients(&[
            new_client("Bob Hospital", "bob@example.com"),
            new_client("Alice again", "alice@example.com"),
        ])
        .unwrap(),
        1
    );

    let (total, items) = repo.list_clients(ClientListQuery::new(hub())).unwrap();
    assert_eq!(total, 2);
    assert_eq!(items.len(), 2);

    let (found, matches) = repo
        .list_clients(ClientListQuery::new(hub()).search("Bob"))
        .unwrap();
    assert_eq!(found, 1);
    let bob = matches[0].clone();
    assert_eq!(bob.name.as_str(), "Bob Hospital");

    let email = ClientEmail::new("ALICE@example.com").unwrap();
    assert_eq!(
        repo.get_client_by_email(&email, hub()).unwrap().map(|c| c.id),
        Some(alice.id)
    );

    let updates = UpdateClient {
        name: ClientName::new("Bobby Hospital").unwrap(),
        email: bob.email.clone(),
        phone: None,
        address: None,
    };
    let updated = repo.update_client(bob.id, hub(), &updates).unwrap();
    assert_eq!(updated.name.as_str(), "Bobby Hospital");
    assert!(updated.phone.is_none());

    repo.delete_client(alice.id, hub()).unwrap();
    assert!(repo.get_client_by_id(alice.id, hub()).unwrap().is_none());

    let other_hub = HubId::new(2).unwrap();
    assert!(repo.get_client_by_id(bob.id, other_hub).unwrap().is_none());
}

#[test]
fn test_duplicate_email_is_a_constraint_violation() {
    let test_db = common::TestDb::new("test_duplicate_email.db");
    let repo = DieselRepository::new(test_db.pool());

    repo.create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let err = repo
        .create_client(&new_client("Alice 2", "alice@example.com"))
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Duplicate(_)));
}

#[test]
fn test_employee_assignment() {
    let test_db = common::TestDb::new("test_employee_assignment.db");
    let repo = DieselRepository::new(test_db.pool());

    let client = repo
        .create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let salesman = repo
        .upsert_employee(&NewEmployee::try_new(1, "Sam", "sam@example.com").unwrap())
        .unwrap();
    let renamed = repo
        .upsert_employee(&NewEmployee::try_new(1, "Samuel", "sam@example.com").unwrap())
        .unwrap();
    assert_eq!(salesman.id, renamed.id);
    assert_eq!(renamed.name.as_str(), "Samuel");

    assert_eq!(
        repo.assign_clients_to_employee(salesman.id, &[client.id])
            .unwrap(),
        1
    );

    let email = EmployeeEmail::new("sam@example.com").unwrap();
    assert!(
        repo.check_client_assigned_to_employee(client.id, &email)
            .unwrap()
    );
    let (total, _) = repo
        .list_clients(ClientListQuery::new(hub()).employee_email(email.clone()))
        .unwrap();
    assert_eq!(total, 1);

    let employees = repo.list_employees_with_clients(hub()).unwrap();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].1.len(), 1);
    assert_eq!(repo.list_client_employees(client.id).unwrap().len(), 1);

    assert_eq!(repo.assign_clients_to_employee(salesman.id, &[]).unwrap(), 0);
    assert!(
        !repo
            .check_client_assigned_to_employee(client.id, &email)
            .unwrap()
    );
    assert!(
        repo.get_employee_by_email(&email, hub())
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_activity_feed() {
    let test_db = common::TestDb::new("test_activity_feed.db");
    let repo = DieselRepository::new(test_db.pool());

    let client = repo
        .create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let author = NewEmployee::try_new(1, "Sam", "sam@example.com").unwrap();

    repo.record_activity(&author, client.id, &ActivityKind::Comment, &json!({"text": "hi"}))
        .unwrap();
    repo.record_activity(&author, client.id, &ActivityKind::Call, &json!({"text": "called"}))
        .unwrap();

    let (total, entries) = repo
        .list_activities(ActivityListQuery::new(client.id))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(entries[0].1.email.as_str(), "sam@example.com");

    let (calls, _) = repo
        .list_activities(ActivityListQuery::new(client.id).kind(ActivityKind::Call))
        .unwrap();
    assert_eq!(calls, 1);
}

#[test]
fn test_visit_transition_records_history() {
    let test_db = common::TestDb::new("test_visit_transition.db");
    let repo = DieselRepository::new(test_db.pool());

    let client = repo
        .create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let engineer = repo
        .upsert_employee(&NewEmployee::try_new(1, "Eve", "eve@example.com").unwrap())
        .unwrap();
    let visit = repo.create_visit(&new_visit(&client)).unwrap();
    assert!(!visit.reminder_sent);

    let visit = repo.assign_engineer(visit.id, engineer.id).unwrap();
    assert_eq!(visit.engineer_id, Some(engineer.id));

    repo.mark_visit_reminded(visit.id).unwrap();
    assert!(repo.list_due_visits(at(9, 12), at(10, 12)).unwrap().is_empty());

    let transition = VisitTransition {
        visit_id: visit.id,
        from_status: VisitStatus::Scheduled,
        to_status: VisitStatus::Rescheduled,
        scheduled_at: Some(at(12, 9)),
        history: vec![NewVisitStatusChange {
            visit_id: visit.id,
            from_status: VisitStatus::Scheduled,
            to_status: VisitStatus::Rescheduled,
            employee_id: engineer.id,
            note: Some(SanitizedText::new("customer asked").unwrap()),
        }],
    };
    let moved = repo.apply_visit_transition(&transition).unwrap();
    assert_eq!(moved.status, VisitStatus::Rescheduled);
    assert_eq!(moved.scheduled_at, at(12, 9));
    assert!(!moved.reminder_sent);

    let history = repo.list_visit_history(visit.id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].to_status, VisitStatus::Rescheduled);

    let stale = repo.apply_visit_transition(&transition).unwrap_err();
    assert!(matches!(stale, RepositoryError::NotFound));
    assert_eq!(repo.list_visit_history(visit.id).unwrap().len(), 1);

    let (total, _) = repo
        .list_visits(VisitListQuery::new(hub()).status(VisitStatus::Rescheduled))
        .unwrap();
    assert_eq!(total, 1);
    let email = ClientEmail::new("alice@example.com").unwrap();
    let (own, _) = repo
        .list_visits(VisitListQuery::new(hub()).client_email(email))
        .unwrap();
    assert_eq!(own, 1);
}

#[test]
fn test_due_visits_window() {
    let test_db = common::TestDb::new("test_due_visits_window.db");
    let repo = DieselRepository::new(test_db.pool());

    let client = repo
        .create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let soon = repo.create_visit(&new_visit(&client)).unwrap();
    let mut later = new_visit(&client);
    later.scheduled_at = at(20, 9);
    later.legacy_code = Some(LegacyCode::new("TBS-V-1").unwrap());
    repo.create_visit(&later).unwrap();

    let due = repo.list_due_visits(at(9, 12), at(10, 12)).unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, soon.id);

    let code = LegacyCode::new("TBS-V-1").unwrap();
    assert!(repo.get_visit_by_legacy_code(&code, hub()).unwrap().is_some());
}

#[test]
fn test_offer_to_deal_to_payment() {
    let test_db = common::TestDb::new("test_offer_to_deal_to_payment.db");
    let repo = DieselRepository::new(test_db.pool());

    let client = repo
        .create_client(&new_client("Alice", "alice@example.com"))
        .unwrap();
    let salesman = repo
        .upsert_employee(&NewEmployee::try_new(1, "Sam", "sam@example.com").unwrap())
        .unwrap();

    let items = vec![
        NewOfferItem {
            description: ItemDescription::new("Patient monitor").unwrap(),
            quantity: Quantity::new(2).unwrap(),
            unit_price: Money::from_cents(40_000).unwrap(),
        },
        NewOfferItem {
            description: ItemDescription::new("Installation").unwrap(),
            quantity: Quantity::new(1).unwrap(),
            unit_price: Money::from_cents(20_000).unwrap(),
        },
    ];
    let new_offer = NewOffer::try_new(hub(), client.id, salesman.id, None, items).unwrap();
    let offer = repo.create_offer(&new_offer).unwrap();
    assert_eq!(offer.total.cents(), 100_000);
    assert_eq!(offer.items.len(), 2);
    assert_eq!(offer.status, OfferStatus::Draft);

    let sent = repo.update_offer_status(offer.id, OfferStatus::Sent).unwrap();
    assert_eq!(sent.status, OfferStatus::Sent);

    let new_deal = NewDeal {
        hub_id: hub(),
        client_id: client.id,
        offer_id: Some(offer.id),
        salesman_id: salesman.id,
        title: DealTitle::new(format!("Offer #{}", offer.id)).unwrap(),
        total: offer.total,
    };
    let (accepted, deal) = repo.accept_offer(offer.id, &new_deal).unwrap();
    assert_eq!(accepted.status, OfferStatus::Accepted);
    assert_eq!(deal.status, DealStatus::PendingManagerApproval);
    assert_eq!(
        repo.get_deal_by_offer(offer.id).unwrap().map(|d| d.id),
        Some(deal.id)
    );
    assert!(repo.accept_offer(offer.id, &new_deal).is_err());

    let payment = NewPayment {
        deal_id: deal.id,
        amount: Money::from_cents(100_000).unwrap(),
        method: PaymentMethod::BankTransfer,
        reference: None,
        paid_at: at(5, 12),
        recorded_by: salesman.id,
    };
    repo.record_payment(&payment, true).unwrap();

    let closed = repo.get_deal_by_id(deal.id, hub()).unwrap().unwrap();
    assert_eq!(closed.status, DealStatus::Closed);
    assert_eq!(repo.list_payments(deal.id).unwrap().len(), 1);
    assert_eq!(
        repo.list_payments_between(hub(), at(5, 0), at(6, 0))
            .unwrap()
            .len(),
        1
    );
    assert!(
        repo.list_payments_between(hub(), at(5, 12), at(5, 12))
            .unwrap()
            .is_empty()
    );
    assert_eq!(repo.list_offers(hub(), Some(client.id)).unwrap().len(), 1);
    assert_eq!(repo.list_deals(hub(), Some(DealStatus::Closed)).unwrap().len(), 1);
}
