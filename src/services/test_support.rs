//! Fixtures shared by the service unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::domain::activity::{ActivityKind, ClientActivity};
use crate::domain::client::Client;
use crate::domain::deal::{Deal, DealStatus};
use crate::domain::employee::Employee;
use crate::domain::offer::{Offer, OfferItem, OfferStatus};
use crate::domain::payment::{Payment, PaymentMethod};
use crate::domain::types::{
    ActivityId, ClientId, ClientName, DealId, DealTitle, EmployeeEmail, EmployeeId, EmployeeName,
    EquipmentName, HubId, ItemDescription, Money, OfferId, OfferItemId, PaymentId, PublicId,
    Quantity, VisitId,
};
use crate::domain::visit::{MaintenanceVisit, VisitStatus};
use crate::repository::mock::MockRepository;

pub const HUB: i32 = 1;

pub fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

pub fn user_with_email(email: &str, roles: &[&str]) -> AuthenticatedUser {
    let mut all_roles = vec![crate::SERVICE_ACCESS_ROLE.to_string()];
    all_roles.extend(roles.iter().map(|role| role.to_string()));
    AuthenticatedUser {
        sub: "1".to_string(),
        email: email.to_string(),
        hub_id: HUB,
        name: "Test User".to_string(),
        roles: all_roles,
        exp: 0,
    }
}

pub fn user(roles: &[&str]) -> AuthenticatedUser {
    user_with_email("user@example.com", roles)
}

pub fn employee(id: i32, email: &str) -> Employee {
    Employee {
        id: EmployeeId::new(id).expect("valid employee id"),
        hub_id: HubId::new(HUB).expect("valid hub id"),
        name: EmployeeName::new("Test User").expect("valid name"),
        email: EmployeeEmail::new(email).expect("valid email"),
    }
}

pub fn client(id: i32) -> Client {
    Client {
        id: ClientId::new(id).expect("valid client id"),
        public_id: PublicId::new(),
        hub_id: HubId::new(HUB).expect("valid hub id"),
        name: ClientName::new(format!("Clinic {id}")).expect("valid name"),
        email: None,
        phone: None,
        address: None,
        legacy_code: None,
        created_at: at(1, 8),
        updated_at: at(1, 8),
    }
}

pub fn visit(id: i32, status: VisitStatus) -> MaintenanceVisit {
    MaintenanceVisit {
        id: VisitId::new(id).expect("valid visit id"),
        hub_id: HubId::new(HUB).expect("valid hub id"),
        client_id: ClientId::new(3).expect("valid client id"),
        engineer_id: None,
        equipment: EquipmentName::new("CT scanner").expect("valid equipment"),
        description: None,
        status,
        scheduled_at: at(10, 9),
        reminder_sent: false,
        legacy_code: None,
        created_at: at(1, 8),
        updated_at: at(1, 8),
    }
}

pub fn offer(id: i32, status: OfferStatus, cents: i64) -> Offer {
    Offer {
        id: OfferId::new(id).expect("valid offer id"),
        hub_id: HubId::new(HUB).expect("valid hub id"),
        client_id: ClientId::new(3).expect("valid client id"),
        salesman_id: EmployeeId::new(7).expect("valid employee id"),
        status,
        total: Money::from_cents(cents).expect("valid money"),
        notes: None,
        items: vec![OfferItem {
            id: OfferItemId::new(1).expect("valid item id"),
            description: ItemDescription::new("Patient monitor").expect("valid description"),
            quantity: Quantity::new(1).expect("valid quantity"),
            unit_price: Money::from_cents(cents).expect("valid money"),
        }],
        created_at: at(1, 8),
        updated_at: at(1, 8),
    }
}

pub fn deal(id: i32, status: DealStatus, cents: i64) -> Deal {
    Deal {
        id: DealId::new(id).expect("valid deal id"),
        hub_id: HubId::new(HUB).expect("valid hub id"),
        client_id: ClientId::new(3).expect("valid client id"),
        offer_id: None,
        salesman_id: EmployeeId::new(7).expect("valid employee id"),
        title: DealTitle::new("Monitors").expect("valid title"),
        total: Money::from_cents(cents).expect("valid money"),
        status,
        rejection_reason: None,
        created_at: at(1, 8),
        updated_at: at(1, 8),
    }
}

pub fn payment(id: i32, deal_id: i32, cents: i64, method: PaymentMethod) -> Payment {
    Payment {
        id: PaymentId::new(id).expect("valid payment id"),
        deal_id: DealId::new(deal_id).expect("valid deal id"),
        amount: Money::from_cents(cents).expect("valid money"),
        method,
        reference: None,
        paid_at: at(5, 12),
        recorded_by: EmployeeId::new(7).expect("valid employee id"),
    }
}

/// Lets the repository accept the caller's employee upsert.
pub fn expect_employee_upsert(repo: &mut MockRepository, id: i32) {
    repo.expect_upsert_employee()
        .returning(move |new_employee| Ok(employee(id, new_employee.email.as_str())));
}

/// Lets the repository accept any number of timeline entries.
pub fn expect_activities(repo: &mut MockRepository) {
    repo.expect_record_activity()
        .returning(|author, client_id, kind, payload| {
            Ok((
                ClientActivity {
                    id: ActivityId::new(1).expect("valid activity id"),
                    client_id,
                    employee_id: EmployeeId::new(7).expect("valid employee id"),
                    kind: kind.clone(),
                    payload: payload.clone(),
                    created_at: at(1, 8),
                },
                employee(7, author.email.as_str()),
            ))
        });
}

pub fn comment(client_id: i32) -> ClientActivity {
    ClientActivity {
        id: ActivityId::new(1).expect("valid activity id"),
        client_id: ClientId::new(client_id).expect("valid client id"),
        employee_id: EmployeeId::new(7).expect("valid employee id"),
        kind: ActivityKind::Comment,
        payload: json!({"text": "Called"}),
        created_at: at(1, 8),
    }
}
