//! One-shot import of TBS customers and visits.
//!
//! Imported rows carry a legacy code (`TBS-C-<cust_id>`, `TBS-V-<visit_no>`).
//! Rows whose code already exists in the hub are skipped, so the import can
//! be re-run after a partial failure.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::client::NewClient;
use crate::domain::types::{
    ClientAddress, ClientEmail, ClientId, ClientName, EquipmentName, HubId, LegacyCode,
    PhoneNumber, SanitizedText, TypeConstraintError,
};
use crate::domain::visit::{NewMaintenanceVisit, VisitStatus};
use crate::legacy::{LegacyCustomer, LegacySource, LegacyVisit};
use crate::repository::{ClientReader, ClientWriter, VisitReader, VisitWriter};
use crate::services::{ServiceError, ServiceResult};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    pub clients_imported: usize,
    pub clients_skipped: usize,
    pub visits_imported: usize,
    pub visits_skipped: usize,
    pub failures: usize,
}

fn customer_code(cust_id: i32) -> ServiceResult<LegacyCode> {
    Ok(LegacyCode::new(format!("TBS-C-{cust_id}"))?)
}

fn visit_code(visit_no: i32) -> ServiceResult<LegacyCode> {
    Ok(LegacyCode::new(format!("TBS-V-{visit_no}"))?)
}

/// Maps a TBS state code onto the visit lifecycle.
pub fn legacy_status(state: i32) -> Option<VisitStatus> {
    match state {
        0 => Some(VisitStatus::PendingApproval),
        1 => Some(VisitStatus::Scheduled),
        2 => Some(VisitStatus::InProgress),
        3 => Some(VisitStatus::NeedsSpareParts),
        4 => Some(VisitStatus::Completed),
        5 => Some(VisitStatus::Rescheduled),
        9 => Some(VisitStatus::Cancelled),
        _ => None,
    }
}

fn parse_visit_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Optional contact fields are dropped with a warning when they do not
/// validate; the customer is still imported.
fn optional_field<T, F>(cust_id: i32, field: &str, value: Option<&str>, parse: F) -> Option<T>
where
    F: FnOnce(&str) -> Result<T, TypeConstraintError>,
{
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;
    match parse(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            log::warn!("TBS customer {cust_id}: dropping {field} '{value}': {err}");
            None
        }
    }
}

fn to_new_client(hub_id: HubId, customer: &LegacyCustomer) -> ServiceResult<NewClient> {
    let name = ClientName::new(customer.cust_name.as_str())?;
    let email = optional_field(
        customer.cust_id,
        "email",
        customer.cust_mail.as_deref(),
        |value| ClientEmail::new(value),
    );
    let phone = optional_field(
        customer.cust_id,
        "phone",
        customer.cust_tel.as_deref(),
        |value| PhoneNumber::new(value),
    );
    let address = optional_field(
        customer.cust_id,
        "address",
        customer.cust_addr.as_deref(),
        |value| ClientAddress::new(value),
    );

    Ok(NewClient::new(hub_id, name, email, phone, address)
        .with_legacy_code(customer_code(customer.cust_id)?))
}

/// Clients are unique per e-mail within a hub; a TBS customer reusing a taken
/// address is imported without it.
fn release_taken_email<R>(
    repo: &R,
    cust_id: i32,
    mut new_client: NewClient,
) -> ServiceResult<NewClient>
where
    R: ClientReader + ?Sized,
{
    if let Some(email) = &new_client.email
        && repo
            .get_client_by_email(email, new_client.hub_id)?
            .is_some()
    {
        log::warn!(
            "TBS customer {cust_id}: dropping email '{}': already used in the hub",
            email.as_str()
        );
        new_client.email = None;
    }
    Ok(new_client)
}

fn to_new_visit(
    hub_id: HubId,
    client_id: ClientId,
    visit: &LegacyVisit,
) -> ServiceResult<NewMaintenanceVisit> {
    let status = legacy_status(visit.state).ok_or_else(|| {
        ServiceError::BusinessRule(format!("unknown TBS state code {}", visit.state))
    })?;
    let scheduled_at = parse_visit_date(&visit.visit_date).ok_or_else(|| {
        ServiceError::Form(format!("unparsable visit date '{}'", visit.visit_date))
    })?;
    let description = visit
        .remarks
        .as_deref()
        .map(str::trim)
        .filter(|remarks| !remarks.is_empty())
        .map(SanitizedText::new)
        .transpose()?;

    Ok(NewMaintenanceVisit {
        hub_id,
        client_id,
        engineer_id: None,
        equipment: EquipmentName::new(visit.machine.as_str())?,
        description,
        status,
        scheduled_at,
        legacy_code: Some(visit_code(visit.visit_no)?),
    })
}

/// Copies TBS customers and visits into `hub_id`.
///
/// Reading the legacy database is fatal; a single bad row is logged,
/// counted in [`MigrationReport::failures`] and the import continues.
pub fn migrate_legacy<S, R>(source: &S, repo: &R, hub_id: HubId) -> ServiceResult<MigrationReport>
where
    S: LegacySource + ?Sized,
    R: ClientReader + ClientWriter + VisitReader + VisitWriter + ?Sized,
{
    let mut report = MigrationReport::default();
    let mut clients: HashMap<i32, ClientId> = HashMap::new();

    for customer in source.customers()? {
        let code = customer_code(customer.cust_id)?;
        if let Some(existing) = repo.get_client_by_legacy_code(&code, hub_id)? {
            clients.insert(customer.cust_id, existing.id);
            report.clients_skipped += 1;
            continue;
        }

        let created = to_new_client(hub_id, &customer)
            .and_then(|new_client| release_taken_email(repo, customer.cust_id, new_client))
            .and_then(|new_client| Ok(repo.create_client(&new_client)?));
        match created {
            Ok(client) => {
                clients.insert(customer.cust_id, client.id);
                report.clients_imported += 1;
            }
            Err(err) => {
                log::error!("Failed to import TBS customer {}: {err}", customer.cust_id);
                report.failures += 1;
            }
        }
    }

    for visit in source.visits()? {
        let code = visit_code(visit.visit_no)?;
        if repo.get_visit_by_legacy_code(&code, hub_id)?.is_some() {
            report.visits_skipped += 1;
            continue;
        }

        let Some(client_id) = clients.get(&visit.cust_id).copied() else {
            log::error!(
                "TBS visit {} references unknown customer {}",
                visit.visit_no,
                visit.cust_id
            );
            report.failures += 1;
            continue;
        };

        let created = to_new_visit(hub_id, client_id, &visit)
            .and_then(|new_visit| Ok(repo.create_visit(&new_visit)?));
        match created {
            Ok(_) => report.visits_imported += 1,
            Err(err) => {
                log::error!("Failed to import TBS visit {}: {err}", visit.visit_no);
                report.failures += 1;
            }
        }
    }

    log::info!("TBS migration into hub {hub_id} finished: {report:?}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::errors::RepositoryResult;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{HUB, client, visit};

    struct StaticSource {
        customers: Vec<LegacyCustomer>,
        visits: Vec<LegacyVisit>,
    }

    impl LegacySource for StaticSource {
        fn customers(&self) -> RepositoryResult<Vec<LegacyCustomer>> {
            Ok(self.customers.clone())
        }

        fn visits(&self) -> RepositoryResult<Vec<LegacyVisit>> {
            Ok(self.visits.clone())
        }
    }

    fn customer(cust_id: i32, mail: Option<&str>) -> LegacyCustomer {
        LegacyCustomer {
            cust_id,
            cust_name: format!("Clinic {cust_id}"),
            cust_mail: mail.map(str::to_string),
            cust_tel: None,
            cust_addr: Some("1 Main St".to_string()),
        }
    }

    fn legacy_visit(visit_no: i32, cust_id: i32, state: i32) -> LegacyVisit {
        LegacyVisit {
            visit_no,
            cust_id,
            machine: "Infusion pump IP-3".to_string(),
            visit_date: "2024-11-02 10:30:00".to_string(),
            state,
            remarks: Some("yearly check".to_string()),
        }
    }

    fn hub() -> HubId {
        HubId::new(HUB).unwrap()
    }

    #[test]
    fn state_codes_map_onto_the_lifecycle() {
        assert_eq!(legacy_status(0), Some(VisitStatus::PendingApproval));
        assert_eq!(legacy_status(3), Some(VisitStatus::NeedsSpareParts));
        assert_eq!(legacy_status(9), Some(VisitStatus::Cancelled));
        assert_eq!(legacy_status(7), None);
    }

    #[test]
    fn bare_dates_are_midnight() {
        let parsed = parse_visit_date("2024-11-02").unwrap();
        assert_eq!(parsed.to_string(), "2024-11-02 00:00:00");
        assert!(parse_visit_date("02/11/2024").is_none());
    }

    #[test]
    fn imports_new_rows_and_counts_failures() {
        let source = StaticSource {
            customers: vec![customer(1, Some("not an email")), customer(2, None)],
            visits: vec![
                legacy_visit(10, 1, 1),
                legacy_visit(11, 2, 7),
                legacy_visit(12, 99, 1),
            ],
        };

        let mut repo = MockRepository::new();
        repo.expect_get_client_by_legacy_code()
            .returning(|_, _| Ok(None));
        repo.expect_create_client().returning(|new_client| {
            assert!(new_client.email.is_none());
            let id = if new_client.name.as_str() == "Clinic 1" { 5 } else { 6 };
            let mut created = client(id);
            created.legacy_code = new_client.legacy_code.clone();
            Ok(created)
        });
        repo.expect_get_visit_by_legacy_code()
            .returning(|_, _| Ok(None));
        repo.expect_create_visit()
            .withf(|new_visit| {
                new_visit.client_id == ClientId::new(5).unwrap()
                    && new_visit.status == VisitStatus::Scheduled
                    && new_visit.legacy_code.as_ref().map(LegacyCode::as_str) == Some("TBS-V-10")
            })
            .times(1)
            .returning(|_| Ok(visit(40, VisitStatus::Scheduled)));

        let report = migrate_legacy(&source, &repo, hub()).unwrap();

        assert_eq!(
            report,
            MigrationReport {
                clients_imported: 2,
                clients_skipped: 0,
                visits_imported: 1,
                visits_skipped: 0,
                failures: 2,
            }
        );
    }

    #[test]
    fn shared_emails_go_to_the_first_customer() {
        let source = StaticSource {
            customers: vec![
                customer(1, Some("desk@group.example")),
                customer(2, Some("desk@group.example")),
            ],
            visits: vec![legacy_visit(10, 2, 1), legacy_visit(11, 2, 4)],
        };

        let taken = std::sync::Mutex::new(Vec::<ClientEmail>::new());
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_legacy_code()
            .returning(|_, _| Ok(None));
        repo.expect_get_client_by_email()
            .returning(move |email, _| {
                let mut taken = taken.lock().unwrap();
                if taken.contains(email) {
                    Ok(Some(client(5)))
                } else {
                    taken.push(email.clone());
                    Ok(None)
                }
            });
        repo.expect_create_client().times(2).returning(|new_client| {
            let first = new_client.name.as_str() == "Clinic 1";
            assert_eq!(new_client.email.is_some(), first);
            let mut created = client(if first { 5 } else { 6 });
            created.legacy_code = new_client.legacy_code.clone();
            Ok(created)
        });
        repo.expect_get_visit_by_legacy_code()
            .returning(|_, _| Ok(None));
        repo.expect_create_visit()
            .withf(|new_visit| new_visit.client_id == ClientId::new(6).unwrap())
            .times(2)
            .returning(|_| Ok(visit(40, VisitStatus::Scheduled)));

        let report = migrate_legacy(&source, &repo, hub()).unwrap();

        assert_eq!(report.clients_imported, 2);
        assert_eq!(report.visits_imported, 2);
        assert_eq!(report.failures, 0);
    }

    #[test]
    fn rerun_skips_known_codes() {
        let source = StaticSource {
            customers: vec![customer(1, None)],
            visits: vec![legacy_visit(10, 1, 4)],
        };

        let mut repo = MockRepository::new();
        repo.expect_get_client_by_legacy_code()
            .returning(|_, _| Ok(Some(client(5))));
        repo.expect_create_client().never();
        repo.expect_get_visit_by_legacy_code()
            .returning(|_, _| Ok(Some(visit(40, VisitStatus::Completed))));
        repo.expect_create_visit().never();

        let report = migrate_legacy(&source, &repo, hub()).unwrap();

        assert_eq!(report.clients_skipped, 1);
        assert_eq!(report.visits_skipped, 1);
        assert_eq!(report.failures, 0);
    }
}
