//! Persistence seams of the ERP.
//!
//! Every aggregate exposes a reader and a writer trait so services can depend
//! on exactly the capabilities they use. [`DieselRepository`] implements all of
//! them on top of a single SQLite connection pool; multi-row changes run inside
//! one Diesel transaction.

use chrono::NaiveDateTime;
use serde_json::Value;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::activity::{ActivityKind, ClientActivity};
use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::deal::{Deal, DealStatus, NewDeal};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::offer::{NewOffer, Offer, OfferStatus};
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::spare_part::{NewSparePartRequest, SparePartRequest, SparePartStatus};
use crate::domain::types::{
    ClientEmail, ClientId, DealId, EmployeeEmail, EmployeeId, HubId, LegacyCode, OfferId,
    SanitizedText, SparePartRequestId, VisitId,
};
use crate::domain::visit::{
    MaintenanceVisit, NewMaintenanceVisit, VisitStatus, VisitStatusChange, VisitTransition,
};
use crate::repository::errors::RepositoryResult;

pub mod activity;
pub mod client;
pub mod deal;
pub mod employee;
pub mod errors;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;
pub mod offer;
pub mod payment;
pub mod spare_part;
pub mod visit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows to skip; saturates instead of wrapping on absurd page numbers.
    pub(crate) fn offset(&self) -> i64 {
        (self.page.max(1) - 1)
            .checked_mul(self.per_page)
            .and_then(|rows| i64::try_from(rows).ok())
            .unwrap_or(i64::MAX)
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::try_from(self.per_page).unwrap_or(i64::MAX)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientListQuery {
    pub hub_id: HubId,
    pub search: Option<String>,
    pub employee_email: Option<EmployeeEmail>,
    pub pagination: Option<Pagination>,
}

impl ClientListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            search: None,
            employee_email: None,
            pagination: None,
        }
    }

    /// Restrict the listing to clients assigned to the employee.
    pub fn employee_email(mut self, email: EmployeeEmail) -> Self {
        self.employee_email = Some(email);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivityListQuery {
    pub client_id: ClientId,
    pub kind: Option<ActivityKind>,
    pub pagination: Option<Pagination>,
}

impl ActivityListQuery {
    pub fn new(client_id: ClientId) -> Self {
        Self {
            client_id,
            kind: None,
            pagination: None,
        }
    }

    pub fn kind(mut self, kind: ActivityKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisitListQuery {
    pub hub_id: HubId,
    pub status: Option<VisitStatus>,
    pub client_id: Option<ClientId>,
    pub engineer_id: Option<EmployeeId>,
    /// Only visits of the client owning this contact email.
    pub client_email: Option<ClientEmail>,
    pub pagination: Option<Pagination>,
}

impl VisitListQuery {
    pub fn new(hub_id: HubId) -> Self {
        Self {
            hub_id,
            status: None,
            client_id: None,
            engineer_id: None,
            client_email: None,
            pagination: None,
        }
    }

    pub fn status(mut self, status: VisitStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn engineer(mut self, engineer_id: EmployeeId) -> Self {
        self.engineer_id = Some(engineer_id);
        self
    }

    pub fn client_email(mut self, email: ClientEmail) -> Self {
        self.client_email = Some(email);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId, hub_id: HubId) -> RepositoryResult<Option<Client>>;
    fn get_client_by_email(
        &self,
        email: &ClientEmail,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Client>>;
    fn get_client_by_legacy_code(
        &self,
        code: &LegacyCode,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)>;
    fn list_client_employees(&self, id: ClientId) -> RepositoryResult<Vec<Employee>>;
    fn check_client_assigned_to_employee(
        &self,
        client_id: ClientId,
        employee_email: &EmployeeEmail,
    ) -> RepositoryResult<bool>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    /// Inserts the batch in one transaction, silently skipping rows that hit a
    /// uniqueness constraint. Returns the number of inserted rows.
    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
    fn update_client(
        &self,
        client_id: ClientId,
        hub_id: HubId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client>;
    fn delete_client(&self, client_id: ClientId, hub_id: HubId) -> RepositoryResult<()>;
}

pub trait EmployeeReader {
    fn get_employee_by_id(
        &self,
        id: EmployeeId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Employee>>;
    fn get_employee_by_email(
        &self,
        email: &EmployeeEmail,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Employee>>;
    fn list_employees_with_clients(
        &self,
        hub_id: HubId,
    ) -> RepositoryResult<Vec<(Employee, Vec<Client>)>>;
}

pub trait EmployeeWriter {
    fn upsert_employee(&self, new_employee: &NewEmployee) -> RepositoryResult<Employee>;
    /// Replaces the employee's assignment set with `client_ids`.
    fn assign_clients_to_employee(
        &self,
        employee_id: EmployeeId,
        client_ids: &[ClientId],
    ) -> RepositoryResult<usize>;
}

pub trait ActivityReader {
    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<(ClientActivity, Employee)>)>;
}

pub trait ActivityWriter {
    /// Upserts `author` and appends the activity in one transaction.
    fn record_activity(
        &self,
        author: &NewEmployee,
        client_id: ClientId,
        kind: &ActivityKind,
        payload: &Value,
    ) -> RepositoryResult<(ClientActivity, Employee)>;
}

pub trait VisitReader {
    fn get_visit_by_id(
        &self,
        id: VisitId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<MaintenanceVisit>>;
    fn get_visit_by_legacy_code(
        &self,
        code: &LegacyCode,
        hub_id: HubId,
    ) -> RepositoryResult<Option<MaintenanceVisit>>;
    fn list_visits(
        &self,
        query: VisitListQuery,
    ) -> RepositoryResult<(usize, Vec<MaintenanceVisit>)>;
    fn list_visit_history(&self, id: VisitId) -> RepositoryResult<Vec<VisitStatusChange>>;
    /// Scheduled, not yet reminded visits due in `(from, until]` across all hubs.
    fn list_due_visits(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<MaintenanceVisit>>;
}

pub trait VisitWriter {
    fn create_visit(&self, new_visit: &NewMaintenanceVisit) -> RepositoryResult<MaintenanceVisit>;
    /// Persists the status change and its history rows atomically. A new
    /// `scheduled_at` also clears the reminder flag.
    fn apply_visit_transition(
        &self,
        transition: &VisitTransition,
    ) -> RepositoryResult<MaintenanceVisit>;
    fn assign_engineer(
        &self,
        id: VisitId,
        engineer_id: EmployeeId,
    ) -> RepositoryResult<MaintenanceVisit>;
    fn mark_visit_reminded(&self, id: VisitId) -> RepositoryResult<()>;
}

pub trait SparePartReader {
    fn get_spare_part_request(
        &self,
        id: SparePartRequestId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<SparePartRequest>>;
    fn list_spare_part_requests(
        &self,
        hub_id: HubId,
        status: Option<SparePartStatus>,
    ) -> RepositoryResult<Vec<SparePartRequest>>;
}

pub trait SparePartWriter {
    fn create_spare_part_request(
        &self,
        request: &NewSparePartRequest,
    ) -> RepositoryResult<SparePartRequest>;
    fn update_spare_part_status(
        &self,
        id: SparePartRequestId,
        status: SparePartStatus,
        decided_by: Option<EmployeeId>,
    ) -> RepositoryResult<SparePartRequest>;
}

pub trait OfferReader {
    fn get_offer_by_id(&self, id: OfferId, hub_id: HubId) -> RepositoryResult<Option<Offer>>;
    fn list_offers(
        &self,
        hub_id: HubId,
        client_id: Option<ClientId>,
    ) -> RepositoryResult<Vec<Offer>>;
}

pub trait OfferWriter {
    fn create_offer(&self, offer: &NewOffer) -> RepositoryResult<Offer>;
    fn update_offer_status(&self, id: OfferId, status: OfferStatus) -> RepositoryResult<Offer>;
    /// Marks the offer accepted and opens its deal in one transaction.
    fn accept_offer(&self, id: OfferId, deal: &NewDeal) -> RepositoryResult<(Offer, Deal)>;
}

pub trait DealReader {
    fn get_deal_by_id(&self, id: DealId, hub_id: HubId) -> RepositoryResult<Option<Deal>>;
    fn get_deal_by_offer(&self, offer_id: OfferId) -> RepositoryResult<Option<Deal>>;
    fn list_deals(
        &self,
        hub_id: HubId,
        status: Option<DealStatus>,
    ) -> RepositoryResult<Vec<Deal>>;
}

pub trait DealWriter {
    fn update_deal_status(
        &self,
        id: DealId,
        status: DealStatus,
        rejection_reason: Option<SanitizedText>,
    ) -> RepositoryResult<Deal>;
}

pub trait PaymentReader {
    fn list_payments(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>>;
    fn list_payments_for_deals(&self, deal_ids: &[DealId]) -> RepositoryResult<Vec<Payment>>;
    /// Payments of the hub with `paid_at` in `[from, to)`.
    fn list_payments_between(
        &self,
        hub_id: HubId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Payment>>;
}

pub trait PaymentWriter {
    /// Stores the payment; when `settles_deal` is set the deal is closed in the
    /// same transaction.
    fn record_payment(&self, payment: &NewPayment, settles_deal: bool)
    -> RepositoryResult<Payment>;
}

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_skips_previous_pages() {
        let pagination = Pagination { page: 3, per_page: 20 };
        assert_eq!(pagination.offset(), 40);
        assert_eq!(pagination.limit(), 20);
        assert_eq!(Pagination { page: 0, per_page: 20 }.offset(), 0);
    }

    #[test]
    fn offset_saturates_on_huge_pages() {
        let pagination = Pagination {
            page: usize::MAX,
            per_page: 20,
        };
        assert_eq!(pagination.offset(), i64::MAX);
    }
}
