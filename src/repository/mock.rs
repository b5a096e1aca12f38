//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;
use serde_json::Value;

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
    MaintenanceVisit, NewMaintenanceVisit, VisitStatusChange, VisitTransition,
};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ActivityListQuery, ActivityReader, ActivityWriter, ClientListQuery, ClientReader,
    ClientWriter, DealReader, DealWriter, EmployeeReader, EmployeeWriter, OfferReader,
    OfferWriter, PaymentReader, PaymentWriter, SparePartReader, SparePartWriter, VisitListQuery,
    VisitReader, VisitWriter,
};

mock! {
    pub Repository {}

    impl ClientReader for Repository {
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

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize>;
        fn update_client(
            &self,
            client_id: ClientId,
            hub_id: HubId,
            updates: &UpdateClient,
        ) -> RepositoryResult<Client>;
        fn delete_client(&self, client_id: ClientId, hub_id: HubId) -> RepositoryResult<()>;
    }

    impl EmployeeReader for Repository {
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

    impl EmployeeWriter for Repository {
        fn upsert_employee(&self, new_employee: &NewEmployee) -> RepositoryResult<Employee>;
        fn assign_clients_to_employee(
            &self,
            employee_id: EmployeeId,
            client_ids: &[ClientId],
        ) -> RepositoryResult<usize>;
    }

    impl ActivityReader for Repository {
        fn list_activities(
            &self,
            query: ActivityListQuery,
        ) -> RepositoryResult<(usize, Vec<(ClientActivity, Employee)>)>;
    }

    impl ActivityWriter for Repository {
        fn record_activity(
            &self,
            author: &NewEmployee,
            client_id: ClientId,
            kind: &ActivityKind,
            payload: &Value,
        ) -> RepositoryResult<(ClientActivity, Employee)>;
    }

    impl VisitReader for Repository {
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
        fn list_due_visits(
            &self,
            from: NaiveDateTime,
            until: NaiveDateTime,
        ) -> RepositoryResult<Vec<MaintenanceVisit>>;
    }

    impl VisitWriter for Repository {
        fn create_visit(&self, new_visit: &NewMaintenanceVisit) -> RepositoryResult<MaintenanceVisit>;
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

    impl SparePartReader for Repository {
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

    impl SparePartWriter for Repository {
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

    impl OfferReader for Repository {
        fn get_offer_by_id(&self, id: OfferId, hub_id: HubId) -> RepositoryResult<Option<Offer>>;
        fn list_offers(
            &self,
            hub_id: HubId,
            client_id: Option<ClientId>,
        ) -> RepositoryResult<Vec<Offer>>;
    }

    impl OfferWriter for Repository {
        fn create_offer(&self, offer: &NewOffer) -> RepositoryResult<Offer>;
        fn update_offer_status(&self, id: OfferId, status: OfferStatus) -> RepositoryResult<Offer>;
        fn accept_offer(&self, id: OfferId, deal: &NewDeal) -> RepositoryResult<(Offer, Deal)>;
    }

    impl DealReader for Repository {
        fn get_deal_by_id(&self, id: DealId, hub_id: HubId) -> RepositoryResult<Option<Deal>>;
        fn get_deal_by_offer(&self, offer_id: OfferId) -> RepositoryResult<Option<Deal>>;
        fn list_deals(
            &self,
            hub_id: HubId,
            status: Option<DealStatus>,
        ) -> RepositoryResult<Vec<Deal>>;
    }

    impl DealWriter for Repository {
        fn update_deal_status(
            &self,
            id: DealId,
            status: DealStatus,
            rejection_reason: Option<SanitizedText>,
        ) -> RepositoryResult<Deal>;
    }

    impl PaymentReader for Repository {
        fn list_payments(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>>;
        fn list_payments_for_deals(&self, deal_ids: &[DealId]) -> RepositoryResult<Vec<Payment>>;
        fn list_payments_between(
            &self,
            hub_id: HubId,
            from: NaiveDateTime,
            to: NaiveDateTime,
        ) -> RepositoryResult<Vec<Payment>>;
    }

    impl PaymentWriter for Repository {
        fn record_payment(
            &self,
            payment: &NewPayment,
            settles_deal: bool,
        ) -> RepositoryResult<Payment>;
    }
}
