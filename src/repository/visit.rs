use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::types::{EmployeeId, HubId, LegacyCode, VisitId};
use crate::domain::visit::{
    MaintenanceVisit, NewMaintenanceVisit, VisitStatus, VisitStatusChange, VisitTransition,
};
use crate::models::visit::{
    MaintenanceVisit as DbMaintenanceVisit, NewMaintenanceVisit as DbNewMaintenanceVisit,
    NewVisitStatusChange as DbNewVisitStatusChange, VisitStatusChange as DbVisitStatusChange,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, VisitListQuery, VisitReader, VisitWriter};

fn into_domain_list(visits: Vec<DbMaintenanceVisit>) -> RepositoryResult<Vec<MaintenanceVisit>> {
    visits
        .into_iter()
        .map(MaintenanceVisit::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RepositoryError::from)
}

impl VisitReader for DieselRepository {
    fn get_visit_by_id(
        &self,
        id: VisitId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<MaintenanceVisit>> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        let db_visit = maintenance_visits::table
            .filter(maintenance_visits::id.eq(id.get()))
            .filter(maintenance_visits::hub_id.eq(hub_id.get()))
            .first::<DbMaintenanceVisit>(&mut conn)
            .optional()?;

        db_visit
            .map(MaintenanceVisit::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_visit_by_legacy_code(
        &self,
        code: &LegacyCode,
        hub_id: HubId,
    ) -> RepositoryResult<Option<MaintenanceVisit>> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        let db_visit = maintenance_visits::table
            .filter(maintenance_visits::legacy_code.eq(code.as_str()))
            .filter(maintenance_visits::hub_id.eq(hub_id.get()))
            .first::<DbMaintenanceVisit>(&mut conn)
            .optional()?;

        db_visit
            .map(MaintenanceVisit::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_visits(
        &self,
        query: VisitListQuery,
    ) -> RepositoryResult<(usize, Vec<MaintenanceVisit>)> {
        use crate::schema::{clients, maintenance_visits};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = maintenance_visits::table
                .filter(maintenance_visits::hub_id.eq(query.hub_id.get()))
                .into_boxed::<Sqlite>();

            if let Some(status) = query.status {
                items = items.filter(maintenance_visits::status.eq(status.as_str()));
            }
            if let Some(client_id) = query.client_id {
                items = items.filter(maintenance_visits::client_id.eq(client_id.get()));
            }
            if let Some(engineer_id) = query.engineer_id {
                items = items.filter(maintenance_visits::engineer_id.eq(engineer_id.get()));
            }
            if let Some(email) = &query.client_email {
                let client_ids = clients::table
                    .filter(clients::email.eq(email.as_str()))
                    .filter(clients::hub_id.eq(query.hub_id.get()))
                    .select(clients::id);
                items = items.filter(maintenance_visits::client_id.eq_any(client_ids));
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let visits = items
            .order((
                maintenance_visits::scheduled_at.asc(),
                maintenance_visits::id.asc(),
            ))
            .load::<DbMaintenanceVisit>(&mut conn)?;

        Ok((total, into_domain_list(visits)?))
    }

    fn list_visit_history(&self, id: VisitId) -> RepositoryResult<Vec<VisitStatusChange>> {
        use crate::schema::visit_status_changes;

        let mut conn = self.conn()?;
        let changes = visit_status_changes::table
            .filter(visit_status_changes::visit_id.eq(id.get()))
            .order((
                visit_status_changes::created_at.asc(),
                visit_status_changes::id.asc(),
            ))
            .load::<DbVisitStatusChange>(&mut conn)?;

        changes
            .into_iter()
            .map(VisitStatusChange::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn list_due_visits(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> RepositoryResult<Vec<MaintenanceVisit>> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        let visits = maintenance_visits::table
            .filter(maintenance_visits::status.eq(VisitStatus::Scheduled.as_str()))
            .filter(maintenance_visits::reminder_sent.eq(false))
            .filter(maintenance_visits::scheduled_at.gt(from))
            .filter(maintenance_visits::scheduled_at.le(until))
            .order(maintenance_visits::scheduled_at.asc())
            .load::<DbMaintenanceVisit>(&mut conn)?;

        into_domain_list(visits)
    }
}

impl VisitWriter for DieselRepository {
    fn create_visit(&self, new_visit: &NewMaintenanceVisit) -> RepositoryResult<MaintenanceVisit> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        let db_new_visit: DbNewMaintenanceVisit = new_visit.into();
        let db_visit = diesel::insert_into(maintenance_visits::table)
            .values(&db_new_visit)
            .get_result::<DbMaintenanceVisit>(&mut conn)?;

        MaintenanceVisit::try_from(db_visit).map_err(RepositoryError::from)
    }

    fn apply_visit_transition(
        &self,
        transition: &VisitTransition,
    ) -> RepositoryResult<MaintenanceVisit> {
        use crate::schema::{maintenance_visits, visit_status_changes};

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();

        let db_visit = conn
            .transaction::<DbMaintenanceVisit, diesel::result::Error, _>(|conn| {
                let target = maintenance_visits::table
                    .find(transition.visit_id.get())
                    .filter(maintenance_visits::status.eq(transition.from_status.as_str()));
                let status = transition.to_status.as_str();

                let db_visit = match transition.scheduled_at {
                    Some(scheduled_at) => diesel::update(target)
                        .set((
                            maintenance_visits::status.eq(status),
                            maintenance_visits::scheduled_at.eq(scheduled_at),
                            maintenance_visits::reminder_sent.eq(false),
                            maintenance_visits::updated_at.eq(now),
                        ))
                        .get_result::<DbMaintenanceVisit>(conn)?,
                    None => diesel::update(target)
                        .set((
                            maintenance_visits::status.eq(status),
                            maintenance_visits::updated_at.eq(now),
                        ))
                        .get_result::<DbMaintenanceVisit>(conn)?,
                };

                for change in &transition.history {
                    let db_change: DbNewVisitStatusChange = change.into();
                    diesel::insert_into(visit_status_changes::table)
                        .values(&db_change)
                        .execute(conn)?;
                }

                Ok(db_visit)
            })
            .map_err(RepositoryError::from)?;

        MaintenanceVisit::try_from(db_visit).map_err(RepositoryError::from)
    }

    fn assign_engineer(
        &self,
        id: VisitId,
        engineer_id: EmployeeId,
    ) -> RepositoryResult<MaintenanceVisit> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        let db_visit = diesel::update(maintenance_visits::table.find(id.get()))
            .set((
                maintenance_visits::engineer_id.eq(Some(engineer_id.get())),
                maintenance_visits::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbMaintenanceVisit>(&mut conn)?;

        MaintenanceVisit::try_from(db_visit).map_err(RepositoryError::from)
    }

    fn mark_visit_reminded(&self, id: VisitId) -> RepositoryResult<()> {
        use crate::schema::maintenance_visits;

        let mut conn = self.conn()?;
        diesel::update(maintenance_visits::table.find(id.get()))
            .set(maintenance_visits::reminder_sent.eq(true))
            .execute(&mut conn)?;
        Ok(())
    }
}
