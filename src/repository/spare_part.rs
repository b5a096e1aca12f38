use chrono::Utc;
use diesel::prelude::*;

use crate::domain::spare_part::{NewSparePartRequest, SparePartRequest, SparePartStatus};
use crate::domain::types::{EmployeeId, HubId, SparePartRequestId};
use crate::models::spare_part::{
    NewSparePartRequest as DbNewSparePartRequest, SparePartRequest as DbSparePartRequest,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, SparePartReader, SparePartWriter};

impl SparePartReader for DieselRepository {
    fn get_spare_part_request(
        &self,
        id: SparePartRequestId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<SparePartRequest>> {
        use crate::schema::{maintenance_visits, spare_part_requests};

        let mut conn = self.conn()?;
        let db_request = spare_part_requests::table
            .inner_join(maintenance_visits::table)
            .filter(spare_part_requests::id.eq(id.get()))
            .filter(maintenance_visits::hub_id.eq(hub_id.get()))
            .select(DbSparePartRequest::as_select())
            .first::<DbSparePartRequest>(&mut conn)
            .optional()?;

        db_request
            .map(SparePartRequest::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_spare_part_requests(
        &self,
        hub_id: HubId,
        status: Option<SparePartStatus>,
    ) -> RepositoryResult<Vec<SparePartRequest>> {
        use crate::schema::{maintenance_visits, spare_part_requests};

        let mut conn = self.conn()?;
        let mut items = spare_part_requests::table
            .inner_join(maintenance_visits::table)
            .filter(maintenance_visits::hub_id.eq(hub_id.get()))
            .select(DbSparePartRequest::as_select())
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(status) = status {
            items = items.filter(spare_part_requests::status.eq(status.as_str()));
        }

        items
            .order((
                spare_part_requests::created_at.desc(),
                spare_part_requests::id.desc(),
            ))
            .load::<DbSparePartRequest>(&mut conn)?
            .into_iter()
            .map(SparePartRequest::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl SparePartWriter for DieselRepository {
    fn create_spare_part_request(
        &self,
        request: &NewSparePartRequest,
    ) -> RepositoryResult<SparePartRequest> {
        use crate::schema::spare_part_requests;

        let mut conn = self.conn()?;
        let db_new_request: DbNewSparePartRequest = request.into();
        let db_request = diesel::insert_into(spare_part_requests::table)
            .values(&db_new_request)
            .get_result::<DbSparePartRequest>(&mut conn)?;

        SparePartRequest::try_from(db_request).map_err(RepositoryError::from)
    }

    fn update_spare_part_status(
        &self,
        id: SparePartRequestId,
        status: SparePartStatus,
        decided_by: Option<EmployeeId>,
    ) -> RepositoryResult<SparePartRequest> {
        use crate::schema::spare_part_requests;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let target = spare_part_requests::table.find(id.get());

        let db_request = match decided_by {
            Some(decided_by) => diesel::update(target)
                .set((
                    spare_part_requests::status.eq(status.as_str()),
                    spare_part_requests::decided_by.eq(Some(decided_by.get())),
                    spare_part_requests::updated_at.eq(now),
                ))
                .get_result::<DbSparePartRequest>(&mut conn)?,
            None => diesel::update(target)
                .set((
                    spare_part_requests::status.eq(status.as_str()),
                    spare_part_requests::updated_at.eq(now),
                ))
                .get_result::<DbSparePartRequest>(&mut conn)?,
        };

        SparePartRequest::try_from(db_request).map_err(RepositoryError::from)
    }
}
