use chrono::Utc;
use diesel::prelude::*;

use crate::domain::deal::{Deal, DealStatus};
use crate::domain::types::{DealId, HubId, OfferId, SanitizedText};
use crate::models::deal::Deal as DbDeal;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DealReader, DealWriter, DieselRepository};

impl DealReader for DieselRepository {
    fn get_deal_by_id(&self, id: DealId, hub_id: HubId) -> RepositoryResult<Option<Deal>> {
        use crate::schema::deals;

        let mut conn = self.conn()?;
        let db_deal = deals::table
            .filter(deals::id.eq(id.get()))
            .filter(deals::hub_id.eq(hub_id.get()))
            .first::<DbDeal>(&mut conn)
            .optional()?;

        db_deal
            .map(Deal::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_deal_by_offer(&self, offer_id: OfferId) -> RepositoryResult<Option<Deal>> {
        use crate::schema::deals;

        let mut conn = self.conn()?;
        let db_deal = deals::table
            .filter(deals::offer_id.eq(offer_id.get()))
            .first::<DbDeal>(&mut conn)
            .optional()?;

        db_deal
            .map(Deal::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_deals(
        &self,
        hub_id: HubId,
        status: Option<DealStatus>,
    ) -> RepositoryResult<Vec<Deal>> {
        use crate::schema::deals;

        let mut conn = self.conn()?;
        let mut query = deals::table
            .filter(deals::hub_id.eq(hub_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(status) = status {
            query = query.filter(deals::status.eq(status.as_str()));
        }

        query
            .order((deals::created_at.desc(), deals::id.desc()))
            .load::<DbDeal>(&mut conn)?
            .into_iter()
            .map(Deal::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }
}

impl DealWriter for DieselRepository {
    fn update_deal_status(
        &self,
        id: DealId,
        status: DealStatus,
        rejection_reason: Option<SanitizedText>,
    ) -> RepositoryResult<Deal> {
        use crate::schema::deals;

        let mut conn = self.conn()?;
        let now = Utc::now().naive_utc();
        let target = deals::table.find(id.get());

        let db_deal = match rejection_reason {
            Some(reason) => diesel::update(target)
                .set((
                    deals::status.eq(status.as_str()),
                    deals::rejection_reason.eq(Some(reason.as_str())),
                    deals::updated_at.eq(now),
                ))
                .get_result::<DbDeal>(&mut conn)?,
            None => diesel::update(target)
                .set((deals::status.eq(status.as_str()), deals::updated_at.eq(now)))
                .get_result::<DbDeal>(&mut conn)?,
        };

        Deal::try_from(db_deal).map_err(RepositoryError::from)
    }
}
