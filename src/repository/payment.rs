use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;

use crate::domain::deal::DealStatus;
use crate::domain::payment::{NewPayment, Payment};
use crate::domain::types::{DealId, HubId};
use crate::models::payment::{NewPayment as DbNewPayment, Payment as DbPayment};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, PaymentReader, PaymentWriter};

fn into_domain_list(payments: Vec<DbPayment>) -> RepositoryResult<Vec<Payment>> {
    payments
        .into_iter()
        .map(Payment::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(RepositoryError::from)
}

impl PaymentReader for DieselRepository {
    fn list_payments(&self, deal_id: DealId) -> RepositoryResult<Vec<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let payments = payments::table
            .filter(payments::deal_id.eq(deal_id.get()))
            .order((payments::paid_at.asc(), payments::id.asc()))
            .load::<DbPayment>(&mut conn)?;

        into_domain_list(payments)
    }

    fn list_payments_for_deals(&self, deal_ids: &[DealId]) -> RepositoryResult<Vec<Payment>> {
        use crate::schema::payments;

        let mut conn = self.conn()?;
        let ids = deal_ids.iter().map(|id| id.get()).collect::<Vec<i32>>();
        let payments = payments::table
            .filter(payments::deal_id.eq_any(ids))
            .order((payments::paid_at.asc(), payments::id.asc()))
            .load::<DbPayment>(&mut conn)?;

        into_domain_list(payments)
    }

    fn list_payments_between(
        &self,
        hub_id: HubId,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<Payment>> {
        use crate::schema::{deals, payments};

        let mut conn = self.conn()?;
        let payments = payments::table
            .inner_join(deals::table)
            .filter(deals::hub_id.eq(hub_id.get()))
            .filter(payments::paid_at.ge(from))
            .filter(payments::paid_at.lt(to))
            .order((payments::paid_at.asc(), payments::id.asc()))
            .select(DbPayment::as_select())
            .load::<DbPayment>(&mut conn)?;

        into_domain_list(payments)
    }
}

impl PaymentWriter for DieselRepository {
    fn record_payment(
        &self,
        payment: &NewPayment,
        settles_deal: bool,
    ) -> RepositoryResult<Payment> {
        use crate::schema::{deals, payments};

        let mut conn = self.conn()?;

        let db_payment = conn
            .transaction::<DbPayment, diesel::result::Error, _>(|conn| {
                let db_new_payment: DbNewPayment = payment.into();
                let db_payment = diesel::insert_into(payments::table)
                    .values(&db_new_payment)
                    .get_result::<DbPayment>(conn)?;

                if settles_deal {
                    diesel::update(deals::table.find(payment.deal_id.get()))
                        .set((
                            deals::status.eq(DealStatus::Closed.as_str()),
                            deals::updated_at.eq(Utc::now().naive_utc()),
                        ))
                        .execute(conn)?;
                }

                Ok(db_payment)
            })
            .map_err(RepositoryError::from)?;

        Payment::try_from(db_payment).map_err(RepositoryError::from)
    }
}
