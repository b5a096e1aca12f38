//! Offers are stored as a header row plus one row per line item.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::deal::{Deal, NewDeal};
use crate::domain::offer::{NewOffer, Offer, OfferStatus};
use crate::domain::types::{ClientId, HubId, OfferId, SanitizedText};
use crate::models::deal::{Deal as DbDeal, NewDeal as DbNewDeal};
use crate::models::offer::{
    NewOffer as DbNewOffer, NewOfferItem as DbNewOfferItem, Offer as DbOffer,
    OfferItem as DbOfferItem,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, OfferReader, OfferWriter};

fn load_offer(conn: &mut SqliteConnection, db_offer: DbOffer) -> RepositoryResult<Offer> {
    use crate::schema::offer_items;

    let items = DbOfferItem::belonging_to(&db_offer)
        .order(offer_items::id.asc())
        .load::<DbOfferItem>(conn)?;

    db_offer.into_domain(items).map_err(RepositoryError::from)
}

impl OfferReader for DieselRepository {
    fn get_offer_by_id(&self, id: OfferId, hub_id: HubId) -> RepositoryResult<Option<Offer>> {
        use crate::schema::offers;

        let mut conn = self.conn()?;
        let db_offer = offers::table
            .filter(offers::id.eq(id.get()))
            .filter(offers::hub_id.eq(hub_id.get()))
            .first::<DbOffer>(&mut conn)
            .optional()?;

        db_offer
            .map(|db_offer| load_offer(&mut conn, db_offer))
            .transpose()
    }

    fn list_offers(
        &self,
        hub_id: HubId,
        client_id: Option<ClientId>,
    ) -> RepositoryResult<Vec<Offer>> {
        use crate::schema::{offer_items, offers};

        let mut conn = self.conn()?;
        let mut query = offers::table
            .filter(offers::hub_id.eq(hub_id.get()))
            .into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(client_id) = client_id {
            query = query.filter(offers::client_id.eq(client_id.get()));
        }

        let db_offers = query
            .order((offers::created_at.desc(), offers::id.desc()))
            .load::<DbOffer>(&mut conn)?;

        let items = DbOfferItem::belonging_to(&db_offers)
            .order(offer_items::id.asc())
            .load::<DbOfferItem>(&mut conn)?
            .grouped_by(&db_offers);

        db_offers
            .into_iter()
            .zip(items)
            .map(|(db_offer, items)| db_offer.into_domain(items).map_err(RepositoryError::from))
            .collect()
    }
}

impl OfferWriter for DieselRepository {
    fn create_offer(&self, offer: &NewOffer) -> RepositoryResult<Offer> {
        use crate::schema::{offer_items, offers};

        let mut conn = self.conn()?;

        let db_offer = conn
            .transaction::<DbOffer, diesel::result::Error, _>(|conn| {
                let db_offer = diesel::insert_into(offers::table)
                    .values(&DbNewOffer {
                        hub_id: offer.hub_id.get(),
                        client_id: offer.client_id.get(),
                        salesman_id: offer.salesman_id.get(),
                        status: OfferStatus::Draft.as_str(),
                        total_cents: offer.total.cents(),
                        notes: offer.notes.as_ref().map(SanitizedText::as_str),
                    })
                    .get_result::<DbOffer>(conn)?;

                for item in &offer.items {
                    diesel::insert_into(offer_items::table)
                        .values(&DbNewOfferItem {
                            offer_id: db_offer.id,
                            description: item.description.as_str(),
                            quantity: item.quantity.get(),
                            unit_price_cents: item.unit_price.cents(),
                        })
                        .execute(conn)?;
                }

                Ok(db_offer)
            })
            .map_err(RepositoryError::from)?;

        load_offer(&mut conn, db_offer)
    }

    fn update_offer_status(&self, id: OfferId, status: OfferStatus) -> RepositoryResult<Offer> {
        use crate::schema::offers;

        let mut conn = self.conn()?;
        let db_offer = diesel::update(offers::table.find(id.get()))
            .set((
                offers::status.eq(status.as_str()),
                offers::updated_at.eq(Utc::now().naive_utc()),
            ))
            .get_result::<DbOffer>(&mut conn)?;

        load_offer(&mut conn, db_offer)
    }

    fn accept_offer(&self, id: OfferId, deal: &NewDeal) -> RepositoryResult<(Offer, Deal)> {
        use crate::schema::{deals, offers};

        let mut conn = self.conn()?;

        let (db_offer, db_deal) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                let db_offer = diesel::update(offers::table.find(id.get()))
                    .set((
                        offers::status.eq(OfferStatus::Accepted.as_str()),
                        offers::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .get_result::<DbOffer>(conn)?;

                let db_new_deal: DbNewDeal = deal.into();
                let db_deal = diesel::insert_into(deals::table)
                    .values(&db_new_deal)
                    .get_result::<DbDeal>(conn)?;

                Ok((db_offer, db_deal))
            })
            .map_err(RepositoryError::from)?;

        let offer = load_offer(&mut conn, db_offer)?;
        let deal = Deal::try_from(db_deal).map_err(RepositoryError::from)?;
        Ok((offer, deal))
    }
}
