//! Diesel models for offers and their line items.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::offer::{Offer as DomainOffer, OfferItem as DomainOfferItem, OfferStatus};
use crate::domain::types::{
    ClientId, EmployeeId, HubId, ItemDescription, Money, OfferId, OfferItemId, Quantity,
    SanitizedText, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::offers)]
pub struct Offer {
    pub id: i32,
    pub hub_id: i32,
    pub client_id: i32,
    pub salesman_id: i32,
    pub status: String,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::offers)]
pub struct NewOffer<'a> {
    pub hub_id: i32,
    pub client_id: i32,
    pub salesman_id: i32,
    pub status: &'static str,
    pub total_cents: i64,
    pub notes: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(belongs_to(Offer, foreign_key = offer_id))]
#[diesel(table_name = crate::schema::offer_items)]
pub struct OfferItem {
    pub id: i32,
    pub offer_id: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::offer_items)]
pub struct NewOfferItem<'a> {
    pub offer_id: i32,
    pub description: &'a str,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

impl TryFrom<OfferItem> for DomainOfferItem {
    type Error = TypeConstraintError;

    fn try_from(item: OfferItem) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OfferItemId::new(item.id)?,
            description: ItemDescription::new(item.description)?,
            quantity: Quantity::new(item.quantity)?,
            unit_price: Money::from_cents(item.unit_price_cents)?,
        })
    }
}

impl Offer {
    /// Combines the offer row with its already loaded lines.
    pub fn into_domain(self, items: Vec<OfferItem>) -> Result<DomainOffer, TypeConstraintError> {
        let status: OfferStatus = self.status.parse()?;
        Ok(DomainOffer {
            id: OfferId::new(self.id)?,
            hub_id: HubId::new(self.hub_id)?,
            client_id: ClientId::new(self.client_id)?,
            salesman_id: EmployeeId::new(self.salesman_id)?,
            status,
            total: Money::from_cents(self.total_cents)?,
            notes: self.notes.map(SanitizedText::new).transpose()?,
            items: items
                .into_iter()
                .map(DomainOfferItem::try_from)
                .collect::<Result<Vec<_>, _>>()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
