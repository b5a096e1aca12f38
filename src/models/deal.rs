use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::deal::{Deal as DomainDeal, NewDeal as DomainNewDeal};
use crate::domain::types::{
    ClientId, DealId, DealTitle, EmployeeId, HubId, Money, OfferId, SanitizedText,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::deals)]
pub struct Deal {
    pub id: i32,
    pub hub_id: i32,
    pub client_id: i32,
    pub offer_id: Option<i32>,
    pub salesman_id: i32,
    pub title: String,
    pub total_cents: i64,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::deals)]
pub struct NewDeal<'a> {
    pub hub_id: i32,
    pub client_id: i32,
    pub offer_id: Option<i32>,
    pub salesman_id: i32,
    pub title: &'a str,
    pub total_cents: i64,
    pub status: &'static str,
}

impl TryFrom<Deal> for DomainDeal {
    type Error = TypeConstraintError;

    fn try_from(deal: Deal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DealId::new(deal.id)?,
            hub_id: HubId::new(deal.hub_id)?,
            client_id: ClientId::new(deal.client_id)?,
            offer_id: deal.offer_id.map(OfferId::new).transpose()?,
            salesman_id: EmployeeId::new(deal.salesman_id)?,
            title: DealTitle::new(deal.title)?,
            total: Money::from_cents(deal.total_cents)?,
            status: deal.status.parse()?,
            rejection_reason: deal.rejection_reason.map(SanitizedText::new).transpose()?,
            created_at: deal.created_at,
            updated_at: deal.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewDeal> for NewDeal<'a> {
    fn from(deal: &'a DomainNewDeal) -> Self {
        Self {
            hub_id: deal.hub_id.get(),
            client_id: deal.client_id.get(),
            offer_id: deal.offer_id.map(OfferId::get),
            salesman_id: deal.salesman_id.get(),
            title: deal.title.as_str(),
            total_cents: deal.total.cents(),
            status: crate::domain::deal::DealStatus::PendingManagerApproval.as_str(),
        }
    }
}
