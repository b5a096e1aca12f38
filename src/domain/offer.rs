//! Sales offers sent to clients.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::Lifecycle;
use crate::domain::types::{
    ClientId, EmployeeId, HubId, ItemDescription, Money, OfferId, OfferItemId, Quantity,
    SanitizedText, TypeConstraintError,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum OfferStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl OfferStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OfferStatus::Draft => "Draft",
            OfferStatus::Sent => "Sent",
            OfferStatus::Accepted => "Accepted",
            OfferStatus::Rejected => "Rejected",
        }
    }
}

impl Lifecycle for OfferStatus {
    const ENTITY: &'static str = "Offer";

    const ALL: &'static [Self] = &[
        OfferStatus::Draft,
        OfferStatus::Sent,
        OfferStatus::Accepted,
        OfferStatus::Rejected,
    ];

    fn next_states(self) -> &'static [Self] {
        match self {
            OfferStatus::Draft => &[OfferStatus::Sent, OfferStatus::Rejected],
            OfferStatus::Sent => &[OfferStatus::Accepted, OfferStatus::Rejected],
            OfferStatus::Accepted | OfferStatus::Rejected => &[],
        }
    }
}

impl Display for OfferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("offer status {s}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OfferItem {
    pub id: OfferItemId,
    pub description: ItemDescription,
    pub quantity: Quantity,
    pub unit_price: Money,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewOfferItem {
    pub description: ItemDescription,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl NewOfferItem {
    pub fn line_total(&self) -> Result<Money, TypeConstraintError> {
        self.unit_price.checked_mul(self.quantity)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: OfferId,
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub salesman_id: EmployeeId,
    pub status: OfferStatus,
    pub total: Money,
    pub notes: Option<SanitizedText>,
    pub items: Vec<OfferItem>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewOffer {
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub salesman_id: EmployeeId,
    pub notes: Option<SanitizedText>,
    pub items: Vec<NewOfferItem>,
    pub total: Money,
}

impl NewOffer {
    /// Builds a draft offer, computing the total from its lines.
    pub fn try_new(
        hub_id: HubId,
        client_id: ClientId,
        salesman_id: EmployeeId,
        notes: Option<SanitizedText>,
        items: Vec<NewOfferItem>,
    ) -> Result<Self, TypeConstraintError> {
        if items.is_empty() {
            return Err(TypeConstraintError::InvalidValue(
                "offer must contain at least one item".to_string(),
            ));
        }
        let total = items.iter().try_fold(Money::ZERO, |acc, item| {
            acc.checked_add(item.line_total()?)
        })?;
        Ok(Self {
            hub_id,
            client_id,
            salesman_id,
            notes,
            items,
            total,
        })
    }
}
