use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::offer::NewOfferItem;
use crate::domain::types::{ClientId, ItemDescription, Money, Quantity, SanitizedText};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Serialize)]
pub struct OfferItemForm {
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOfferForm {
    pub client_id: i32,
    #[serde(default)]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub items: Vec<OfferItemForm>,
}

pub struct CreateOfferPayload {
    pub client_id: ClientId,
    pub notes: Option<SanitizedText>,
    pub items: Vec<NewOfferItem>,
}

impl TryFrom<OfferItemForm> for NewOfferItem {
    type Error = FormError;

    fn try_from(form: OfferItemForm) -> Result<Self, Self::Error> {
        Ok(Self {
            description: ItemDescription::new(form.description)
                .map_err(|_| FormError::InvalidName)?,
            quantity: Quantity::new(form.quantity).map_err(|_| FormError::InvalidQuantity)?,
            unit_price: Money::from_cents(form.unit_price_cents)
                .map_err(|_| FormError::InvalidAmount)?,
        })
    }
}

impl TryFrom<CreateOfferForm> for CreateOfferPayload {
    type Error = FormError;

    fn try_from(form: CreateOfferForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidId("client"))?,
            notes: non_blank(form.notes)
                .map(SanitizedText::new)
                .transpose()
                .map_err(|_| FormError::InvalidText)?,
            items: form
                .items
                .into_iter()
                .map(NewOfferItem::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}
