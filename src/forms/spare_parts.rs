use serde::Deserialize;

use crate::domain::types::{PartName, Quantity};
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct SparePartRequestForm {
    pub part_name: String,
    pub quantity: i32,
}

pub struct SparePartRequestPayload {
    pub part_name: PartName,
    pub quantity: Quantity,
}

impl TryFrom<SparePartRequestForm> for SparePartRequestPayload {
    type Error = FormError;

    fn try_from(form: SparePartRequestForm) -> Result<Self, Self::Error> {
        Ok(Self {
            part_name: PartName::new(form.part_name).map_err(|_| FormError::InvalidName)?,
            quantity: Quantity::new(form.quantity).map_err(|_| FormError::InvalidQuantity)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SparePartDecisionForm {
    pub approve: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_quantity_is_rejected() {
        let result = SparePartRequestPayload::try_from(SparePartRequestForm {
            part_name: "Pump seal".to_string(),
            quantity: 0,
        });
        assert!(matches!(result, Err(FormError::InvalidQuantity)));
    }
}
