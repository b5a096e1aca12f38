use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::domain::payment::PaymentMethod;
use crate::domain::types::{Money, PaymentReference};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub amount_cents: i64,
    pub method: String,
    #[serde(default)]
    pub reference: Option<String>,
    /// Defaults to the time of recording.
    #[serde(default)]
    pub paid_at: Option<NaiveDateTime>,
}

pub struct PaymentPayload {
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<PaymentReference>,
    pub paid_at: Option<NaiveDateTime>,
}

impl TryFrom<PaymentForm> for PaymentPayload {
    type Error = FormError;

    fn try_from(form: PaymentForm) -> Result<Self, Self::Error> {
        if form.amount_cents <= 0 {
            return Err(FormError::InvalidAmount);
        }
        Ok(Self {
            amount: Money::from_cents(form.amount_cents).map_err(|_| FormError::InvalidAmount)?,
            method: form
                .method
                .trim()
                .parse()
                .map_err(|_| FormError::InvalidPaymentMethod(form.method.clone()))?,
            reference: non_blank(form.reference)
                .map(PaymentReference::new)
                .transpose()
                .map_err(|_| FormError::InvalidText)?,
            paid_at: form.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_positive() {
        let form = PaymentForm {
            amount_cents: 0,
            method: "Cash".to_string(),
            reference: None,
            paid_at: None,
        };
        assert!(matches!(
            PaymentPayload::try_from(form),
            Err(FormError::InvalidAmount)
        ));
    }

    #[test]
    fn unknown_methods_are_rejected() {
        let form = PaymentForm {
            amount_cents: 100,
            method: "Barter".to_string(),
            reference: None,
            paid_at: None,
        };
        assert!(matches!(
            PaymentPayload::try_from(form),
            Err(FormError::InvalidPaymentMethod(m)) if m == "Barter"
        ));
    }
}
