//! Payment gateways used when recording payments.

use thiserror::Error;

use crate::domain::payment::PaymentMethod;
use crate::domain::types::{DealId, Money, PaymentReference};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("payment method {0} is not supported")]
    Unsupported(PaymentMethod),

    #[error("payment declined: {0}")]
    Declined(String),
}

/// A charge request passed to a [`PaymentGateway`].
#[derive(Debug, Clone)]
pub struct Charge<'a> {
    pub deal_id: DealId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<&'a PaymentReference>,
}

pub trait PaymentGateway: Send + Sync {
    /// Settles the charge and returns the reference to store with the payment.
    fn charge(&self, charge: &Charge<'_>) -> Result<Option<PaymentReference>, GatewayError>;
}

/// Accepts payments collected outside the system (cash and bank transfers).
/// Card and wallet providers are not integrated.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineGateway;

impl PaymentGateway for OfflineGateway {
    fn charge(&self, charge: &Charge<'_>) -> Result<Option<PaymentReference>, GatewayError> {
        match charge.method {
            PaymentMethod::Cash | PaymentMethod::BankTransfer => Ok(charge.reference.cloned()),
            PaymentMethod::Stripe | PaymentMethod::PayPal => {
                Err(GatewayError::Unsupported(charge.method))
            }
        }
    }
}
