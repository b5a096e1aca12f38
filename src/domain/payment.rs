use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    DealId, EmployeeId, Money, PaymentId, PaymentReference, TypeConstraintError,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Stripe,
    PayPal,
}

impl PaymentMethod {
    pub const ALL: &'static [PaymentMethod] = &[
        PaymentMethod::Cash,
        PaymentMethod::BankTransfer,
        PaymentMethod::Stripe,
        PaymentMethod::PayPal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::BankTransfer => "BankTransfer",
            PaymentMethod::Stripe => "Stripe",
            PaymentMethod::PayPal => "PayPal",
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("payment method {s}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Payment {
    pub id: PaymentId,
    pub deal_id: DealId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<PaymentReference>,
    pub paid_at: NaiveDateTime,
    pub recorded_by: EmployeeId,
}

#[derive(Clone, Debug)]
pub struct NewPayment {
    pub deal_id: DealId,
    pub amount: Money,
    pub method: PaymentMethod,
    pub reference: Option<PaymentReference>,
    pub paid_at: NaiveDateTime,
    pub recorded_by: EmployeeId,
}
