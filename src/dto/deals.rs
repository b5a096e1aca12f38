use serde::{Deserialize, Serialize};

use crate::domain::deal::Deal;
use crate::domain::payment::Payment;
use crate::domain::types::Money;

#[derive(Debug, Default, Deserialize)]
pub struct DealsQuery {
    pub status: Option<String>,
}

/// Deal with its payments and the balance still owed.
#[derive(Debug, Serialize)]
pub struct DealDetails {
    pub deal: Deal,
    pub payments: Vec<Payment>,
    pub paid: Money,
    pub outstanding: Money,
}
