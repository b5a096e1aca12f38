//! Accounting report payloads.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::deal::Deal;
use crate::domain::payment::PaymentMethod;
use crate::domain::types::Money;

/// Reporting window, `from` inclusive and `to` exclusive.
#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub total: Money,
    pub count: usize,
}

/// Balance of a deal that is approved but not yet settled.
#[derive(Debug, Serialize)]
pub struct DealBalance {
    pub deal: Deal,
    pub paid: Money,
    pub outstanding: Money,
}

#[derive(Debug, Serialize)]
pub struct AccountingReport {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
    pub total_collected: Money,
    pub payment_count: usize,
    pub by_method: Vec<MethodTotal>,
    pub open_deals: Vec<DealBalance>,
}
