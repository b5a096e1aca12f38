use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::payment::{NewPayment as DomainNewPayment, Payment as DomainPayment};
use crate::domain::types::{
    DealId, EmployeeId, Money, PaymentId, PaymentReference, TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::payments)]
pub struct Payment {
    pub id: i32,
    pub deal_id: i32,
    pub amount_cents: i64,
    pub method: String,
    pub reference: Option<String>,
    pub paid_at: NaiveDateTime,
    pub recorded_by: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::payments)]
pub struct NewPayment<'a> {
    pub deal_id: i32,
    pub amount_cents: i64,
    pub method: &'static str,
    pub reference: Option<&'a str>,
    pub paid_at: NaiveDateTime,
    pub recorded_by: i32,
}

impl TryFrom<Payment> for DomainPayment {
    type Error = TypeConstraintError;

    fn try_from(payment: Payment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId::new(payment.id)?,
            deal_id: DealId::new(payment.deal_id)?,
            amount: Money::from_cents(payment.amount_cents)?,
            method: payment.method.parse()?,
            reference: payment.reference.map(PaymentReference::new).transpose()?,
            paid_at: payment.paid_at,
            recorded_by: EmployeeId::new(payment.recorded_by)?,
        })
    }
}

impl<'a> From<&'a DomainNewPayment> for NewPayment<'a> {
    fn from(payment: &'a DomainNewPayment) -> Self {
        Self {
            deal_id: payment.deal_id.get(),
            amount_cents: payment.amount.cents(),
            method: payment.method.as_str(),
            reference: payment.reference.as_ref().map(PaymentReference::as_str),
            paid_at: payment.paid_at,
            recorded_by: payment.recorded_by.get(),
        }
    }
}
