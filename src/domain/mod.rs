//! Domain aggregates exposed by the ERP service layer.

pub mod activity;
pub mod client;
pub mod deal;
pub mod employee;
pub mod lifecycle;
pub mod notification;
pub mod offer;
pub mod payment;
pub mod spare_part;
pub mod types;
pub mod visit;
