//! Database models shared across the ERP repository.

pub mod activity;
pub mod client;
pub mod config;
pub mod deal;
pub mod employee;
pub mod offer;
pub mod payment;
pub mod spare_part;
pub mod visit;
pub mod zmq;
