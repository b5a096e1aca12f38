//! DTOs that bridge services with the JSON API.

pub mod clients;
pub mod deals;
pub mod offers;
pub mod reports;
pub mod visits;
