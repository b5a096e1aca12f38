//! Request bodies accepted by the JSON routes and their validated payloads.

use thiserror::Error;
use validator::ValidationErrors;

pub mod activities;
pub mod clients;
pub mod deals;
pub mod employees;
pub mod offers;
pub mod payments;
pub mod spare_parts;
pub mod visits;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid email address")]
    InvalidEmail,

    #[error("invalid name")]
    InvalidName,

    #[error("invalid phone number")]
    InvalidPhoneNumber,

    #[error("invalid address")]
    InvalidAddress,

    #[error("invalid {0} id")]
    InvalidId(&'static str),

    #[error("unknown status {0}")]
    InvalidStatus(String),

    #[error("unknown payment method {0}")]
    InvalidPaymentMethod(String),

    #[error("invalid amount")]
    InvalidAmount,

    #[error("quantity must be positive")]
    InvalidQuantity,

    #[error("invalid text")]
    InvalidText,

    #[error("page must be at most {0}")]
    InvalidPage(usize),

    #[error("invalid csv: {0}")]
    Csv(String),

    #[error("row {row}: {source}")]
    Row {
        row: usize,
        #[source]
        source: Box<FormError>,
    },
}

/// Trims the value and drops it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_dropped() {
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(Some(" x ".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(None), None);
    }
}
