use std::fmt::Display;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::{ActivityId, ClientId, EmployeeId};

/// Entry in a client's activity timeline.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClientActivity {
    pub id: ActivityId,
    pub client_id: ClientId,
    pub employee_id: EmployeeId,
    pub kind: ActivityKind,
    pub payload: Value,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityKind {
    Comment,
    Call,
    Email,
    Visit,
    Offer,
    Deal,
    Payment,
    Other(String),
}

#[derive(Clone, Debug)]
pub struct NewClientActivity {
    pub client_id: ClientId,
    pub employee_id: EmployeeId,
    pub kind: ActivityKind,
    pub payload: Value,
}

impl NewClientActivity {
    #[must_use]
    pub fn new(
        client_id: ClientId,
        employee_id: EmployeeId,
        kind: ActivityKind,
        payload: Value,
    ) -> Self {
        Self {
            client_id,
            employee_id,
            kind,
            payload,
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityKind::Comment => write!(f, "Comment"),
            ActivityKind::Call => write!(f, "Call"),
            ActivityKind::Email => write!(f, "Email"),
            ActivityKind::Visit => write!(f, "Visit"),
            ActivityKind::Offer => write!(f, "Offer"),
            ActivityKind::Deal => write!(f, "Deal"),
            ActivityKind::Payment => write!(f, "Payment"),
            ActivityKind::Other(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ActivityKind {
    fn from(s: &str) -> Self {
        match s {
            "Comment" => ActivityKind::Comment,
            "Call" => ActivityKind::Call,
            "Email" => ActivityKind::Email,
            "Visit" => ActivityKind::Visit,
            "Offer" => ActivityKind::Offer,
            "Deal" => ActivityKind::Deal,
            "Payment" => ActivityKind::Payment,
            _ => ActivityKind::Other(s.to_string()),
        }
    }
}

impl From<String> for ActivityKind {
    fn from(s: String) -> Self {
        s.as_str().into()
    }
}
