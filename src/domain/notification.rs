use serde::{Deserialize, Serialize};

use crate::domain::types::HubId;

/// Who a notification is addressed to inside a hub.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value")]
pub enum Recipient {
    Role(String),
    Email(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notification {
    pub hub_id: HubId,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn to_role(
        hub_id: HubId,
        role: &str,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hub_id,
            recipient: Recipient::Role(role.to_string()),
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn to_email(
        hub_id: HubId,
        email: &str,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            hub_id,
            recipient: Recipient::Email(email.to_string()),
            title: title.into(),
            message: message.into(),
        }
    }
}
