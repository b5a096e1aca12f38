use serde::{Deserialize, Serialize};

use crate::domain::notification::{Notification, Recipient};

/// Wire format published on the notifications socket.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ZmqNotificationMessage {
    pub hub_id: i32,
    pub recipient: Recipient,
    pub title: String,
    pub message: String,
}

impl From<&Notification> for ZmqNotificationMessage {
    fn from(notification: &Notification) -> Self {
        Self {
            hub_id: notification.hub_id.get(),
            recipient: notification.recipient.clone(),
            title: notification.title.clone(),
            message: notification.message.clone(),
        }
    }
}
