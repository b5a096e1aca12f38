//! Diesel models for storing client activities.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::activity::{
    ClientActivity as DomainClientActivity, NewClientActivity as DomainNewClientActivity,
};
use crate::domain::types::{ActivityId, ClientId, EmployeeId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::client_activities)]
pub struct ClientActivity {
    pub id: i32,
    pub client_id: i32,
    pub employee_id: i32,
    pub kind: String,
    pub payload: String, // JSON text
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::client_activities)]
pub struct NewClientActivity {
    pub client_id: i32,
    pub employee_id: i32,
    pub kind: String,
    pub payload: String,
}

impl TryFrom<ClientActivity> for DomainClientActivity {
    type Error = TypeConstraintError;

    fn try_from(activity: ClientActivity) -> Result<Self, Self::Error> {
        let payload = serde_json::from_str(&activity.payload).unwrap_or_default();

        Ok(Self {
            id: ActivityId::new(activity.id)?,
            client_id: ClientId::new(activity.client_id)?,
            employee_id: EmployeeId::new(activity.employee_id)?,
            kind: activity.kind.into(),
            payload,
            created_at: activity.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewClientActivity> for NewClientActivity {
    fn from(activity: &'a DomainNewClientActivity) -> Self {
        Self {
            client_id: activity.client_id.get(),
            employee_id: activity.employee_id.get(),
            kind: activity.kind.to_string(),
            payload: activity.payload.to_string(),
        }
    }
}
