use serde::{Deserialize, Serialize};

use crate::auth::AuthenticatedUser;
use crate::domain::types::{EmployeeEmail, EmployeeId, EmployeeName, HubId, TypeConstraintError};

/// Staff member (salesman, engineer, manager) known to a hub.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub hub_id: HubId,
    pub name: EmployeeName,
    pub email: EmployeeEmail,
}

#[derive(Clone, Debug)]
pub struct NewEmployee {
    pub hub_id: HubId,
    pub name: EmployeeName,
    pub email: EmployeeEmail,
}

impl NewEmployee {
    pub fn try_new(
        hub_id: i32,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<Self, TypeConstraintError> {
        Ok(Self {
            hub_id: HubId::new(hub_id)?,
            name: EmployeeName::new(name)?,
            email: EmployeeEmail::new(email)?,
        })
    }
}

impl TryFrom<&AuthenticatedUser> for NewEmployee {
    type Error = TypeConstraintError;

    fn try_from(user: &AuthenticatedUser) -> Result<Self, Self::Error> {
        let name = if user.name.trim().is_empty() {
            user.email.clone()
        } else {
            user.name.clone()
        };
        Self::try_new(user.hub_id, name, user.email.as_str())
    }
}
