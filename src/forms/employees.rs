use serde::Deserialize;

use crate::domain::types::{ClientId, EmployeeId};
use crate::forms::FormError;

#[derive(Debug, Deserialize)]
pub struct AssignClientsForm {
    pub employee_id: i32,
    #[serde(default)]
    pub client_ids: Vec<i32>,
}

pub struct AssignClientsPayload {
    pub employee_id: EmployeeId,
    pub client_ids: Vec<ClientId>,
}

impl TryFrom<AssignClientsForm> for AssignClientsPayload {
    type Error = FormError;

    fn try_from(form: AssignClientsForm) -> Result<Self, Self::Error> {
        let employee_id =
            EmployeeId::new(form.employee_id).map_err(|_| FormError::InvalidId("employee"))?;

        let mut client_ids = form
            .client_ids
            .into_iter()
            .map(|id| ClientId::new(id).map_err(|_| FormError::InvalidId("client")))
            .collect::<Result<Vec<_>, _>>()?;
        client_ids.sort_unstable();
        client_ids.dedup();

        Ok(Self {
            employee_id,
            client_ids,
        })
    }
}
