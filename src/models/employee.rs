//! Diesel models representing employees.

use diesel::prelude::*;

use crate::domain::employee::{Employee as DomainEmployee, NewEmployee as DomainNewEmployee};
use crate::domain::types::{EmployeeEmail, EmployeeId, EmployeeName, HubId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::employees)]
/// Diesel model for [`crate::domain::employee::Employee`].
pub struct Employee {
    pub id: i32,
    pub hub_id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::employees)]
/// Insertable form of [`Employee`].
pub struct NewEmployee<'a> {
    pub hub_id: i32,
    pub name: &'a str,
    pub email: &'a str,
}

impl TryFrom<Employee> for DomainEmployee {
    type Error = TypeConstraintError;

    fn try_from(employee: Employee) -> Result<Self, Self::Error> {
        Ok(Self {
            id: EmployeeId::try_from(employee.id)?,
            hub_id: HubId::try_from(employee.hub_id)?,
            name: EmployeeName::new(employee.name)?,
            email: EmployeeEmail::new(employee.email)?,
        })
    }
}

impl<'a> From<&'a DomainNewEmployee> for NewEmployee<'a> {
    fn from(employee: &'a DomainNewEmployee) -> Self {
        Self {
            hub_id: employee.hub_id.get(),
            name: employee.name.as_str(),
            email: employee.email.as_str(),
        }
    }
}
