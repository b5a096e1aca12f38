//! Repository implementation for hub employees.

use diesel::{Connection, prelude::*, upsert::excluded};

use crate::domain::client::Client;
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::types::{ClientId, EmployeeEmail, EmployeeId, HubId};
use crate::models::client::{Client as DbClient, ClientEmployee as DbClientEmployee};
use crate::models::employee::{Employee as DbEmployee, NewEmployee as DbNewEmployee};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, EmployeeReader, EmployeeWriter};

/// Inserts the employee or refreshes its display name on `(email, hub_id)`.
pub(crate) fn upsert_employee_row(
    conn: &mut SqliteConnection,
    new_employee: &NewEmployee,
) -> QueryResult<DbEmployee> {
    use crate::schema::employees;

    let db_new_employee: DbNewEmployee = new_employee.into();

    diesel::insert_into(employees::table)
        .values(&db_new_employee)
        .on_conflict((employees::email, employees::hub_id))
        .do_update()
        .set(employees::name.eq(excluded(employees::name)))
        .get_result::<DbEmployee>(conn)
}

impl EmployeeWriter for DieselRepository {
    fn upsert_employee(&self, new_employee: &NewEmployee) -> RepositoryResult<Employee> {
        let mut conn = self.conn()?;

        let db_employee = upsert_employee_row(&mut conn, new_employee)?;

        Employee::try_from(db_employee).map_err(RepositoryError::from)
    }

    fn assign_clients_to_employee(
        &self,
        employee_id: EmployeeId,
        client_ids: &[ClientId],
    ) -> RepositoryResult<usize> {
        use crate::schema::client_employee;

        let mut conn = self.conn()?;

        let rows = client_ids
            .iter()
            .map(|client_id| DbClientEmployee {
                client_id: client_id.get(),
                employee_id: employee_id.get(),
            })
            .collect::<Vec<_>>();

        conn.transaction::<usize, diesel::result::Error, _>(move |conn| {
            diesel::delete(
                client_employee::table
                    .filter(client_employee::employee_id.eq(employee_id.get())),
            )
            .execute(conn)?;

            if rows.is_empty() {
                return Ok(0);
            }

            diesel::insert_into(client_employee::table)
                .values(&rows)
                .execute(conn)
        })
        .map_err(RepositoryError::from)
    }
}

impl EmployeeReader for DieselRepository {
    fn get_employee_by_id(
        &self,
        id: EmployeeId,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Employee>> {
        use crate::schema::employees;

        let mut conn = self.conn()?;
        let db_employee = employees::table
            .filter(employees::id.eq(id.get()))
            .filter(employees::hub_id.eq(hub_id.get()))
            .first::<DbEmployee>(&mut conn)
            .optional()?;

        db_employee
            .map(Employee::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn get_employee_by_email(
        &self,
        email: &EmployeeEmail,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Employee>> {
        use crate::schema::employees;

        let mut conn = self.conn()?;
        let db_employee = employees::table
            .filter(employees::email.eq(email.as_str()))
            .filter(employees::hub_id.eq(hub_id.get()))
            .first::<DbEmployee>(&mut conn)
            .optional()?;

        db_employee
            .map(Employee::try_from)
            .transpose()
            .map_err(RepositoryError::from)
    }

    fn list_employees_with_clients(
        &self,
        hub_id: HubId,
    ) -> RepositoryResult<Vec<(Employee, Vec<Client>)>> {
        use crate::schema::{client_employee, clients, employees};

        let mut conn = self.conn()?;
        let employees = employees::table
            .filter(employees::hub_id.eq(hub_id.get()))
            .order(employees::name.asc())
            .load::<DbEmployee>(&mut conn)?;

        let employee_ids = employees
            .iter()
            .map(|db_employee| db_employee.id)
            .collect::<Vec<i32>>();

        let clients = clients::table
            .inner_join(client_employee::table)
            .filter(client_employee::employee_id.eq_any(employee_ids))
            .order(clients::name.asc())
            .select((client_employee::employee_id, clients::all_columns))
            .load::<(i32, DbClient)>(&mut conn)?;

        employees
            .into_iter()
            .map(|employee| {
                let employee_clients = clients
                    .iter()
                    .filter(|(employee_id, _)| *employee_id == employee.id)
                    .map(|(_, client)| {
                        Client::try_from(client.clone()).map_err(RepositoryError::from)
                    })
                    .collect::<Result<Vec<_>, RepositoryError>>()?;

                let domain_employee = Employee::try_from(employee).map_err(RepositoryError::from)?;
                Ok((domain_employee, employee_clients))
            })
            .collect::<Result<Vec<_>, RepositoryError>>()
    }
}
