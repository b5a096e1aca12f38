use chrono::Utc;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::domain::client::{Client, NewClient, UpdateClient};
use crate::domain::employee::Employee;
use crate::domain::types::{ClientEmail, ClientId, EmployeeEmail, HubId, LegacyCode};
use crate::models::client::{
    Client as DbClient, NewClient as DbNewClient, UpdateClient as DbUpdateClient,
};
use crate::models::employee::Employee as DbEmployee;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ClientListQuery, ClientReader, ClientWriter, DieselRepository};

fn into_domain(db_client: Option<DbClient>) -> RepositoryResult<Option<Client>> {
    db_client
        .map(Client::try_from)
        .transpose()
        .map_err(RepositoryError::from)
}

impl ClientReader for DieselRepository {
    fn get_client_by_id(&self, id: ClientId, hub_id: HubId) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .filter(clients::id.eq(id.get()))
            .filter(clients::hub_id.eq(hub_id.get()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        into_domain(db_client)
    }

    fn get_client_by_email(
        &self,
        email: &ClientEmail,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .filter(clients::email.eq(email.as_str()))
            .filter(clients::hub_id.eq(hub_id.get()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        into_domain(db_client)
    }

    fn get_client_by_legacy_code(
        &self,
        code: &LegacyCode,
        hub_id: HubId,
    ) -> RepositoryResult<Option<Client>> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_client = clients::table
            .filter(clients::legacy_code.eq(code.as_str()))
            .filter(clients::hub_id.eq(hub_id.get()))
            .first::<DbClient>(&mut conn)
            .optional()?;

        into_domain(db_client)
    }

    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<(usize, Vec<Client>)> {
        use crate::schema::{client_employee, clients, employees};

        let mut conn = self.conn()?;

        let pattern = query.search.as_ref().map(|term| format!("%{term}%"));

        let query_builder = || {
            let mut items = clients::table
                .filter(clients::hub_id.eq(query.hub_id.get()))
                .into_boxed::<Sqlite>();

            if let Some(pattern) = &pattern {
                items = items.filter(
                    clients::name
                        .like(pattern.as_str())
                        .or(clients::email.like(pattern.as_str()))
                        .or(clients::phone.like(pattern.as_str()))
                        .or(clients::address.like(pattern.as_str())),
                );
            }

            if let Some(email) = &query.employee_email {
                let employee_ids = employees::table
                    .filter(employees::email.eq(email.as_str()))
                    .filter(employees::hub_id.eq(query.hub_id.get()))
                    .select(employees::id);
                let client_ids = client_employee::table
                    .filter(client_employee::employee_id.eq_any(employee_ids))
                    .select(client_employee::client_id);
                items = items.filter(clients::id.eq_any(client_ids));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset())
                .limit(pagination.limit());
        }

        let clients = items
            .order((clients::name.asc(), clients::id.asc()))
            .load::<DbClient>(&mut conn)?
            .into_iter()
            .map(Client::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)?;

        Ok((total, clients))
    }

    fn list_client_employees(&self, id: ClientId) -> RepositoryResult<Vec<Employee>> {
        use crate::schema::{client_employee, employees};

        let mut conn = self.conn()?;
        let employees = employees::table
            .inner_join(client_employee::table)
            .filter(client_employee::client_id.eq(id.get()))
            .order(employees::name.asc())
            .select(DbEmployee::as_select())
            .load::<DbEmployee>(&mut conn)?;

        employees
            .into_iter()
            .map(Employee::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    fn check_client_assigned_to_employee(
        &self,
        client_id: ClientId,
        employee_email: &EmployeeEmail,
    ) -> RepositoryResult<bool> {
        use crate::schema::{client_employee, employees};

        let mut conn = self.conn()?;
        let assigned = diesel::select(diesel::dsl::exists(
            client_employee::table
                .inner_join(employees::table)
                .filter(client_employee::client_id.eq(client_id.get()))
                .filter(employees::email.eq(employee_email.as_str())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(assigned)
    }
}

impl ClientWriter for DieselRepository {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_new_client: DbNewClient = new_client.into();
        let db_client = diesel::insert_into(clients::table)
            .values(&db_new_client)
            .get_result::<DbClient>(&mut conn)?;

        Client::try_from(db_client).map_err(RepositoryError::from)
    }

    fn create_clients(&self, new_clients: &[NewClient]) -> RepositoryResult<usize> {
        use crate::schema::clients;

        let mut conn = self.conn()?;

        conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            let mut inserted = 0;
            for new_client in new_clients {
                let db_new_client: DbNewClient = new_client.into();
                inserted += diesel::insert_or_ignore_into(clients::table)
                    .values(&db_new_client)
                    .execute(conn)?;
            }
            Ok(inserted)
        })
        .map_err(RepositoryError::from)
    }

    fn update_client(
        &self,
        client_id: ClientId,
        hub_id: HubId,
        updates: &UpdateClient,
    ) -> RepositoryResult<Client> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let db_updates = DbUpdateClient::from_domain(updates, Utc::now().naive_utc());

        let db_client = diesel::update(
            clients::table
                .filter(clients::id.eq(client_id.get()))
                .filter(clients::hub_id.eq(hub_id.get())),
        )
        .set(&db_updates)
        .get_result::<DbClient>(&mut conn)?;

        Client::try_from(db_client).map_err(RepositoryError::from)
    }

    fn delete_client(&self, client_id: ClientId, hub_id: HubId) -> RepositoryResult<()> {
        use crate::schema::clients;

        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            clients::table
                .filter(clients::id.eq(client_id.get()))
                .filter(clients::hub_id.eq(hub_id.get())),
        )
        .execute(&mut conn)?;

        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
