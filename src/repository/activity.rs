use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use serde_json::Value;

use crate::domain::activity::{ActivityKind, ClientActivity, NewClientActivity};
use crate::domain::employee::{Employee, NewEmployee};
use crate::domain::types::{ClientId, EmployeeId};
use crate::models::activity::{
    ClientActivity as DbClientActivity, NewClientActivity as DbNewClientActivity,
};
use crate::models::employee::Employee as DbEmployee;
use crate::repository::employee::upsert_employee_row;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{ActivityListQuery, ActivityReader, ActivityWriter, DieselRepository};

impl ActivityReader for DieselRepository {
    fn list_activities(
        &self,
        query: ActivityListQuery,
    ) -> RepositoryResult<(usize, Vec<(ClientActivity, Employee)>)> {
        use crate::schema::{client_activities, employees};

        let mut conn = self.conn()?;

        let kind = query.kind.as_ref().map(ActivityKind::to_string);

        let query_builder = || {
            let mut items = client_activities::table
                .filter(client_activities::client_id.eq(query.client_id.get()))
                .into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(kind) = &kind {
                items = items.filter(client_activities::kind.eq(kind.as_str()));
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

        let db_activities = items
            .order((
                client_activities::created_at.desc(),
                client_activities::id.desc(),
            ))
            .load::<DbClientActivity>(&mut conn)?;

        let employee_ids = db_activities
            .iter()
            .map(|activity| activity.employee_id)
            .collect::<HashSet<i32>>()
            .into_iter()
            .collect::<Vec<i32>>();

        let employee_map = employees::table
            .filter(employees::id.eq_any(employee_ids))
            .load::<DbEmployee>(&mut conn)?
            .into_iter()
            .map(|employee| (employee.id, employee))
            .collect::<HashMap<i32, DbEmployee>>();

        let combined = db_activities
            .into_iter()
            .filter_map(|activity| {
                employee_map
                    .get(&activity.employee_id)
                    .map(|employee| (activity, employee.clone()))
            })
            .map(|(activity, employee)| {
                Ok((
                    ClientActivity::try_from(activity)?,
                    Employee::try_from(employee)?,
                ))
            })
            .collect::<Result<Vec<_>, crate::domain::types::TypeConstraintError>>()
            .map_err(RepositoryError::from)?;

        Ok((total, combined))
    }
}

impl ActivityWriter for DieselRepository {
    fn record_activity(
        &self,
        author: &NewEmployee,
        client_id: ClientId,
        kind: &ActivityKind,
        payload: &Value,
    ) -> RepositoryResult<(ClientActivity, Employee)> {
        use crate::schema::client_activities;

        let mut conn = self.conn()?;

        let (db_activity, db_employee) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                let db_employee = upsert_employee_row(conn, author)?;

                let employee_id = EmployeeId::new(db_employee.id).map_err(|err| {
                    diesel::result::Error::DeserializationError(Box::new(err))
                })?;
                let activity =
                    NewClientActivity::new(client_id, employee_id, kind.clone(), payload.clone());
                let db_new_activity: DbNewClientActivity = (&activity).into();

                let db_activity = diesel::insert_into(client_activities::table)
                    .values(&db_new_activity)
                    .get_result::<DbClientActivity>(conn)?;

                Ok((db_activity, db_employee))
            })
            .map_err(RepositoryError::from)?;

        Ok((
            ClientActivity::try_from(db_activity).map_err(RepositoryError::from)?,
            Employee::try_from(db_employee).map_err(RepositoryError::from)?,
        ))
    }
}
