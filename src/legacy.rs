//! Read access to the legacy TBS database.
//!
//! The TBS export is a separate SQLite file with two tables. Rows are
//! returned as they are stored; validation and mapping onto ERP records is
//! done by the migration service.

use diesel::prelude::*;

use crate::db::{DbPool, get_connection};
use crate::repository::errors::RepositoryResult;

pub mod schema {
    diesel::table! {
        tbs_customers (cust_id) {
            cust_id -> Integer,
            cust_name -> Text,
            cust_mail -> Nullable<Text>,
            cust_tel -> Nullable<Text>,
            cust_addr -> Nullable<Text>,
        }
    }

    diesel::table! {
        tbs_visits (visit_no) {
            visit_no -> Integer,
            cust_id -> Integer,
            machine -> Text,
            visit_date -> Text,
            state -> Integer,
            remarks -> Nullable<Text>,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = schema::tbs_customers)]
pub struct LegacyCustomer {
    pub cust_id: i32,
    pub cust_name: String,
    pub cust_mail: Option<String>,
    pub cust_tel: Option<String>,
    pub cust_addr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = schema::tbs_visits)]
pub struct LegacyVisit {
    pub visit_no: i32,
    pub cust_id: i32,
    pub machine: String,
    /// `YYYY-MM-DD HH:MM:SS` or a bare `YYYY-MM-DD`.
    pub visit_date: String,
    pub state: i32,
    pub remarks: Option<String>,
}

/// Source of legacy records to migrate.
pub trait LegacySource {
    fn customers(&self) -> RepositoryResult<Vec<LegacyCustomer>>;
    fn visits(&self) -> RepositoryResult<Vec<LegacyVisit>>;
}

/// Diesel backed reader over the TBS SQLite file.
pub struct TbsDatabase {
    pool: DbPool,
}

impl TbsDatabase {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl LegacySource for TbsDatabase {
    fn customers(&self) -> RepositoryResult<Vec<LegacyCustomer>> {
        use schema::tbs_customers;

        let mut conn = get_connection(&self.pool)?;
        let customers = tbs_customers::table
            .order(tbs_customers::cust_id.asc())
            .select(LegacyCustomer::as_select())
            .load(&mut conn)?;
        Ok(customers)
    }

    fn visits(&self) -> RepositoryResult<Vec<LegacyVisit>> {
        use schema::tbs_visits;

        let mut conn = get_connection(&self.pool)?;
        let visits = tbs_visits::table
            .order(tbs_visits::visit_no.asc())
            .select(LegacyVisit::as_select())
            .load(&mut conn)?;
        Ok(visits)
    }
}
