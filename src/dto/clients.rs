//! DTOs used by the client and activity endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::activity::ClientActivity;
use crate::domain::client::Client;
use crate::domain::employee::Employee;

/// Query parameters accepted by the client listing.
#[derive(Debug, Default, Deserialize)]
pub struct ClientsQuery {
    /// Optional free-form search string applied to the client list.
    pub search: Option<String>,
    /// Optional page number for pagination.
    pub page: Option<usize>,
}

/// Query parameters accepted by the activity timeline.
#[derive(Debug, Default, Deserialize)]
pub struct ActivitiesQuery {
    pub kind: Option<String>,
    pub page: Option<usize>,
}

/// Activity together with the employee who recorded it.
#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub activity: ClientActivity,
    pub author: Employee,
}

impl From<(ClientActivity, Employee)> for ActivityEntry {
    fn from((activity, author): (ClientActivity, Employee)) -> Self {
        Self { activity, author }
    }
}

/// Client card: the record, its assigned employees and latest activities.
#[derive(Debug, Serialize)]
pub struct ClientDetails {
    pub client: Client,
    pub employees: Vec<Employee>,
    pub recent_activities: Vec<ActivityEntry>,
}

/// Outcome of a CSV upload.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    /// Rows whose e-mail already belongs to a client of the hub.
    pub skipped: usize,
}

/// Employee listed with the clients assigned to them.
#[derive(Debug, Serialize)]
pub struct EmployeeWithClients {
    pub employee: Employee,
    pub clients: Vec<Client>,
}
