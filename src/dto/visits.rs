use serde::{Deserialize, Serialize};

use crate::domain::visit::{MaintenanceVisit, VisitStatus, VisitStatusChange};

/// Query parameters accepted by the visit listing.
#[derive(Debug, Default, Deserialize)]
pub struct VisitsQuery {
    pub status: Option<String>,
    pub client_id: Option<i32>,
    pub engineer_id: Option<i32>,
    pub page: Option<usize>,
}

/// Visit with its status history and the statuses it may move to next.
#[derive(Debug, Serialize)]
pub struct VisitDetails {
    pub visit: MaintenanceVisit,
    pub history: Vec<VisitStatusChange>,
    pub next_states: Vec<VisitStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SparePartsQuery {
    pub status: Option<String>,
}
