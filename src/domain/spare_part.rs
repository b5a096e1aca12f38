//! Spare-part requests raised by engineers during a visit.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::Lifecycle;
use crate::domain::types::{
    EmployeeId, PartName, Quantity, SparePartRequestId, TypeConstraintError, VisitId,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SparePartStatus {
    Pending,
    Approved,
    Rejected,
    Fulfilled,
}

impl SparePartStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SparePartStatus::Pending => "Pending",
            SparePartStatus::Approved => "Approved",
            SparePartStatus::Rejected => "Rejected",
            SparePartStatus::Fulfilled => "Fulfilled",
        }
    }
}

impl Lifecycle for SparePartStatus {
    const ENTITY: &'static str = "SparePartRequest";

    const ALL: &'static [Self] = &[
        SparePartStatus::Pending,
        SparePartStatus::Approved,
        SparePartStatus::Rejected,
        SparePartStatus::Fulfilled,
    ];

    fn next_states(self) -> &'static [Self] {
        match self {
            SparePartStatus::Pending => &[SparePartStatus::Approved, SparePartStatus::Rejected],
            SparePartStatus::Approved => &[SparePartStatus::Fulfilled],
            SparePartStatus::Rejected | SparePartStatus::Fulfilled => &[],
        }
    }
}

impl Display for SparePartStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SparePartStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SparePartStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("spare part status {s}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SparePartRequest {
    pub id: SparePartRequestId,
    pub visit_id: VisitId,
    pub part_name: PartName,
    pub quantity: Quantity,
    pub status: SparePartStatus,
    pub requested_by: EmployeeId,
    pub decided_by: Option<EmployeeId>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewSparePartRequest {
    pub visit_id: VisitId,
    pub part_name: PartName,
    pub quantity: Quantity,
    pub requested_by: EmployeeId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_decided_once() {
        assert!(SparePartStatus::Pending.can_transition(SparePartStatus::Approved));
        assert!(SparePartStatus::Pending.can_transition(SparePartStatus::Rejected));
        assert!(!SparePartStatus::Rejected.can_transition(SparePartStatus::Approved));
        assert!(!SparePartStatus::Pending.can_transition(SparePartStatus::Fulfilled));
        assert!(SparePartStatus::Fulfilled.is_terminal());
        assert!(SparePartStatus::Rejected.is_terminal());
    }
}
