//! Maintenance visits and their status machine.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::Lifecycle;
use crate::domain::types::{
    ClientId, EmployeeId, EquipmentName, HubId, LegacyCode, SanitizedText, TypeConstraintError,
    VisitId, VisitStatusChangeId,
};

/// Roles whose visits skip the approval queue.
pub const PRIVILEGED_VISIT_ROLES: &[&str] =
    &[crate::SERVICE_ADMIN_ROLE, crate::MAINTENANCE_MANAGER_ROLE];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VisitStatus {
    PendingApproval,
    Scheduled,
    InProgress,
    NeedsSpareParts,
    Completed,
    Rescheduled,
    Cancelled,
}

impl VisitStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            VisitStatus::PendingApproval => "PendingApproval",
            VisitStatus::Scheduled => "Scheduled",
            VisitStatus::InProgress => "InProgress",
            VisitStatus::NeedsSpareParts => "NeedsSpareParts",
            VisitStatus::Completed => "Completed",
            VisitStatus::Rescheduled => "Rescheduled",
            VisitStatus::Cancelled => "Cancelled",
        }
    }

    /// Successors of a status given by name; unknown names have none.
    pub fn next_states_of(raw: &str) -> &'static [VisitStatus] {
        raw.parse::<VisitStatus>()
            .map(|status| status.next_states())
            .unwrap_or(&[])
    }

    /// Status a freshly created visit starts in, decided by the creator's roles.
    pub fn initial_for_roles<S: AsRef<str>>(roles: &[S]) -> VisitStatus {
        let privileged = roles
            .iter()
            .any(|role| PRIVILEGED_VISIT_ROLES.contains(&role.as_ref()));
        if privileged {
            VisitStatus::Scheduled
        } else {
            VisitStatus::PendingApproval
        }
    }
}

impl Lifecycle for VisitStatus {
    const ENTITY: &'static str = "MaintenanceVisit";

    const ALL: &'static [Self] = &[
        VisitStatus::PendingApproval,
        VisitStatus::Scheduled,
        VisitStatus::InProgress,
        VisitStatus::NeedsSpareParts,
        VisitStatus::Completed,
        VisitStatus::Rescheduled,
        VisitStatus::Cancelled,
    ];

    fn next_states(self) -> &'static [Self] {
        use VisitStatus::*;
        match self {
            PendingApproval => &[Scheduled, Cancelled],
            Scheduled => &[InProgress, Rescheduled, Cancelled],
            InProgress => &[NeedsSpareParts, Completed, Rescheduled],
            NeedsSpareParts => &[InProgress, Completed],
            Completed => &[Rescheduled],
            Rescheduled => &[Scheduled],
            Cancelled => &[],
        }
    }
}

impl Display for VisitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VisitStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisitStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("visit status {s}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MaintenanceVisit {
    pub id: VisitId,
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub engineer_id: Option<EmployeeId>,
    pub equipment: EquipmentName,
    pub description: Option<SanitizedText>,
    pub status: VisitStatus,
    pub scheduled_at: NaiveDateTime,
    pub reminder_sent: bool,
    pub legacy_code: Option<LegacyCode>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewMaintenanceVisit {
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub engineer_id: Option<EmployeeId>,
    pub equipment: EquipmentName,
    pub description: Option<SanitizedText>,
    pub status: VisitStatus,
    pub scheduled_at: NaiveDateTime,
    pub legacy_code: Option<LegacyCode>,
}

/// Row of the visit status history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct VisitStatusChange {
    pub id: VisitStatusChangeId,
    pub visit_id: VisitId,
    pub from_status: VisitStatus,
    pub to_status: VisitStatus,
    pub employee_id: EmployeeId,
    pub note: Option<SanitizedText>,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewVisitStatusChange {
    pub visit_id: VisitId,
    pub from_status: VisitStatus,
    pub to_status: VisitStatus,
    pub employee_id: EmployeeId,
    pub note: Option<SanitizedText>,
}

/// Persisted effect of a status change: the new status, optionally a new
/// date, and the history row recorded alongside it.
#[derive(Clone, Debug)]
pub struct VisitTransition {
    pub visit_id: VisitId,
    /// Status the move was validated against; the update only lands while
    /// the visit is still in it.
    pub from_status: VisitStatus,
    pub to_status: VisitStatus,
    pub scheduled_at: Option<NaiveDateTime>,
    pub history: Vec<NewVisitStatusChange>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use VisitStatus::*;

    const EDGES: &[(VisitStatus, VisitStatus)] = &[
        (PendingApproval, Scheduled),
        (PendingApproval, Cancelled),
        (Scheduled, InProgress),
        (Scheduled, Rescheduled),
        (Scheduled, Cancelled),
        (InProgress, NeedsSpareParts),
        (InProgress, Completed),
        (InProgress, Rescheduled),
        (NeedsSpareParts, InProgress),
        (NeedsSpareParts, Completed),
        (Completed, Rescheduled),
        (Rescheduled, Scheduled),
    ];

    #[test]
    fn every_table_edge_is_permitted() {
        for (from, to) in EDGES {
            assert!(from.can_transition(*to), "{from} -> {to}");
            assert!(from.validate_transition(*to).is_ok());
        }
    }

    #[test]
    fn pairs_outside_the_table_are_rejected() {
        for from in VisitStatus::ALL {
            for to in VisitStatus::ALL {
                if from == to || EDGES.contains(&(*from, *to)) {
                    continue;
                }
                assert!(!from.can_transition(*to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn identity_transition_is_always_permitted() {
        for status in VisitStatus::ALL {
            assert!(status.can_transition(*status));
        }
    }

    #[test]
    fn only_cancelled_is_terminal() {
        for status in VisitStatus::ALL {
            assert_eq!(status.is_terminal(), *status == Cancelled, "{status}");
        }
        assert!(Cancelled.next_states().is_empty());
    }

    #[test]
    fn approval_cannot_be_skipped() {
        assert!(!PendingApproval.can_transition(InProgress));
        assert!(PendingApproval.can_transition(Scheduled));
    }

    #[test]
    fn completion_requires_work_to_start() {
        let err = Scheduled.validate_transition(Completed).unwrap_err();
        assert_eq!(err.entity, "MaintenanceVisit");
        assert_eq!(err.from, "Scheduled");
        assert_eq!(err.to, "Completed");
    }

    #[test]
    fn unknown_status_names_have_no_successors() {
        assert!(VisitStatus::next_states_of("Exploded").is_empty());
        assert_eq!(
            VisitStatus::next_states_of("Rescheduled"),
            &[VisitStatus::Scheduled]
        );
    }

    #[test]
    fn initial_status_depends_on_roles() {
        assert_eq!(
            VisitStatus::initial_for_roles(&["erp", "erp_customer"]),
            PendingApproval
        );
        assert_eq!(
            VisitStatus::initial_for_roles(&["erp", "erp_maintenance_manager"]),
            Scheduled
        );
        assert_eq!(VisitStatus::initial_for_roles::<&str>(&[]), PendingApproval);
    }

    #[test]
    fn statuses_roundtrip_through_names() {
        for status in VisitStatus::ALL {
            assert_eq!(status.as_str().parse::<VisitStatus>().unwrap(), *status);
        }
        assert!("pending".parse::<VisitStatus>().is_err());
    }
}
