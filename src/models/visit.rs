//! Diesel models for maintenance visits and their status history.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{
    ClientId, EmployeeId, EquipmentName, HubId, LegacyCode, SanitizedText, TypeConstraintError,
    VisitId, VisitStatusChangeId,
};
use crate::domain::visit::{
    MaintenanceVisit as DomainMaintenanceVisit, NewMaintenanceVisit as DomainNewMaintenanceVisit,
    NewVisitStatusChange as DomainNewVisitStatusChange,
    VisitStatusChange as DomainVisitStatusChange,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::maintenance_visits)]
pub struct MaintenanceVisit {
    pub id: i32,
    pub hub_id: i32,
    pub client_id: i32,
    pub engineer_id: Option<i32>,
    pub equipment: String,
    pub description: Option<String>,
    pub status: String,
    pub scheduled_at: NaiveDateTime,
    pub reminder_sent: bool,
    pub legacy_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::maintenance_visits)]
pub struct NewMaintenanceVisit<'a> {
    pub hub_id: i32,
    pub client_id: i32,
    pub engineer_id: Option<i32>,
    pub equipment: &'a str,
    pub description: Option<&'a str>,
    pub status: &'static str,
    pub scheduled_at: NaiveDateTime,
    pub legacy_code: Option<&'a str>,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::visit_status_changes)]
pub struct VisitStatusChange {
    pub id: i32,
    pub visit_id: i32,
    pub from_status: String,
    pub to_status: String,
    pub employee_id: i32,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::visit_status_changes)]
pub struct NewVisitStatusChange<'a> {
    pub visit_id: i32,
    pub from_status: &'static str,
    pub to_status: &'static str,
    pub employee_id: i32,
    pub note: Option<&'a str>,
}

impl TryFrom<MaintenanceVisit> for DomainMaintenanceVisit {
    type Error = TypeConstraintError;

    fn try_from(visit: MaintenanceVisit) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VisitId::new(visit.id)?,
            hub_id: HubId::new(visit.hub_id)?,
            client_id: ClientId::new(visit.client_id)?,
            engineer_id: visit.engineer_id.map(EmployeeId::new).transpose()?,
            equipment: EquipmentName::new(visit.equipment)?,
            description: visit.description.map(SanitizedText::new).transpose()?,
            status: visit.status.parse()?,
            scheduled_at: visit.scheduled_at,
            reminder_sent: visit.reminder_sent,
            legacy_code: visit.legacy_code.map(LegacyCode::new).transpose()?,
            created_at: visit.created_at,
            updated_at: visit.updated_at,
        })
    }
}

impl TryFrom<VisitStatusChange> for DomainVisitStatusChange {
    type Error = TypeConstraintError;

    fn try_from(change: VisitStatusChange) -> Result<Self, Self::Error> {
        Ok(Self {
            id: VisitStatusChangeId::new(change.id)?,
            visit_id: VisitId::new(change.visit_id)?,
            from_status: change.from_status.parse()?,
            to_status: change.to_status.parse()?,
            employee_id: EmployeeId::new(change.employee_id)?,
            note: change.note.map(SanitizedText::new).transpose()?,
            created_at: change.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewMaintenanceVisit> for NewMaintenanceVisit<'a> {
    fn from(visit: &'a DomainNewMaintenanceVisit) -> Self {
        Self {
            hub_id: visit.hub_id.get(),
            client_id: visit.client_id.get(),
            engineer_id: visit.engineer_id.map(EmployeeId::get),
            equipment: visit.equipment.as_str(),
            description: visit.description.as_ref().map(SanitizedText::as_str),
            status: visit.status.as_str(),
            scheduled_at: visit.scheduled_at,
            legacy_code: visit.legacy_code.as_ref().map(LegacyCode::as_str),
        }
    }
}

impl<'a> From<&'a DomainNewVisitStatusChange> for NewVisitStatusChange<'a> {
    fn from(change: &'a DomainNewVisitStatusChange) -> Self {
        Self {
            visit_id: change.visit_id.get(),
            from_status: change.from_status.as_str(),
            to_status: change.to_status.as_str(),
            employee_id: change.employee_id.get(),
            note: change.note.as_ref().map(SanitizedText::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::visit::VisitStatus;

    fn db_visit(status: &str) -> MaintenanceVisit {
        let now = Utc::now().naive_utc();
        MaintenanceVisit {
            id: 3,
            hub_id: 1,
            client_id: 2,
            engineer_id: None,
            equipment: "Ventilator V60".to_string(),
            description: None,
            status: status.to_string(),
            scheduled_at: now,
            reminder_sent: false,
            legacy_code: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn stored_status_is_parsed() {
        let visit = DomainMaintenanceVisit::try_from(db_visit("NeedsSpareParts")).unwrap();
        assert_eq!(visit.status, VisitStatus::NeedsSpareParts);
    }

    #[test]
    fn unknown_stored_status_is_an_error() {
        assert!(DomainMaintenanceVisit::try_from(db_visit("Lost")).is_err());
    }
}
