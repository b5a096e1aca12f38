//! Visit scheduling bodies.

use chrono::NaiveDateTime;
use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{ClientId, EmployeeId, EquipmentName, SanitizedText};
use crate::domain::visit::VisitStatus;
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVisitForm {
    pub client_id: i32,
    #[validate(length(min = 1, max = 255))]
    pub equipment: String,
    #[serde(default)]
    pub description: Option<String>,
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub engineer_id: Option<i32>,
}

pub struct CreateVisitPayload {
    pub client_id: ClientId,
    pub equipment: EquipmentName,
    pub description: Option<SanitizedText>,
    pub scheduled_at: NaiveDateTime,
    pub engineer_id: Option<EmployeeId>,
}

fn parse_note(note: Option<String>) -> Result<Option<SanitizedText>, FormError> {
    non_blank(note)
        .map(SanitizedText::new)
        .transpose()
        .map_err(|_| FormError::InvalidText)
}

impl TryFrom<CreateVisitForm> for CreateVisitPayload {
    type Error = FormError;

    fn try_from(form: CreateVisitForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(|_| FormError::InvalidId("client"))?,
            equipment: EquipmentName::new(form.equipment).map_err(|_| FormError::InvalidName)?,
            description: parse_note(form.description)?,
            scheduled_at: form.scheduled_at,
            engineer_id: form
                .engineer_id
                .map(EmployeeId::new)
                .transpose()
                .map_err(|_| FormError::InvalidId("engineer"))?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeVisitStatusForm {
    pub status: String,
    #[serde(default)]
    pub note: Option<String>,
}

pub struct ChangeVisitStatusPayload {
    pub status: VisitStatus,
    pub note: Option<SanitizedText>,
}

impl TryFrom<ChangeVisitStatusForm> for ChangeVisitStatusPayload {
    type Error = FormError;

    fn try_from(form: ChangeVisitStatusForm) -> Result<Self, Self::Error> {
        let status = form
            .status
            .trim()
            .parse::<VisitStatus>()
            .map_err(|_| FormError::InvalidStatus(form.status.clone()))?;
        Ok(Self {
            status,
            note: parse_note(form.note)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RescheduleVisitForm {
    pub scheduled_at: NaiveDateTime,
    #[serde(default)]
    pub note: Option<String>,
}

pub struct RescheduleVisitPayload {
    pub scheduled_at: NaiveDateTime,
    pub note: Option<SanitizedText>,
}

impl TryFrom<RescheduleVisitForm> for RescheduleVisitPayload {
    type Error = FormError;

    fn try_from(form: RescheduleVisitForm) -> Result<Self, Self::Error> {
        Ok(Self {
            scheduled_at: form.scheduled_at,
            note: parse_note(form.note)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignEngineerForm {
    pub engineer_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names_are_parsed() {
        let payload = ChangeVisitStatusPayload::try_from(ChangeVisitStatusForm {
            status: " InProgress ".to_string(),
            note: Some("  ".to_string()),
        })
        .unwrap();
        assert_eq!(payload.status, VisitStatus::InProgress);
        assert!(payload.note.is_none());
    }

    #[test]
    fn unknown_status_is_a_form_error() {
        let result = ChangeVisitStatusPayload::try_from(ChangeVisitStatusForm {
            status: "Exploded".to_string(),
            note: None,
        });
        assert!(matches!(result, Err(FormError::InvalidStatus(s)) if s == "Exploded"));
    }

    #[test]
    fn create_form_requires_positive_client() {
        let form: CreateVisitForm = serde_json::from_str(
            r#"{"client_id":0,"equipment":"MRI 3T","scheduled_at":"2025-03-01T09:00:00"}"#,
        )
        .unwrap();
        assert!(matches!(
            CreateVisitPayload::try_from(form),
            Err(FormError::InvalidId("client"))
        ));
    }
}
