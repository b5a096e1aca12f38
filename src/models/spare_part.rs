use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::spare_part::{
    NewSparePartRequest as DomainNewSparePartRequest, SparePartRequest as DomainSparePartRequest,
};
use crate::domain::types::{
    EmployeeId, PartName, Quantity, SparePartRequestId, TypeConstraintError, VisitId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::spare_part_requests)]
pub struct SparePartRequest {
    pub id: i32,
    pub visit_id: i32,
    pub part_name: String,
    pub quantity: i32,
    pub status: String,
    pub requested_by: i32,
    pub decided_by: Option<i32>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::spare_part_requests)]
pub struct NewSparePartRequest<'a> {
    pub visit_id: i32,
    pub part_name: &'a str,
    pub quantity: i32,
    pub status: &'static str,
    pub requested_by: i32,
}

impl TryFrom<SparePartRequest> for DomainSparePartRequest {
    type Error = TypeConstraintError;

    fn try_from(request: SparePartRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: SparePartRequestId::new(request.id)?,
            visit_id: VisitId::new(request.visit_id)?,
            part_name: PartName::new(request.part_name)?,
            quantity: Quantity::new(request.quantity)?,
            status: request.status.parse()?,
            requested_by: EmployeeId::new(request.requested_by)?,
            decided_by: request.decided_by.map(EmployeeId::new).transpose()?,
            created_at: request.created_at,
            updated_at: request.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewSparePartRequest> for NewSparePartRequest<'a> {
    fn from(request: &'a DomainNewSparePartRequest) -> Self {
        Self {
            visit_id: request.visit_id.get(),
            part_name: request.part_name.as_str(),
            quantity: request.quantity.get(),
            status: crate::domain::spare_part::SparePartStatus::Pending.as_str(),
            requested_by: request.requested_by.get(),
        }
    }
}
