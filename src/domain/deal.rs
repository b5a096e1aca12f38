//! Deals and their two-step approval chain.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::lifecycle::Lifecycle;
use crate::domain::types::{
    ClientId, DealId, DealTitle, EmployeeId, HubId, Money, OfferId, SanitizedText,
    TypeConstraintError,
};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DealStatus {
    PendingManagerApproval,
    PendingAdminApproval,
    Approved,
    Rejected,
    Closed,
}

impl DealStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DealStatus::PendingManagerApproval => "PendingManagerApproval",
            DealStatus::PendingAdminApproval => "PendingAdminApproval",
            DealStatus::Approved => "Approved",
            DealStatus::Rejected => "Rejected",
            DealStatus::Closed => "Closed",
        }
    }

    /// Role allowed to approve or reject the deal at its current step.
    pub fn approver_role(self) -> Option<&'static str> {
        match self {
            DealStatus::PendingManagerApproval => Some(crate::SALES_MANAGER_ROLE),
            DealStatus::PendingAdminApproval => Some(crate::SERVICE_ADMIN_ROLE),
            _ => None,
        }
    }

    /// Status reached when the current approval step succeeds.
    pub fn approved(self) -> Option<DealStatus> {
        match self {
            DealStatus::PendingManagerApproval => Some(DealStatus::PendingAdminApproval),
            DealStatus::PendingAdminApproval => Some(DealStatus::Approved),
            _ => None,
        }
    }
}

impl Lifecycle for DealStatus {
    const ENTITY: &'static str = "Deal";

    const ALL: &'static [Self] = &[
        DealStatus::PendingManagerApproval,
        DealStatus::PendingAdminApproval,
        DealStatus::Approved,
        DealStatus::Rejected,
        DealStatus::Closed,
    ];

    fn next_states(self) -> &'static [Self] {
        match self {
            DealStatus::PendingManagerApproval => {
                &[DealStatus::PendingAdminApproval, DealStatus::Rejected]
            }
            DealStatus::PendingAdminApproval => &[DealStatus::Approved, DealStatus::Rejected],
            DealStatus::Approved => &[DealStatus::Closed],
            DealStatus::Rejected | DealStatus::Closed => &[],
        }
    }
}

impl Display for DealStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DealStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DealStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("deal status {s}")))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Deal {
    pub id: DealId,
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub offer_id: Option<OfferId>,
    pub salesman_id: EmployeeId,
    pub title: DealTitle,
    pub total: Money,
    pub status: DealStatus,
    pub rejection_reason: Option<SanitizedText>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewDeal {
    pub hub_id: HubId,
    pub client_id: ClientId,
    pub offer_id: Option<OfferId>,
    pub salesman_id: EmployeeId,
    pub title: DealTitle,
    pub total: Money,
}
