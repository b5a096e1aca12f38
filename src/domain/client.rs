use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    ClientAddress, ClientEmail, ClientId, ClientName, HubId, LegacyCode, PhoneNumber, PublicId,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub public_id: PublicId,
    pub hub_id: HubId,
    pub name: ClientName,
    pub email: Option<ClientEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<ClientAddress>,
    /// Set for clients imported from the legacy TBS database.
    pub legacy_code: Option<LegacyCode>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewClient {
    pub public_id: PublicId,
    pub hub_id: HubId,
    pub name: ClientName,
    pub email: Option<ClientEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<ClientAddress>,
    pub legacy_code: Option<LegacyCode>,
}

impl NewClient {
    #[must_use]
    pub fn new(
        hub_id: HubId,
        name: ClientName,
        email: Option<ClientEmail>,
        phone: Option<PhoneNumber>,
        address: Option<ClientAddress>,
    ) -> Self {
        Self {
            public_id: PublicId::new(),
            hub_id,
            name,
            email,
            phone,
            address,
            legacy_code: None,
        }
    }

    #[must_use]
    pub fn with_legacy_code(mut self, code: LegacyCode) -> Self {
        self.legacy_code = Some(code);
        self
    }
}

#[derive(Clone, Debug)]
pub struct UpdateClient {
    pub name: ClientName,
    pub email: Option<ClientEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<ClientAddress>,
}
