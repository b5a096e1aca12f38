use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{
    ClientAddress, ClientEmail, ClientId, ClientName, HubId, LegacyCode, PhoneNumber, PublicId,
    TypeConstraintError,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub public_id: Vec<u8>,
    pub hub_id: i32,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub legacy_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub public_id: &'a [u8],
    pub hub_id: i32,
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub legacy_code: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub name: &'a str,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub address: Option<&'a str>,
    pub updated_at: NaiveDateTime,
}

#[derive(Identifiable, Queryable, Insertable)]
#[diesel(table_name = crate::schema::client_employee)]
#[diesel(primary_key(client_id, employee_id))]
/// Assignment of a client to an employee.
pub struct ClientEmployee {
    pub client_id: i32,
    pub employee_id: i32,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::new(client.id)?,
            public_id: PublicId::from_bytes(&client.public_id)?,
            hub_id: HubId::new(client.hub_id)?,
            name: ClientName::new(client.name)?,
            email: client.email.map(ClientEmail::new).transpose()?,
            phone: client
                .phone
                .as_deref()
                .map(PhoneNumber::new)
                .transpose()?,
            address: client.address.map(ClientAddress::new).transpose()?,
            legacy_code: client.legacy_code.map(LegacyCode::new).transpose()?,
            created_at: client.created_at,
            updated_at: client.updated_at,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            public_id: client.public_id.as_bytes(),
            hub_id: client.hub_id.get(),
            name: client.name.as_str(),
            email: client.email.as_ref().map(ClientEmail::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            address: client.address.as_ref().map(ClientAddress::as_str),
            legacy_code: client.legacy_code.as_ref().map(LegacyCode::as_str),
        }
    }
}

impl<'a> UpdateClient<'a> {
    pub fn from_domain(client: &'a DomainUpdateClient, updated_at: NaiveDateTime) -> Self {
        Self {
            name: client.name.as_str(),
            email: client.email.as_ref().map(ClientEmail::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            address: client.address.as_ref().map(ClientAddress::as_str),
            updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_domain_new() -> DomainNewClient {
        DomainNewClient::new(
            HubId::new(1).unwrap(),
            ClientName::new("City Hospital").unwrap(),
            Some(ClientEmail::new("procurement@city-hospital.org").unwrap()),
            Some(PhoneNumber::new("+14155552671").unwrap()),
            None,
        )
    }

    #[test]
    fn from_domain_new_creates_newclient() {
        let domain = sample_domain_new();
        let new: NewClient = (&domain).into();
        assert_eq!(new.hub_id, 1);
        assert_eq!(new.name, "City Hospital");
        assert_eq!(new.email, Some("procurement@city-hospital.org"));
        assert_eq!(new.phone, Some("+14155552671"));
        assert_eq!(new.address, None);
        assert_eq!(new.public_id, domain.public_id.as_bytes());
    }

    #[test]
    fn client_into_domain() {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let public_id = PublicId::new();
        let db_client = Client {
            id: 1,
            public_id: public_id.as_bytes().to_vec(),
            hub_id: 2,
            name: "n".to_string(),
            email: Some("E@x.org".to_string()),
            phone: None,
            address: Some("a".to_string()),
            legacy_code: Some("TBS-C-4".to_string()),
            created_at: now,
            updated_at: now,
        };
        let domain = DomainClient::try_from(db_client).unwrap();
        assert_eq!(domain.id.get(), 1);
        assert_eq!(domain.public_id, public_id);
        assert_eq!(domain.hub_id.get(), 2);
        assert_eq!(domain.email.unwrap().as_str(), "e@x.org");
        assert_eq!(domain.legacy_code.unwrap().as_str(), "TBS-C-4");
    }

    #[test]
    fn corrupted_rows_are_rejected() {
        let now: NaiveDateTime = Utc::now().naive_utc();
        let db_client = Client {
            id: 1,
            public_id: vec![1, 2, 3],
            hub_id: 2,
            name: "n".to_string(),
            email: None,
            phone: None,
            address: None,
            legacy_code: None,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(
            DomainClient::try_from(db_client),
            Err(TypeConstraintError::InvalidUuid)
        );
    }
}
