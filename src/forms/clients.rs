//! Client create/update bodies and the CSV bulk upload.

use std::io::Read;

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use serde::Deserialize;
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::types::{ClientAddress, ClientEmail, ClientName, HubId, PhoneNumber};
use crate::forms::{FormError, non_blank};

#[derive(Debug, Deserialize, Validate)]
/// Body of the create and update client endpoints.
pub struct ClientForm {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

/// Validated client attributes.
#[derive(Debug, Clone)]
pub struct ClientPayload {
    pub name: ClientName,
    pub email: Option<ClientEmail>,
    pub phone: Option<PhoneNumber>,
    pub address: Option<ClientAddress>,
}

impl ClientPayload {
    fn parse(
        name: String,
        email: Option<String>,
        phone: Option<String>,
        address: Option<String>,
    ) -> Result<Self, FormError> {
        Ok(Self {
            name: ClientName::new(name).map_err(|_| FormError::InvalidName)?,
            email: non_blank(email)
                .map(ClientEmail::new)
                .transpose()
                .map_err(|_| FormError::InvalidEmail)?,
            phone: non_blank(phone)
                .map(PhoneNumber::new)
                .transpose()
                .map_err(|_| FormError::InvalidPhoneNumber)?,
            address: non_blank(address)
                .map(ClientAddress::new)
                .transpose()
                .map_err(|_| FormError::InvalidAddress)?,
        })
    }

    pub fn into_new_client(self, hub_id: HubId) -> NewClient {
        NewClient::new(hub_id, self.name, self.email, self.phone, self.address)
    }

    pub fn into_update(self) -> UpdateClient {
        UpdateClient {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
        }
    }
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Self::parse(form.name, form.email, form.phone, form.address)
    }
}

#[derive(MultipartForm)]
/// CSV upload with `name,email,phone,address` columns.
pub struct UploadClientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

#[derive(Debug, Deserialize)]
struct ClientCsvRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    address: Option<String>,
}

/// Parses every CSV row into a client payload. The first malformed row
/// aborts the upload and is reported with its 1-based data row number.
pub fn parse_clients_csv<R: Read>(reader: R) -> Result<Vec<ClientPayload>, FormError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    rdr.deserialize::<ClientCsvRow>()
        .enumerate()
        .map(|(index, record)| {
            let row = index + 1;
            let record = record.map_err(|err| FormError::Csv(err.to_string()))?;
            ClientPayload::parse(record.name, record.email, record.phone, record.address).map_err(
                |err| FormError::Row {
                    row,
                    source: Box::new(err),
                },
            )
        })
        .collect()
}
