//! Donor domain model
//!
//! A donor is a person who redirected part of their income tax to a cause.
//! The record carries personal data (name, national id, address, contact,
//! geolocation, signed form) next to statistical fields (city, county, flags)
//! that survive anonymization.

use super::address::Address;
use super::ids::{CauseId, DonorId, NgoId};
use super::result::Result;
use crate::codec::{hash_id_secret, AddressCodec, NationalIdCodec};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source of the income the redirection applies to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncomeType {
    #[default]
    Wage,
    Pension,
    /// Stored as an empty string, as older removal runs left it
    #[serde(rename = "")]
    Unspecified,
}

impl IncomeType {
    pub fn as_str(self) -> &'static str {
        match self {
            IncomeType::Wage => "wage",
            IncomeType::Pension => "pension",
            IncomeType::Unspecified => "",
        }
    }
}

impl fmt::Display for IncomeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncomeType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "wage" => Ok(IncomeType::Wage),
            "pension" => Ok(IncomeType::Pension),
            "" => Ok(IncomeType::Unspecified),
            other => Err(format!("Unknown income type '{other}'")),
        }
    }
}

/// A donor record
///
/// Encrypted fields hold tokens produced by the codecs in [`crate::codec`];
/// use the accessor methods to read or replace their plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub ngo_id: Option<NgoId>,
    pub cause_id: Option<CauseId>,

    pub first_name: String,
    pub last_name: String,
    pub initial: String,

    /// Encrypted national id, or empty
    pub encrypted_national_id: String,
    /// Encrypted canonical address, or empty
    pub encrypted_address: String,

    pub city: String,
    pub county: String,

    pub phone: String,
    pub email: String,

    pub is_anonymous: bool,
    pub anaf_gdpr: bool,
    pub income_type: IncomeType,
    pub two_years: bool,

    /// Geolocation data derived from the submitting IP address
    pub geoip: serde_json::Map<String, serde_json::Value>,

    /// Blob-store name of the signed redirection form, or empty
    pub document_file: String,
    pub has_signed: bool,

    pub created_at: DateTime<Utc>,
    pub personal_data_removal_started_at: Option<DateTime<Utc>>,
    pub personal_data_removed_at: Option<DateTime<Utc>>,

    /// Optimistic concurrency counter, bumped by every persisted write
    pub version: i64,
}

impl Donor {
    /// Creates a new builder for constructing a Donor
    pub fn builder() -> DonorBuilder {
        DonorBuilder::default()
    }

    /// Decrypt the national id
    pub fn national_id(&self, codec: &NationalIdCodec) -> Result<String> {
        codec.decrypt(&self.encrypted_national_id)
    }

    /// Encrypt and store a national id
    pub fn set_national_id(&mut self, codec: &NationalIdCodec, national_id: &str) -> Result<()> {
        self.encrypted_national_id = codec.encrypt(national_id)?;
        Ok(())
    }

    /// Decrypt the address; `None` when no address is stored
    pub fn address(&self, codec: &AddressCodec) -> Result<Option<Address>> {
        codec.decrypt(&self.encrypted_address)
    }

    /// Encrypt and store an address, or clear it
    pub fn set_address(&mut self, codec: &AddressCodec, address: Option<&Address>) -> Result<()> {
        self.encrypted_address = match address {
            Some(address) => codec.encrypt(address)?,
            None => String::new(),
        };
        Ok(())
    }

    /// Address as printed on the redirection form, or empty
    pub fn address_string(&self, codec: &AddressCodec) -> Result<String> {
        Ok(self
            .address(codec)?
            .map(|address| address.to_string())
            .unwrap_or_default())
    }

    /// Full name as printed on the form
    pub fn full_name(&self) -> String {
        [
            self.last_name.as_str(),
            self.initial.as_str(),
            self.first_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// True once personal data has been removed
    pub fn is_anonymized(&self) -> bool {
        self.personal_data_removed_at.is_some()
    }

    /// True when either encrypted field holds a token
    pub fn has_encrypted_fields(&self) -> bool {
        !self.encrypted_national_id.is_empty() || !self.encrypted_address.is_empty()
    }

    /// Clear every personal field and set both removal markers
    ///
    /// Returns the name of the signed document that was dereferenced, if any,
    /// so the caller can delete the blob. Does nothing and returns `None` when
    /// the donor is already anonymized.
    pub fn clear_personal_data(
        &mut self,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    ) -> Option<String> {
        if self.is_anonymized() {
            return None;
        }

        self.personal_data_removal_started_at = Some(started_at);

        self.first_name.clear();
        self.last_name.clear();
        self.initial.clear();
        self.encrypted_national_id.clear();
        self.encrypted_address.clear();
        self.phone.clear();
        self.email.clear();
        self.geoip.clear();
        let document = std::mem::take(&mut self.document_file);

        self.personal_data_removed_at = Some(completed_at);

        (!document.is_empty()).then_some(document)
    }
}

/// Blob name for a donor's signed form
///
/// `donation-forms/<year>/c-<cause>-<hash>/<donor>_<hash>_<filename>`, where
/// the hashes are keyed so the path does not expose enumerable identifiers.
pub fn document_path(
    donor_id: DonorId,
    cause_id: Option<CauseId>,
    created_at: DateTime<Utc>,
    filename: &str,
    secret: &str,
) -> String {
    let cause = cause_id.map(CauseId::get).unwrap_or_default();
    let cause_hash = hash_id_secret("cause", cause, secret);
    let donor_hash = hash_id_secret("donor", donor_id.get(), secret);
    format!(
        "donation-forms/{}/c-{}-{}/{}_{}_{}",
        created_at.year(),
        cause,
        cause_hash,
        donor_id,
        donor_hash,
        filename
    )
}

/// Builder for constructing Donor instances
#[derive(Debug, Default)]
pub struct DonorBuilder {
    id: Option<DonorId>,
    ngo_id: Option<NgoId>,
    cause_id: Option<CauseId>,
    first_name: String,
    last_name: String,
    initial: String,
    encrypted_national_id: String,
    encrypted_address: String,
    city: String,
    county: String,
    phone: String,
    email: String,
    income_type: IncomeType,
    geoip: serde_json::Map<String, serde_json::Value>,
    document_file: String,
    created_at: Option<DateTime<Utc>>,
}

impl DonorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: DonorId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn ngo_id(mut self, ngo_id: NgoId) -> Self {
        self.ngo_id = Some(ngo_id);
        self
    }

    pub fn cause_id(mut self, cause_id: CauseId) -> Self {
        self.cause_id = Some(cause_id);
        self
    }

    /// Sets first name, last name and initial
    pub fn name(
        mut self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        initial: impl Into<String>,
    ) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self.initial = initial.into();
        self
    }

    pub fn location(mut self, city: impl Into<String>, county: impl Into<String>) -> Self {
        self.city = city.into();
        self.county = county.into();
        self
    }

    pub fn contact(mut self, phone: impl Into<String>, email: impl Into<String>) -> Self {
        self.phone = phone.into();
        self.email = email.into();
        self
    }

    /// Sets an already encrypted national id
    pub fn encrypted_national_id(mut self, token: impl Into<String>) -> Self {
        self.encrypted_national_id = token.into();
        self
    }

    /// Sets an already encrypted address
    pub fn encrypted_address(mut self, token: impl Into<String>) -> Self {
        self.encrypted_address = token.into();
        self
    }

    /// Encrypts and sets the national id
    pub fn national_id(mut self, codec: &NationalIdCodec, national_id: &str) -> Result<Self> {
        self.encrypted_national_id = codec.encrypt(national_id)?;
        Ok(self)
    }

    /// Encrypts and sets the address
    pub fn address(mut self, codec: &AddressCodec, address: &Address) -> Result<Self> {
        self.encrypted_address = codec.encrypt(address)?;
        Ok(self)
    }

    pub fn income_type(mut self, income_type: IncomeType) -> Self {
        self.income_type = income_type;
        self
    }

    pub fn geoip(mut self, geoip: serde_json::Map<String, serde_json::Value>) -> Self {
        self.geoip = geoip;
        self
    }

    pub fn document_file(mut self, name: impl Into<String>) -> Self {
        self.document_file = name.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Builds the Donor
    ///
    /// # Errors
    ///
    /// Returns an error if the id is missing. `created_at` defaults to now.
    pub fn build(self) -> std::result::Result<Donor, String> {
        let has_signed = !self.document_file.is_empty();
        Ok(Donor {
            id: self.id.ok_or("id is required")?,
            ngo_id: self.ngo_id,
            cause_id: self.cause_id,
            first_name: self.first_name,
            last_name: self.last_name,
            initial: self.initial,
            encrypted_national_id: self.encrypted_national_id,
            encrypted_address: self.encrypted_address,
            city: self.city,
            county: self.county,
            phone: self.phone,
            email: self.email,
            is_anonymous: false,
            anaf_gdpr: false,
            income_type: self.income_type,
            two_years: false,
            geoip: self.geoip,
            document_file: self.document_file,
            has_signed,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            personal_data_removal_started_at: None,
            personal_data_removed_at: None,
            version: 0,
        })
    }
}
