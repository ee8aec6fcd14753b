//! Row mapping for the `donors` table

use crate::domain::{CauseId, Donor, DonorId, IncomeType, NgoId, Result, VaultError};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio_postgres::Row;

/// Column list shared by every donor `SELECT`
pub const DONOR_COLUMNS: &str = "id, ngo_id, cause_id, first_name, last_name, initial, \
    encrypted_cnp, encrypted_address, city, county, phone, email, is_anonymous, anaf_gdpr, \
    income_type, two_years, geoip, pdf_file, has_signed, date_created, \
    personal_data_removal_started_at, personal_data_removed_at, version";

/// Convert a `donors` row into the domain model
///
/// # Errors
///
/// Returns [`VaultError::Database`] when a column is missing or holds a value
/// the domain types reject.
pub fn donor_from_row(row: &Row) -> Result<Donor> {
    let id: i64 = get(row, "id")?;
    let ngo_id: Option<i64> = get(row, "ngo_id")?;
    let cause_id: Option<i64> = get(row, "cause_id")?;
    let income_type: String = get(row, "income_type")?;
    let geoip: Value = get(row, "geoip")?;

    Ok(Donor {
        id: DonorId::new(id).map_err(VaultError::Database)?,
        ngo_id: ngo_id.map(NgoId::new).transpose().map_err(VaultError::Database)?,
        cause_id: cause_id
            .map(CauseId::new)
            .transpose()
            .map_err(VaultError::Database)?,
        first_name: get(row, "first_name")?,
        last_name: get(row, "last_name")?,
        initial: get(row, "initial")?,
        encrypted_national_id: get(row, "encrypted_cnp")?,
        encrypted_address: get(row, "encrypted_address")?,
        city: get(row, "city")?,
        county: get(row, "county")?,
        phone: get(row, "phone")?,
        email: get(row, "email")?,
        is_anonymous: get(row, "is_anonymous")?,
        anaf_gdpr: get(row, "anaf_gdpr")?,
        income_type: income_type_from_column(id, &income_type),
        two_years: get(row, "two_years")?,
        geoip: match geoip {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        },
        document_file: get(row, "pdf_file")?,
        has_signed: get(row, "has_signed")?,
        created_at: get::<DateTime<Utc>>(row, "date_created")?,
        personal_data_removal_started_at: get(row, "personal_data_removal_started_at")?,
        personal_data_removed_at: get(row, "personal_data_removed_at")?,
        version: get(row, "version")?,
    })
}

/// Unrecognized values read as unspecified instead of failing the whole row
fn income_type_from_column(donor_id: i64, raw: &str) -> IncomeType {
    raw.parse().unwrap_or_else(|_| {
        tracing::debug!(donor_id, income_type = raw, "Unknown income type");
        IncomeType::Unspecified
    })
}

fn get<'a, T>(row: &'a Row, column: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(column)
        .map_err(|e| VaultError::Database(format!("Failed to read column {column}: {e}")))
}

/// Geolocation map as a JSONB parameter
pub fn geoip_value(donor: &Donor) -> Value {
    Value::Object(donor.geoip.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_cover_model() {
        for column in [
            "encrypted_cnp",
            "encrypted_address",
            "pdf_file",
            "personal_data_removed_at",
            "version",
        ] {
            assert!(DONOR_COLUMNS.contains(column), "missing {column}");
        }
    }

    #[test]
    fn test_geoip_value_is_object() {
        let donor = Donor::builder()
            .id(DonorId::new(1).unwrap())
            .build()
            .unwrap();
        assert_eq!(geoip_value(&donor), Value::Object(serde_json::Map::new()));
    }

    #[test]
    fn test_income_type_column() {
        assert_eq!(income_type_from_column(1, "pension"), IncomeType::Pension);
        assert_eq!(income_type_from_column(1, ""), IncomeType::Unspecified);
        assert_eq!(income_type_from_column(1, "salary"), IncomeType::Unspecified);
        assert_eq!(IncomeType::Unspecified.as_str(), "");
    }
}
