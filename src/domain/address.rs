//! Donor postal address
//!
//! The address is only ever persisted encrypted (see [`crate::codec::AddressCodec`]).
//! In its canonical form it always carries exactly these six keys; empty parts
//! are empty strings, never missing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured postal address of a donor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    /// Street name
    pub street_name: String,
    /// Street number
    pub street_number: String,
    /// Building ("bloc")
    pub building: String,
    /// Entrance ("scara")
    pub entrance: String,
    /// Floor ("etaj")
    pub floor: String,
    /// Apartment
    pub apartment: String,
}

impl Address {
    /// Creates an address with only street name and number
    pub fn new(street_name: impl Into<String>, street_number: impl Into<String>) -> Self {
        Self {
            street_name: street_name.into(),
            street_number: street_number.into(),
            ..Self::default()
        }
    }

    /// Sets the building
    pub fn with_building(mut self, building: impl Into<String>) -> Self {
        self.building = building.into();
        self
    }

    /// Sets the entrance
    pub fn with_entrance(mut self, entrance: impl Into<String>) -> Self {
        self.entrance = entrance.into();
        self
    }

    /// Sets the floor
    pub fn with_floor(mut self, floor: impl Into<String>) -> Self {
        self.floor = floor.into();
        self
    }

    /// Sets the apartment
    pub fn with_apartment(mut self, apartment: impl Into<String>) -> Self {
        self.apartment = apartment.into();
        self
    }

    /// True when every part is empty
    pub fn is_blank(&self) -> bool {
        self.street_name.is_empty()
            && self.street_number.is_empty()
            && self.building.is_empty()
            && self.entrance.is_empty()
            && self.floor.is_empty()
            && self.apartment.is_empty()
    }
}

/// Renders the address the way it is printed on the redirection form:
/// `Street 5, bl. A, sc. 1, et. 2, ap. 3`, omitting empty optional parts.
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.street_name, self.street_number)?;
        if !self.building.is_empty() {
            write!(f, ", bl. {}", self.building)?;
        }
        if !self.entrance.is_empty() {
            write!(f, ", sc. {}", self.entrance)?;
        }
        if !self.floor.is_empty() {
            write!(f, ", et. {}", self.floor)?;
        }
        if !self.apartment.is_empty() {
            write!(f, ", ap. {}", self.apartment)?;
        }
        Ok(())
    }
}
