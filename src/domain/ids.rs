//! Domain identifier types with validation
//!
//! Newtype wrappers over the relational primary keys. Keeping donor, cause and
//! NGO keys as distinct types prevents passing one where another is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Donor primary key
///
/// Donor keys are positive and ordered; batch jobs rely on ascending key order.
///
/// # Examples
///
/// ```
/// use donorvault::domain::ids::DonorId;
/// use std::str::FromStr;
///
/// let id = DonorId::from_str("42").unwrap();
/// assert_eq!(id.get(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DonorId(i64);

impl DonorId {
    /// Creates a new DonorId
    ///
    /// # Returns
    ///
    /// Returns `Err` if the key is not positive
    pub fn new(id: i64) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("Donor ID must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw key
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for DonorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DonorId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("Invalid donor ID '{s}': {e}"))?;
        Self::new(id)
    }
}

impl From<DonorId> for i64 {
    fn from(id: DonorId) -> Self {
        id.0
    }
}

/// Fundraising cause primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CauseId(i64);

impl CauseId {
    /// Creates a new CauseId
    pub fn new(id: i64) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("Cause ID must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw key
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CauseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// NGO primary key
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NgoId(i64);

impl NgoId {
    /// Creates a new NgoId
    pub fn new(id: i64) -> Result<Self, String> {
        if id <= 0 {
            return Err(format!("NGO ID must be positive, got {id}"));
        }
        Ok(Self(id))
    }

    /// Returns the raw key
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NgoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_donor_id_valid() {
        let id = DonorId::new(7).unwrap();
        assert_eq!(id.get(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_donor_id_rejects_non_positive() {
        assert!(DonorId::new(0).is_err());
        assert!(DonorId::new(-3).is_err());
    }

    #[test]
    fn test_donor_id_from_str() {
        assert_eq!(DonorId::from_str(" 15 ").unwrap().get(), 15);
        assert!(DonorId::from_str("abc").is_err());
    }

    #[test]
    fn test_donor_id_ordering() {
        let mut ids = vec![
            DonorId::new(3).unwrap(),
            DonorId::new(1).unwrap(),
            DonorId::new(2).unwrap(),
        ];
        ids.sort();
        assert_eq!(ids.iter().map(|i| i.get()).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_serde_transparent() {
        let id = CauseId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: CauseId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
    }
}
