//! Outcomes of personal data removal

use crate::domain::{CauseId, DonorId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What happened to the signed document blob
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "error")]
pub enum DocumentRemoval {
    /// The donor had no signed document
    NotPresent,
    /// The blob was deleted
    Deleted,
    /// The reference pointed at a blob that no longer exists
    Missing,
    /// Deleting the blob failed; the reference is gone regardless
    Failed(String),
}

impl DocumentRemoval {
    /// True when a blob was referenced and is now gone
    pub fn removed(&self) -> bool {
        matches!(self, DocumentRemoval::Deleted | DocumentRemoval::Missing)
    }
}

/// Details of a committed anonymization
#[derive(Debug, Clone, Serialize)]
pub struct AnonymizationReport {
    pub donor_id: DonorId,
    pub cause_id: Option<CauseId>,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Attempts needed, including the one that committed
    pub attempts: u32,
    pub document: DocumentRemoval,
}

/// Result of [`AnonymizationEngine::remove_personal_data`]
///
/// [`AnonymizationEngine::remove_personal_data`]: crate::anonymization::AnonymizationEngine::remove_personal_data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum AnonymizationOutcome {
    /// Personal data was removed by this call
    Anonymized(AnonymizationReport),
    /// An earlier call already removed it; nothing was written
    AlreadyAnonymized {
        donor_id: DonorId,
        removed_at: DateTime<Utc>,
    },
    /// Dry run: the donor would have been anonymized
    WouldAnonymize { donor_id: DonorId },
}

impl AnonymizationOutcome {
    pub fn donor_id(&self) -> DonorId {
        match self {
            AnonymizationOutcome::Anonymized(report) => report.donor_id,
            AnonymizationOutcome::AlreadyAnonymized { donor_id, .. }
            | AnonymizationOutcome::WouldAnonymize { donor_id } => *donor_id,
        }
    }

    pub fn is_anonymized(&self) -> bool {
        matches!(self, AnonymizationOutcome::Anonymized(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_removed() {
        assert!(DocumentRemoval::Deleted.removed());
        assert!(DocumentRemoval::Missing.removed());
        assert!(!DocumentRemoval::NotPresent.removed());
        assert!(!DocumentRemoval::Failed("denied".to_string()).removed());
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let outcome = AnonymizationOutcome::WouldAnonymize {
            donor_id: DonorId::new(3).unwrap(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "would_anonymize");
        assert_eq!(json["donor_id"], 3);
        assert_eq!(outcome.donor_id().get(), 3);
    }
}
