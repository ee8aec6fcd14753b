//! Result type alias for donorvault

use super::errors::VaultError;

/// Result type alias for donorvault operations
///
/// # Examples
///
/// ```
/// use donorvault::domain::result::Result;
/// use donorvault::domain::errors::VaultError;
///
/// fn failing_function() -> Result<()> {
///     Err(VaultError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, VaultError>;
