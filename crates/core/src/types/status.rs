//! Status enums for the order lifecycle.

use serde::{Deserialize, Serialize};

/// Where an order draft stands in checkout.
///
/// Only the editing/valid half of the lifecycle is state; submission and
/// completion are reported as events by whoever performs the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrderPhase {
    /// Fields are being filled in, or the last validation failed.
    #[default]
    Editing,
    /// The last validation pass reported no errors.
    Valid,
}

impl OrderPhase {
    /// Phase implied by a validation outcome.
    #[must_use]
    pub const fn from_validity(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Editing }
    }
}

impl std::fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Editing => write!(f, "editing"),
            Self::Valid => write!(f, "valid"),
        }
    }
}
