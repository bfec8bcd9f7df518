//! Record categories.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string is not a known record category.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("record type must be \"feeding\" or \"diaper\" (got {0:?})")]
pub struct RecordKindError(pub String);

/// The category of a tracked event.
///
/// The category decides which sub-type fields of a record carry meaning:
/// `feedingType` and `amount` for feedings, `diaperType` for diapers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Feeding,
    Diaper,
}

impl RecordKind {
    /// The wire and storage spelling of this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feeding => "feeding",
            Self::Diaper => "diaper",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = RecordKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "feeding" => Ok(Self::Feeding),
            "diaper" => Ok(Self::Diaper),
            other => Err(RecordKindError(other.to_owned())),
        }
    }
}
