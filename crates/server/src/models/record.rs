//! Feeding and diaper records.
//!
//! A record is keyed by its owner plus the numeric ID chosen by the client.
//! The upsert rules live here so every store applies them the same way.

use serde::{Deserialize, Serialize};

use babytrack_core::{ClientRecordId, RecordKind, UserId};

/// A stored event belonging to one user.
///
/// Serialized in the camelCase shape the client app expects. Absent optional
/// fields are omitted rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Owning user. Never changes after creation.
    #[serde(rename = "user")]
    pub owner: UserId,
    /// Client-supplied ID, unique within the owner's records.
    pub id: ClientRecordId,
    pub date: String,
    pub time: String,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diaper_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Feeding volume. Only meaningful for feedings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    pub timestamp: i64,
}

/// Everything an upsert writes, apart from the (owner, id) key.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    pub date: String,
    pub time: String,
    pub kind: RecordKind,
    pub feeding_type: Option<String>,
    pub diaper_type: Option<String>,
    pub details: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: i64,
}

impl RecordFields {
    /// Feeding sub-type and amount, if this is a feeding.
    #[must_use]
    pub fn feeding_parts(&self) -> (Option<&str>, Option<f64>) {
        match self.kind {
            RecordKind::Feeding => (self.feeding_type.as_deref(), self.amount),
            RecordKind::Diaper => (None, None),
        }
    }

    /// Diaper sub-type, if this is a diaper change.
    #[must_use]
    pub fn diaper_part(&self) -> Option<&str> {
        match self.kind {
            RecordKind::Diaper => self.diaper_type.as_deref(),
            RecordKind::Feeding => None,
        }
    }
}

impl Record {
    /// Build a new record, keeping only the fields that belong to its category.
    #[must_use]
    pub fn create(owner: UserId, id: ClientRecordId, fields: RecordFields) -> Self {
        let (feeding_type, amount) = fields.feeding_parts();
        let feeding_type = feeding_type.map(str::to_owned);
        let diaper_type = fields.diaper_part().map(str::to_owned);

        Self {
            owner,
            id,
            date: fields.date,
            time: fields.time,
            kind: fields.kind,
            feeding_type,
            diaper_type,
            details: fields.details,
            amount,
            timestamp: fields.timestamp,
        }
    }

    /// Overwrite this record in place with the fields of a later upsert.
    ///
    /// Common fields are always replaced (an absent `details` clears it).
    /// Only the sub-type fields of the new category are written: switching a
    /// feeding to a diaper keeps the old `feedingType` and `amount`, and the
    /// reverse keeps the old `diaperType`. Clients rely on this.
    pub fn apply(&mut self, fields: RecordFields) {
        match fields.kind {
            RecordKind::Feeding => {
                self.feeding_type = fields.feeding_type;
                self.amount = fields.amount;
            }
            RecordKind::Diaper => {
                self.diaper_type = fields.diaper_type;
            }
        }
        self.date = fields.date;
        self.time = fields.time;
        self.kind = fields.kind;
        self.details = fields.details;
        self.timestamp = fields.timestamp;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn feeding(feeding_type: &str, amount: f64) -> RecordFields {
        RecordFields {
            date: "2024-01-01".to_string(),
            time: "08:00".to_string(),
            kind: RecordKind::Feeding,
            feeding_type: Some(feeding_type.to_string()),
            diaper_type: None,
            details: None,
            amount: Some(amount),
            timestamp: 1_700_000_000,
        }
    }

    pub(crate) fn diaper(diaper_type: &str) -> RecordFields {
        RecordFields {
            date: "2024-01-01".to_string(),
            time: "09:30".to_string(),
            kind: RecordKind::Diaper,
            feeding_type: None,
            diaper_type: Some(diaper_type.to_string()),
            details: Some("after nap".to_string()),
            amount: None,
            timestamp: 1_700_005_400,
        }
    }

    #[test]
    fn test_create_drops_fields_of_other_category() {
        let mut fields = diaper("wet");
        fields.feeding_type = Some("bottle".to_string());
        fields.amount = Some(90.0);

        let record = Record::create(UserId::generate(), ClientRecordId::new(1), fields);

        assert_eq!(record.diaper_type.as_deref(), Some("wet"));
        assert_eq!(record.feeding_type, None);
        assert_eq!(record.amount, None);
    }

    #[test]
    fn test_apply_same_category_overwrites() {
        let mut record = Record::create(
            UserId::generate(),
            ClientRecordId::new(1),
            feeding("bottle", 120.0),
        );

        record.apply(feeding("breast", 60.0));

        assert_eq!(record.feeding_type.as_deref(), Some("breast"));
        assert_eq!(record.amount, Some(60.0));
    }

    #[test]
    fn test_apply_category_change_keeps_previous_feeding_fields() {
        let mut record = Record::create(
            UserId::generate(),
            ClientRecordId::new(1),
            feeding("bottle", 120.0),
        );

        record.apply(diaper("dirty"));

        assert_eq!(record.kind, RecordKind::Diaper);
        assert_eq!(record.diaper_type.as_deref(), Some("dirty"));
        assert_eq!(record.feeding_type.as_deref(), Some("bottle"));
        assert_eq!(record.amount, Some(120.0));
        assert_eq!(record.time, "09:30");
    }

    #[test]
    fn test_apply_category_change_keeps_previous_diaper_type() {
        let owner = UserId::generate();
        let mut record = Record::create(owner, ClientRecordId::new(1), diaper("wet"));

        record.apply(feeding("bottle", 90.0));

        assert_eq!(record.kind, RecordKind::Feeding);
        assert_eq!(record.feeding_type.as_deref(), Some("bottle"));
        assert_eq!(record.amount, Some(90.0));
        assert_eq!(record.diaper_type.as_deref(), Some("wet"));
        assert_eq!(record.details, None);
        assert_eq!(record.time, "08:00");
    }

    #[test]
    fn test_apply_clears_details_when_absent() {
        let mut record = Record::create(UserId::generate(), ClientRecordId::new(2), diaper("wet"));
        assert!(record.details.is_some());

        let mut fields = diaper("wet");
        fields.details = None;
        record.apply(fields);

        assert_eq!(record.details, None);
    }

    #[test]
    fn test_serializes_in_client_shape() {
        let owner = UserId::generate();
        let record = Record::create(owner, ClientRecordId::new(1), feeding("bottle", 120.0));

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["type"], "feeding");
        assert_eq!(json["feedingType"], "bottle");
        assert_eq!(json["amount"], 120.0);
        assert_eq!(json["timestamp"], 1_700_000_000);
        assert_eq!(json["user"], owner.to_string());
        assert!(json.get("diaperType").is_none());
        assert!(json.get("details").is_none());
    }
}
