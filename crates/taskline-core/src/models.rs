//! Data models for taskline
//!
//! Defines the entry record, its workflow status and the request bodies
//! sent to the backend. The serde attributes here are the wire format.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Backend-assigned entry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Workflow status of an entry
///
/// Any status may move to any other; there is no ordering between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryStatus {
    #[default]
    Pending,
    InProgress,
    Finished,
}

impl EntryStatus {
    /// All statuses, in board order
    pub const ALL: [EntryStatus; 3] = [
        EntryStatus::Pending,
        EntryStatus::InProgress,
        EntryStatus::Finished,
    ];

    /// Wire name of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::InProgress => "in-progress",
            EntryStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown status '{0}'. Valid statuses: pending, in-progress, finished")]
pub struct ParseStatusError(String);

impl FromStr for EntryStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(EntryStatus::Pending),
            "in-progress" | "in_progress" | "inprogress" => Ok(EntryStatus::InProgress),
            "finished" => Ok(EntryStatus::Finished),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// A tracked entry as the backend stores it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Unique identifier, assigned at creation
    #[serde(alias = "_id")]
    pub id: EntryId,
    /// Free-text description
    pub description: String,
    /// Workflow status
    pub status: EntryStatus,
    /// Creation time in milliseconds since the Unix epoch
    pub created_at: i64,
}

impl Entry {
    /// Build an entry from its parts (for gateways and tests)
    pub fn new(
        id: impl Into<EntryId>,
        description: impl Into<String>,
        status: EntryStatus,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            status,
            created_at,
        }
    }

    /// Creation time as a UTC timestamp
    ///
    /// Falls back to the epoch if the stored value is out of range.
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .unwrap_or_default()
    }

    /// Copy of this entry with a different status
    pub fn with_status(&self, status: EntryStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy of this entry with a different description
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..self.clone()
        }
    }

    /// The changes sent to the backend when this entry is updated
    pub fn changes(&self) -> EntryChanges {
        EntryChanges {
            description: self.description.clone(),
            status: self.status,
        }
    }
}

/// Request body for creating an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub description: String,
}

impl NewEntry {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Request body for updating an entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryChanges {
    pub description: String,
    pub status: EntryStatus,
}

/// Description rejected before submission
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Description cannot be empty")]
    EmptyDescription,
}

/// Trim a description and reject it if nothing is left
///
/// The store never validates; this is for callers about to submit.
pub fn validate_description(description: &str) -> Result<&str, ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&EntryStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let parsed: EntryStatus = serde_json::from_str("\"finished\"").unwrap();
        assert_eq!(parsed, EntryStatus::Finished);
        assert!(serde_json::from_str::<EntryStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("pending".parse::<EntryStatus>(), Ok(EntryStatus::Pending));
        assert_eq!(
            "In_Progress".parse::<EntryStatus>(),
            Ok(EntryStatus::InProgress)
        );
        assert_eq!(" finished ".parse::<EntryStatus>(), Ok(EntryStatus::Finished));

        let err = "archived".parse::<EntryStatus>().unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn test_status_display_matches_wire() {
        for status in EntryStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }

    #[test]
    fn test_entry_wire_shape() {
        let entry = Entry::new("1", "buy milk", EntryStatus::Pending, 1000);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["id"], "1");
        assert_eq!(json["description"], "buy milk");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["createdAt"], 1000);
    }

    #[test]
    fn test_entry_accepts_underscore_id() {
        let json = r#"{
            "_id": "64b7f0c2",
            "description": "call dentist",
            "status": "in-progress",
            "createdAt": 1700000000000
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.id.as_str(), "64b7f0c2");
        assert_eq!(entry.status, EntryStatus::InProgress);
        assert_eq!(entry.created_at, 1_700_000_000_000);
    }

    #[test]
    fn test_created_at_utc() {
        let entry = Entry::new("1", "x", EntryStatus::Pending, 1_700_000_000_000);
        assert_eq!(entry.created_at_utc().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_changes_carry_description_and_status() {
        let entry = Entry::new("1", "buy milk", EntryStatus::Pending, 1000)
            .with_status(EntryStatus::Finished);
        let changes = entry.changes();

        assert_eq!(changes.description, "buy milk");
        assert_eq!(changes.status, EntryStatus::Finished);
        let json = serde_json::to_value(&changes).unwrap();
        assert_eq!(json, serde_json::json!({"description": "buy milk", "status": "finished"}));
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description("  walk dog "), Ok("walk dog"));
        assert_eq!(
            validate_description("   "),
            Err(ValidationError::EmptyDescription)
        );
        assert_eq!(validate_description(""), Err(ValidationError::EmptyDescription));
    }
}
