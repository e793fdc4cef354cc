//! Untyped input records and their conversion into typed records
//!
//! Loaders hand over one `RawRecord` per row. Field names are normalised
//! (trimmed, lower-cased) on insert so lookups are insensitive to the
//! header spelling used by whoever produced the file.

use std::collections::HashMap;

use crate::errors::{SharedError, SharedResult};
use crate::types::{Priority, Task, TeamMember};

/// One input row keyed by normalised field name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    fields: HashMap<String, String>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(Self::normalize_key(key), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(&Self::normalize_key(key)).map(|v| v.trim())
    }

    pub fn require(&self, key: &str) -> SharedResult<&str> {
        self.get(key).ok_or_else(|| SharedError::MissingField {
            field: Self::normalize_key(key),
        })
    }

    fn require_f64(&self, key: &str) -> SharedResult<f64> {
        let raw = self.require(key)?;
        raw.parse::<f64>().map_err(|_| SharedError::invalid(key, raw))
    }

    fn require_i32(&self, key: &str) -> SharedResult<i32> {
        let raw = self.require(key)?;
        // Spreadsheets export whole numbers as "4.0"
        raw.parse::<i32>()
            .or_else(|_| match raw.parse::<f64>() {
                Ok(v) if v.fract() == 0.0 && v.is_finite() => Ok(v as i32),
                _ => Err(()),
            })
            .map_err(|_| SharedError::invalid(key, raw))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = RawRecord::new();
        for (key, value) in iter {
            record.insert(key.as_ref(), value);
        }
        record
    }
}

impl TryFrom<&RawRecord> for TeamMember {
    type Error = SharedError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        let member = TeamMember::new(record.require("name")?, record.require_f64("speed")?);
        member.validate()?;
        Ok(member)
    }
}

impl TryFrom<&RawRecord> for Task {
    type Error = SharedError;

    fn try_from(record: &RawRecord) -> Result<Self, Self::Error> {
        let priority: Priority = record.require("priority")?.parse()?;
        let task = Task::new(
            record.require("id")?,
            record.require_f64("time")?,
            priority,
            record.require_i32("difficulty")?,
            record.require("zone")?,
        );
        task.validate()?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_and_whitespace_insensitive() {
        let record: RawRecord = [(" Name ", "Ana"), ("SPEED", "1.25")].into_iter().collect();
        let member = TeamMember::try_from(&record).unwrap();
        assert_eq!(member.name, "Ana");
        assert_eq!(member.speed, 1.25);
    }

    #[test]
    fn test_missing_field_is_named() {
        let record: RawRecord = [("name", "Ana")].into_iter().collect();
        let err = TeamMember::try_from(&record).unwrap_err();
        assert_eq!(err, SharedError::MissingField { field: "speed".to_string() });
    }

    #[test]
    fn test_task_from_record() {
        let record: RawRecord = [
            ("id", "L-14"),
            ("time", "45"),
            ("priority", "FZ"),
            ("difficulty", "3.0"),
            ("zone", "Chilled"),
        ]
        .into_iter()
        .collect();
        let task = Task::try_from(&record).unwrap();
        assert_eq!(task.id, "L-14");
        assert_eq!(task.priority, Priority::Freezer);
        assert_eq!(task.difficulty, 3);
        assert_eq!(task.zone, "Chilled");
    }

    #[test]
    fn test_bad_numbers_are_rejected() {
        let record: RawRecord = [
            ("id", "L-1"),
            ("time", "soon"),
            ("priority", "low"),
            ("difficulty", "1"),
            ("zone", "A"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            Task::try_from(&record).unwrap_err(),
            SharedError::invalid("time", "soon")
        );
    }
}
