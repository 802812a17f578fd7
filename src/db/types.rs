use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::Type;

/// The closed set of principals. Every authorization site matches on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "userrole", rename_all = "SCREAMING_SNAKE_CASE")]
pub(crate) enum UserRole {
    Student,
    Doctor,
    StaffAffairs,
    Admin,
}

impl UserRole {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            UserRole::Student => "STUDENT",
            UserRole::Doctor => "DOCTOR",
            UserRole::StaffAffairs => "STAFF_AFFAIRS",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[sqlx(type_name = "semester")]
pub(crate) enum Semester {
    #[serde(rename = "1")]
    #[sqlx(rename = "1")]
    First,
    #[serde(rename = "2")]
    #[sqlx(rename = "2")]
    Second,
    #[serde(rename = "Summer")]
    #[sqlx(rename = "Summer")]
    Summer,
}

impl Semester {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Semester::First => "1",
            Semester::Second => "2",
            Semester::Summer => "Summer",
        }
    }

    /// Accepts the stored codes plus the labels people type into spreadsheets
    /// ("First", "second semester", "summer").
    pub(crate) fn parse_label(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let normalized = normalized.strip_suffix(" semester").unwrap_or(&normalized).trim();
        match normalized {
            "1" | "first" | "fall" => Some(Semester::First),
            "2" | "second" | "spring" => Some(Semester::Second),
            "summer" | "3" => Some(Semester::Summer),
            _ => None,
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "deletiontarget", rename_all = "UPPERCASE")]
pub(crate) enum DeletionTarget {
    Year,
    Level,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semester_labels_parse() {
        assert_eq!(Semester::parse_label("1"), Some(Semester::First));
        assert_eq!(Semester::parse_label(" Second Semester "), Some(Semester::Second));
        assert_eq!(Semester::parse_label("SUMMER"), Some(Semester::Summer));
        assert_eq!(Semester::parse_label("winter"), None);
    }

    #[test]
    fn roles_serialize_in_upper_snake_case() {
        let json = serde_json::to_string(&UserRole::StaffAffairs).unwrap();
        assert_eq!(json, "\"STAFF_AFFAIRS\"");
        let parsed: UserRole = serde_json::from_str("\"DOCTOR\"").unwrap();
        assert_eq!(parsed, UserRole::Doctor);
    }

    #[test]
    fn semester_serializes_as_stored_code() {
        assert_eq!(serde_json::to_string(&Semester::Summer).unwrap(), "\"Summer\"");
        assert_eq!(serde_json::to_string(&Semester::First).unwrap(), "\"1\"");
    }
}
