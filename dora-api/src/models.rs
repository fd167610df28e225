use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{alerts, subscribers, users};

// --- Users ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

// --- Subscribers ---

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = subscribers)]
pub struct Subscriber {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub language: String,
    pub pin_code: i32,
    pub city: String,
    pub state: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = subscribers)]
pub struct NewSubscriber {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub language: String,
    pub pin_code: i32,
    pub city: String,
    pub state: String,
    pub country: String,
}

// --- Alerts ---

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = alerts)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub coverage: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = alerts)]
pub struct NewAlert {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub coverage: Option<i32>,
}

/// Alert severity. Stored in its lowercase canonical form so that the
/// (title, description, severity) identity is stable across request casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parses_case_insensitively() {
        assert_eq!("low".parse::<Severity>().unwrap(), Severity::Low);
        assert_eq!("HIGH".parse::<Severity>().unwrap(), Severity::High);
        assert_eq!("CriTiCal".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("Medium".parse::<Severity>().unwrap(), Severity::Medium);
    }

    #[test]
    fn severity_rejects_unknown_values() {
        assert!("urgent".parse::<Severity>().is_err());
        assert!("".parse::<Severity>().is_err());
        assert!("lo w".parse::<Severity>().is_err());
    }

    #[test]
    fn severity_displays_lowercase() {
        assert_eq!(Severity::High.to_string(), "high");
        assert_eq!("HIGH".parse::<Severity>().unwrap().as_str(), "high");
    }

    #[test]
    fn user_serialization_skips_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            username: "ramona".into(),
            email: "ramona@example.com".into(),
            first_name: "Ramona".into(),
            last_name: "Flowers".into(),
            password_hash: "argon2id$secret".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["username"], "ramona");
    }
}
