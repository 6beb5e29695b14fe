//! Museum and staff account records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{MuseumId, StaffId};

/// A registered museum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Museum {
    pub id: MuseumId,
    pub name: String,
    pub description: Option<String>,
    /// Free-text "City, Country"
    pub location: Option<String>,
    pub contact_email: String,
    pub website: Option<String>,
    /// Media path of the uploaded logo, relative to the media root
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Museum fields collected at registration, before an ID is assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMuseum {
    pub name: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub contact_email: String,
    pub website: Option<String>,
    pub logo: Option<String>,
}

crate::define_choices!(
    /// Role of a staff member within their museum.
    StaffRole {
        Admin => ("admin", "Administrator"),
        Curator => ("curator", "Curator"),
        Staff => ("staff", "Staff"),
    }
);

/// A staff account. Every account belongs to exactly one museum.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MuseumStaff {
    pub id: StaffId,
    pub museum_id: MuseumId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// PHC-formatted password hash; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: StaffRole,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl MuseumStaff {
    /// First and last name separated by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Staff fields collected at registration. The password is already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStaff {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: StaffRole,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn staff(first: &str, last: &str) -> MuseumStaff {
        MuseumStaff {
            id: StaffId::new(1),
            museum_id: MuseumId::new(1),
            username: "curator".to_string(),
            email: "c@museum.org".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            phone: None,
            password_hash: "secret-hash".to_string(),
            role: StaffRole::Admin,
            is_active: true,
            date_joined: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(staff("Ada", "Lovelace").full_name(), "Ada Lovelace");
        assert_eq!(staff("Ada", "").full_name(), "Ada");
        assert_eq!(staff("", "").full_name(), "");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_string(&staff("Ada", "Lovelace")).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"admin\""));
    }

    #[test]
    fn test_role_choices() {
        assert_eq!("curator".parse::<StaffRole>().unwrap(), StaffRole::Curator);
        assert!("owner".parse::<StaffRole>().is_err());
        assert_eq!(StaffRole::ALL.len(), 3);
    }
}
