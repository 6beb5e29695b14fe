//! Public landing page.

use serde::{Deserialize, Serialize};

pub const INDEX_PATH: &str = "/";
pub const INDEX_TEMPLATE: &str = "index.html";

/// Context of the landing page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandingData {
    pub authenticated: bool,
    pub username: Option<String>,
    pub museum_name: Option<String>,
}

impl LandingData {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_landing() {
        let data = LandingData::anonymous();
        assert!(!data.authenticated);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["museum_name"], serde_json::Value::Null);
    }

    #[test]
    fn test_const_values() {
        assert_eq!(INDEX_PATH, "/");
        assert_eq!(INDEX_TEMPLATE, "index.html");
    }
}
