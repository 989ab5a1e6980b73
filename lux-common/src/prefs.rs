//! Preferences document shape
//!
//! One document per owner, produced by onboarding and overwritten
//! wholesale on every save. The server persists the document as raw JSON
//! (only the `user_id` field is validated and `updated_at` stamped), so
//! fields beyond the ones modeled here round-trip untouched; the typed
//! shape below is what the client flow composes and what the styling
//! backend reads.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-owner fashion preferences document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Owner identity; must equal the authenticated caller on write
    pub user_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    pub gender: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub onboarding_responses: Option<OnboardingResponses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_profile: Option<StyleProfile>,
    /// Server-stamped write time (RFC 3339), absent until first save
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Fields the schema does not model; persisted as given
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Free-form onboarding answers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingResponses {
    #[serde(default)]
    pub favorite_colors: Vec<String>,
    #[serde(default)]
    pub dominant_colors: Vec<String>,
    #[serde(default)]
    pub preferred_materials: Vec<String>,
    #[serde(default)]
    pub preferred_patterns: Vec<String>,
    #[serde(default)]
    pub style_preferences: Vec<String>,
    #[serde(default)]
    pub fashion_influences: String,
    #[serde(default)]
    pub wardrobe_challenges: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Lifestyle context gathered during onboarding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lifestyle {
    #[serde(default)]
    pub work: String,
    #[serde(default)]
    pub social: String,
    #[serde(default)]
    pub climate: String,
}

/// Derived numeric scores per style axis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyleProfile {
    /// Percentages, 0-100
    pub casual: f64,
    pub formal: f64,
    pub active: f64,
    pub pattern_variability: f64,
    pub material_variety: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_round_trip() {
        let doc = json!({
            "user_id": "u1",
            "name": "Ana",
            "gender": "female",
            "favorite_animal": "capuchin",
            "onboarding_responses": {
                "favorite_colors": ["teal"],
                "custom_axis": 7
            }
        });

        let prefs: Preferences = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(prefs.extra["favorite_animal"], json!("capuchin"));
        let responses = prefs.onboarding_responses.as_ref().unwrap();
        assert_eq!(responses.extra["custom_axis"], json!(7));

        let back = serde_json::to_value(&prefs).unwrap();
        assert_eq!(back["favorite_animal"], doc["favorite_animal"]);
        assert_eq!(
            back["onboarding_responses"]["custom_axis"],
            doc["onboarding_responses"]["custom_axis"]
        );
    }

    #[test]
    fn optional_identity_fields_are_omitted() {
        let prefs = Preferences {
            user_id: "u1".into(),
            name: "Ana".into(),
            gender: "female".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&prefs).unwrap();
        assert!(value.get("age").is_none());
        assert!(value.get("location").is_none());
        assert!(value.get("updated_at").is_none());
    }
}
