//! Form to assessment-request mapping.

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::{FormField, FormRecord, RoofType};

/// Body of the assessment-creation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub name: String,
    pub location: String,
    pub dwellers: u32,
    pub roof_area: f64,
    pub open_space: f64,
    pub roof_type: RoofType,
    pub roof_age: f64,
}

impl AssessmentRequest {
    /// Map a form with the submission coercions: blank, unparsable or
    /// negative numbers become 0 and an unselected roof type becomes
    /// concrete.
    pub fn from_form(form: &FormRecord) -> Self {
        let number = |field| form.quantity(field).unwrap_or(0.0);
        Self {
            name: form.name.trim().to_string(),
            location: form.location.trim().to_string(),
            dwellers: coerce_count(number(FormField::Dwellers)),
            roof_area: number(FormField::RoofArea),
            open_space: number(FormField::OpenSpace),
            roof_type: form.roof_type.unwrap_or_default(),
            roof_age: number(FormField::RoofAge),
        }
    }
}

fn coerce_count(value: f64) -> u32 {
    // `as` saturates at u32::MAX
    value.trunc() as u32
}

/// The created assessment. Services return the id as a string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentCreated {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_numbers_and_roof_default() {
        let form = FormRecord {
            name: "Asha".into(),
            location: " Pune ".into(),
            dwellers: "4".into(),
            roof_area: "".into(),
            open_space: "abc".into(),
            roof_type: None,
            roof_age: "-3".into(),
            ..FormRecord::default()
        };
        let request = AssessmentRequest::from_form(&form);
        assert_eq!(request.location, "Pune");
        assert_eq!(request.dwellers, 4);
        assert_eq!(request.roof_area, 0.0);
        assert_eq!(request.open_space, 0.0);
        assert_eq!(request.roof_age, 0.0);
        assert_eq!(request.roof_type, RoofType::Concrete);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["roof_area"], serde_json::json!(0.0));
        assert_eq!(body["roof_type"], "concrete");
        assert_eq!(body.as_object().unwrap().len(), 7);
    }

    #[test]
    fn test_fractional_dwellers_truncate() {
        let form = FormRecord {
            dwellers: "3.7".into(),
            roof_type: Some(RoofType::Metal),
            ..FormRecord::default()
        };
        let request = AssessmentRequest::from_form(&form);
        assert_eq!(request.dwellers, 3);
        assert_eq!(request.roof_type, RoofType::Metal);
    }

    #[test]
    fn test_created_id_string_or_number() {
        let created: AssessmentCreated = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(created.id, "42");
        let created: AssessmentCreated =
            serde_json::from_str(r#"{"id": "9f1c", "created_at": "2024-01-01"}"#).unwrap();
        assert_eq!(created.id, "9f1c");
    }
}
