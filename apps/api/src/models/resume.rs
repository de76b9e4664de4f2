use serde::{Deserialize, Serialize};

/// Marker stamped into `raw_text` after a successful parse. It records provenance only;
/// the document text itself is never retained.
pub const RAW_TEXT_MARKER: &str = "Extracted from file";

/// Normalized resume extracted from an uploaded document.
///
/// Field names follow the structured-output schema sent to the AI service, so the
/// same type round-trips through the gateway and the browser unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub contact_info: ContactInfo,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<WorkExperience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// One job entry. `description` holds the bullet points in display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub dates: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub dates: String,
}

impl ResumeData {
    pub fn find_experience(&self, experience_id: &str) -> Option<&WorkExperience> {
        self.experience.iter().find(|e| e.id == experience_id)
    }

    /// Mutable access to a single bullet, addressed by experience id and index.
    pub fn bullet_mut(&mut self, experience_id: &str, index: usize) -> Option<&mut String> {
        self.experience
            .iter_mut()
            .find(|e| e.id == experience_id)
            .and_then(|e| e.description.get_mut(index))
    }

    pub fn bullet(&self, experience_id: &str, index: usize) -> Option<&str> {
        self.find_experience(experience_id)
            .and_then(|e| e.description.get(index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case_payload() {
        let json = r#"{
            "fullName": "Jane Doe",
            "contactInfo": {"email": "jane@example.com", "phone": "555-0100", "linkedin": "in/jane"},
            "summary": "Backend engineer",
            "skills": ["Rust", "SQL"],
            "experience": [
                {"id": "e1", "company": "Acme", "role": "Engineer", "dates": "2020-2023",
                 "description": ["Built things", "Shipped stuff"]}
            ],
            "education": [{"id": "ed1", "school": "MIT", "degree": "BSc", "dates": "2016-2020"}]
        }"#;

        let resume: ResumeData = serde_json::from_str(json).unwrap();
        assert_eq!(resume.full_name, "Jane Doe");
        assert_eq!(resume.contact_info.linkedin.as_deref(), Some("in/jane"));
        assert_eq!(resume.contact_info.location, None);
        assert_eq!(resume.experience[0].description.len(), 2);
        assert_eq!(resume.education[0].school, "MIT");
        assert!(resume.raw_text.is_none());
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let resume: ResumeData = serde_json::from_str(r#"{"fullName": "Solo"}"#).unwrap();
        assert!(resume.experience.is_empty());
        assert!(resume.education.is_empty());
        assert!(resume.contact_info.email.is_empty());
    }

    #[test]
    fn test_serializes_wire_names_and_skips_absent_optionals() {
        let resume = ResumeData {
            full_name: "Jane".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&resume).unwrap();
        assert_eq!(value["fullName"], "Jane");
        assert!(value.get("rawText").is_none());
        assert!(value["contactInfo"].get("linkedin").is_none());
    }

    #[test]
    fn test_bullet_mut_addresses_single_slot() {
        let mut resume = ResumeData {
            experience: vec![WorkExperience {
                id: "e1".to_string(),
                description: vec!["a".to_string(), "b".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };

        *resume.bullet_mut("e1", 1).unwrap() = "B".to_string();
        assert_eq!(resume.bullet("e1", 0), Some("a"));
        assert_eq!(resume.bullet("e1", 1), Some("B"));
        assert!(resume.bullet_mut("e1", 2).is_none());
        assert!(resume.bullet_mut("missing", 0).is_none());
    }
}
