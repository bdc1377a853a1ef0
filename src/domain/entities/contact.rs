use std::{collections::{BTreeMap, HashMap}, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SubmissionId = Uuid;

/// How the visitor would like to get involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interest {
    Volunteer,
    Donate,
    Partner,
    Other,
}

impl Interest {
    pub const ALL: [Interest; 4] = [
        Interest::Volunteer,
        Interest::Donate,
        Interest::Partner,
        Interest::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interest::Volunteer => "volunteer",
            Interest::Donate => "donate",
            Interest::Partner => "partner",
            Interest::Other => "other",
        }
    }

    /// Human readable label used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            Interest::Volunteer => "Volunteer",
            Interest::Donate => "Donate",
            Interest::Partner => "Partnership",
            Interest::Other => "Other",
        }
    }
}

impl FromStr for Interest {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interest::ALL
            .into_iter()
            .find(|interest| interest.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Interest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw contact form as posted by the browser.
///
/// Every field is optional so that an absent field and an empty one both
/// reach the validator, which reports them as missing.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct ContactDraft {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub interest: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

impl ContactDraft {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        ContactDraft {
            name: fields.get("name").cloned(),
            email: fields.get("email").cloned(),
            interest: fields.get("interest").cloned(),
            message: fields.get("message").cloned(),
        }
    }
}

/// A fully validated contact submission. Only the validator builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionRecord {
    name: String,
    email: String,
    interest: Interest,
    message: String,
    submitted_at: DateTime<Utc>,
}

impl SubmissionRecord {
    pub(crate) fn new(name: String, email: String, interest: Interest, message: String) -> Self {
        SubmissionRecord {
            name,
            email,
            interest,
            message,
            submitted_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn interest(&self) -> Interest {
        self.interest
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Field name to error message. Empty means the submission is valid.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorSet(BTreeMap<String, String>);

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(field, message)| (field.as_str(), message.as_str()))
    }
}

impl fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages = self
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}", messages)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionReceipt {
    pub id: SubmissionId,
    pub message: String,
}

/// JSON body returned to programmatic (AJAX) callers.
#[derive(Debug, Serialize)]
pub struct ApiResponse<'a> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a ValidationErrorSet>,
}

impl<'a> ApiResponse<'a> {
    pub fn success(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn failure(message: impl Into<String>, errors: Option<&'a ValidationErrorSet>) -> Self {
        ApiResponse {
            success: false,
            message: Some(message.into()),
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interest_parses_only_known_values() {
        assert_eq!("partner".parse::<Interest>(), Ok(Interest::Partner));
        assert_eq!(Interest::Partner.label(), "Partnership");
        assert!("Partner".parse::<Interest>().is_err());
        assert!("".parse::<Interest>().is_err());
    }

    #[test]
    fn draft_from_fields_keeps_absent_fields_absent() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), "".to_string());
        fields.insert("email".to_string(), "a@b.co".to_string());

        let draft = ContactDraft::from_fields(&fields);

        assert_eq!(draft.name.as_deref(), Some(""));
        assert_eq!(draft.email.as_deref(), Some("a@b.co"));
        assert!(draft.interest.is_none());
        assert!(draft.message.is_none());
    }

    #[test]
    fn error_set_serializes_as_flat_map() {
        let mut errors = ValidationErrorSet::new();
        errors.insert("name", "Please enter your full name");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["name"], "Please enter your full name");
    }
}
