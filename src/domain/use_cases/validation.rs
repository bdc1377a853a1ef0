use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::entities::contact::{ContactDraft, Interest, SubmissionRecord, ValidationErrorSet};

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 254;
const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 1000;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

/// Validates raw form fields, see [`validate_draft`].
pub fn validate(raw_fields: &HashMap<String, String>) -> Result<SubmissionRecord, ValidationErrorSet> {
    validate_draft(&ContactDraft::from_fields(raw_fields))
}

/// Runs every field rule and either builds a normalized record or returns
/// one message per failing field. Rules never short-circuit across fields.
pub fn validate_draft(draft: &ContactDraft) -> Result<SubmissionRecord, ValidationErrorSet> {
    let mut errors = ValidationErrorSet::new();

    let name = collect(&mut errors, "name", validate_name(draft.name.as_deref()));
    let email = collect(&mut errors, "email", validate_email(draft.email.as_deref()));
    let interest = collect(&mut errors, "interest", validate_interest(draft.interest.as_deref()));
    let message = collect(&mut errors, "message", validate_message(draft.message.as_deref()));

    match (name, email, interest, message) {
        (Some(name), Some(email), Some(interest), Some(message)) => {
            Ok(SubmissionRecord::new(name, email, interest, message))
        }
        _ => Err(errors),
    }
}

fn collect<T>(
    errors: &mut ValidationErrorSet,
    field: &'static str,
    result: Result<T, ValidationError>,
) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            let message = error
                .message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid value".to_string());
            errors.insert(field, message);
            None
        }
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Trimmed value, or `None` when absent or blank.
fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}

pub fn validate_name(raw: Option<&str>) -> Result<String, ValidationError> {
    let name = present(raw).ok_or_else(|| field_error("required", "Please enter your full name"))?;

    match name.chars().count() {
        n if n < NAME_MIN => Err(field_error("length", "Name must be at least 2 characters")),
        n if n > NAME_MAX => Err(field_error("length", "Name is too long (maximum 100 characters)")),
        _ => Ok(name.to_string()),
    }
}

pub fn validate_email(raw: Option<&str>) -> Result<String, ValidationError> {
    let email = present(raw)
        .ok_or_else(|| field_error("required", "Please enter your email address"))?
        .to_lowercase();

    if email.chars().count() > EMAIL_MAX {
        return Err(field_error("length", "Email address is too long (maximum 254 characters)"));
    }
    if EMAIL_PATTERN.is_match(&email) {
        Ok(email)
    } else {
        Err(field_error("email", "Please enter a valid email address"))
    }
}

pub fn validate_interest(raw: Option<&str>) -> Result<Interest, ValidationError> {
    let interest = present(raw)
        .ok_or_else(|| field_error("required", "Please select how you would like to help"))?;

    interest
        .parse::<Interest>()
        .map_err(|_| field_error("choice", "Please select a valid option"))
}

pub fn validate_message(raw: Option<&str>) -> Result<String, ValidationError> {
    let message = present(raw).ok_or_else(|| field_error("required", "Please enter a message"))?;

    match message.chars().count() {
        n if n < MESSAGE_MIN => Err(field_error("length", "Message must be at least 10 characters")),
        n if n > MESSAGE_MAX => Err(field_error("length", "Message is too long (maximum 1000 characters)")),
        _ => Ok(message.to_string()),
    }
}
