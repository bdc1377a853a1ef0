use serde::Serialize;

use crate::entities::contact::SubmissionRecord;

const SUBJECT_NAME_LIMIT: usize = 100;
const BODY_MESSAGE_LIMIT: usize = 500;

/// Owner notification for one submission, in mail form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn for_submission(record: &SubmissionRecord, from: &str, to: &str) -> Self {
        let subject = format!(
            "New Contact Form Submission from {}",
            truncate_chars(record.name(), SUBJECT_NAME_LIMIT)
        );
        let body = format!(
            "New contact form submission received:\n\n\
             Name: {}\n\
             Email: {}\n\
             Interest: {}\n\
             Message: {}\n\n\
             Submitted at: {}\n",
            record.name(),
            record.email(),
            record.interest().label(),
            truncate_chars(record.message(), BODY_MESSAGE_LIMIT),
            record.submitted_at().format("%Y-%m-%d %H:%M:%S"),
        );

        NotificationMessage {
            from: from.to_string(),
            to: to.to_string(),
            subject,
            body,
        }
    }
}

fn truncate_chars(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
