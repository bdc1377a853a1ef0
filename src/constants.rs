use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const SUBMISSION_SUCCESS_MESSAGE: &str =
    "Thank you for your interest in STEM CURES! We will contact you soon.";

pub const LOGIN_SUCCESS_MESSAGE: &str = "Logged in successfully.";

pub const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";
