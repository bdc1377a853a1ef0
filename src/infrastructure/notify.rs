pub mod log;
pub mod message;
pub mod webhook;
