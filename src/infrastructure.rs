pub mod auth;
pub mod db;
pub mod limiter;
pub mod notify;
pub mod utils;
