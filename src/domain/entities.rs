pub mod contact;
pub mod login;
pub mod rate_limit;
