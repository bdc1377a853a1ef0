pub mod contact;
pub mod guards;
pub mod login;
pub mod validation;
