pub mod contact;
pub mod login;
pub mod responders;
pub mod system;
