pub mod authenticator;
pub mod notifier;
pub mod sqlx_repo;
pub mod submission;
