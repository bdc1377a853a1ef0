use std::{fmt, time::Duration};

use crate::errors::AppError;

/// The throttled operation. Part of the counter key so that quotas for
/// different actions never share a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ContactSubmit,
    AdminLogin,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ContactSubmit => "contact",
            Action::AdminLogin => "login",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateLimitKey {
    client_id: String,
    action: Action,
}

impl RateLimitKey {
    pub fn new(client_id: impl Into<String>, action: Action) -> Self {
        RateLimitKey {
            client_id: client_id.into(),
            action,
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn action(&self) -> Action {
        self.action
    }
}

impl fmt::Display for RateLimitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rl:{}:{}", self.action, self.client_id)
    }
}

/// At most `max_attempts` per fixed `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    max_attempts: u32,
    window: Duration,
}

impl Quota {
    pub const MAX_WINDOW: Duration = Duration::from_secs(366 * 24 * 60 * 60);

    pub fn new(max_attempts: u32, window: Duration) -> Result<Self, AppError> {
        if max_attempts == 0 {
            return Err(AppError::Configuration("quota must allow at least one attempt".into()));
        }
        if window.is_zero() {
            return Err(AppError::Configuration("quota window must be longer than zero".into()));
        }
        if window > Quota::MAX_WINDOW {
            return Err(AppError::Configuration("quota window must not exceed one year".into()));
        }
        Ok(Quota { max_attempts, window })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// Quotas for every throttled action.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub contact: Quota,
    pub login: Quota,
}

impl RateLimitPolicy {
    pub fn quota_for(&self, action: Action) -> Quota {
        match action {
            Action::ContactSubmit => self.contact,
            Action::AdminLogin => self.login,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicy {
            contact: Quota { max_attempts: 3, window: Duration::from_secs(60 * 60) },
            login: Quota { max_attempts: 5, window: Duration::from_secs(15 * 60) },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { remaining: u32 },
    Throttled { retry_after: Duration },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_rejects_zero_attempts_and_zero_window() {
        assert!(Quota::new(0, Duration::from_secs(60)).is_err());
        assert!(Quota::new(3, Duration::ZERO).is_err());
        assert!(Quota::new(3, Duration::from_secs(60)).is_ok());
    }

    #[test]
    fn quota_rejects_windows_longer_than_a_year() {
        assert!(Quota::new(3, Quota::MAX_WINDOW).is_ok());
        assert!(Quota::new(3, Quota::MAX_WINDOW + Duration::from_secs(1)).is_err());
        assert!(Quota::new(3, Duration::MAX).is_err());
    }

    #[test]
    fn keys_differ_by_action_for_the_same_client() {
        let contact = RateLimitKey::new("10.0.0.1", Action::ContactSubmit);
        let login = RateLimitKey::new("10.0.0.1", Action::AdminLogin);

        assert_ne!(contact, login);
        assert_eq!(contact.to_string(), "rl:contact:10.0.0.1");
    }

    #[test]
    fn default_policy_matches_site_quotas() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.quota_for(Action::ContactSubmit).max_attempts(), 3);
        assert_eq!(policy.quota_for(Action::AdminLogin).window(), Duration::from_secs(900));
    }
}
