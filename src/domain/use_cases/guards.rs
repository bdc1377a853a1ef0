use crate::{
    entities::rate_limit::{Action, Quota, RateLimitDecision, RateLimitKey},
    errors::AppError,
    infrastructure::limiter::rate_limiter::RateLimiter,
};

/// What the guards know about an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub client_ip: String,
    pub origin: Option<String>,
}

impl RequestContext {
    pub fn new(client_ip: impl Into<String>) -> Self {
        RequestContext {
            client_ip: client_ip.into(),
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<String>) -> Self {
        self.origin = origin;
        self
    }
}

#[derive(Debug)]
pub enum GuardVerdict {
    Allow,
    Reject(AppError),
}

/// One stage of the pre-validation pipeline.
pub trait Guard: Send + Sync {
    fn name(&self) -> &'static str;
    fn check(&self, ctx: &RequestContext) -> GuardVerdict;
}

/// Guards run in insertion order; the first rejection wins and later
/// guards are not consulted.
#[derive(Default)]
pub struct GuardPipeline {
    guards: Vec<Box<dyn Guard>>,
}

impl GuardPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    pub fn run(&self, ctx: &RequestContext) -> Result<(), AppError> {
        for guard in &self.guards {
            if let GuardVerdict::Reject(err) = guard.check(ctx) {
                tracing::debug!(guard = guard.name(), client_ip = %ctx.client_ip, "request rejected");
                return Err(err);
            }
        }
        Ok(())
    }
}

/// Same-origin check for cross-site form posts. Requests without an
/// `Origin` header pass; `"*"` in the allow list lets every origin through.
#[derive(Debug, Clone)]
pub struct OriginGuard {
    allowed: Vec<String>,
    allow_any: bool,
}

impl OriginGuard {
    pub fn new(allowed: Vec<String>) -> Self {
        let allow_any = allowed.iter().any(|o| o == "*");
        let allowed = allowed.iter().map(|o| normalize_origin(o)).collect();
        OriginGuard { allowed, allow_any }
    }
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

impl Guard for OriginGuard {
    fn name(&self) -> &'static str {
        "origin"
    }

    fn check(&self, ctx: &RequestContext) -> GuardVerdict {
        let Some(origin) = ctx.origin.as_deref() else {
            return GuardVerdict::Allow;
        };
        if self.allow_any || self.allowed.contains(&normalize_origin(origin)) {
            GuardVerdict::Allow
        } else {
            tracing::warn!(client_ip = %ctx.client_ip, origin, "cross-origin post blocked");
            GuardVerdict::Reject(AppError::Forbidden(format!("origin {} not allowed", origin)))
        }
    }
}

/// Consumes one attempt of `quota` for `(client_ip, action)`.
#[derive(Debug, Clone)]
pub struct RateLimitGuard {
    limiter: RateLimiter,
    action: Action,
    quota: Quota,
}

impl RateLimitGuard {
    pub fn new(limiter: RateLimiter, action: Action, quota: Quota) -> Self {
        RateLimitGuard { limiter, action, quota }
    }
}

impl Guard for RateLimitGuard {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn check(&self, ctx: &RequestContext) -> GuardVerdict {
        let key = RateLimitKey::new(ctx.client_ip.as_str(), self.action);
        match self.limiter.check_and_consume(&key, &self.quota) {
            RateLimitDecision::Allowed { .. } => GuardVerdict::Allow,
            RateLimitDecision::Throttled { retry_after } => {
                GuardVerdict::Reject(AppError::Throttled { retry_after })
            }
        }
    }
}
