//! Session guard: admits a dashboard only for the expected role.

use crate::domain::{Identity, LoginPage, Role};
use crate::ports::HttpTransport;

use super::fetcher::{fetch_json_with_retry, RetryPolicy};

/// Identity endpoint.
pub const WHOAMI_PATH: &str = "/whoami";

/// Result of [`SessionGuard::require_role`].
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Session holds the expected role.
    Admitted(Identity),
    /// Caller must abort initialization and show the login page.
    Redirected(LoginPage),
}

impl GuardOutcome {
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted(_))
    }
}

/// Checks the session role before a dashboard initializes.
pub struct SessionGuard<'a, H: HttpTransport + ?Sized> {
    transport: &'a H,
    policy: RetryPolicy,
}

impl<'a, H: HttpTransport + ?Sized> SessionGuard<'a, H> {
    #[must_use]
    pub fn new(transport: &'a H, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Fetch the session identity and compare its role with `expected`.
    ///
    /// The identity fetch goes through the resilient fetcher. If it still
    /// fails, the guard fails closed and redirects exactly as on a role
    /// mismatch; it never admits an unverified session.
    pub async fn require_role(&self, expected: Role) -> GuardOutcome {
        let identity: Identity =
            match fetch_json_with_retry(self.transport, WHOAMI_PATH, self.policy).await {
                Ok(identity) => identity,
                Err(e) => {
                    tracing::warn!("Identity check failed, redirecting to login: {}", e);
                    return GuardOutcome::Redirected(expected.login_page());
                }
            };

        if identity.has_role(expected) {
            tracing::info!("Session admitted as {}", expected.as_str());
            GuardOutcome::Admitted(identity)
        } else {
            tracing::warn!(
                "Session role {:?} does not match {}, redirecting to {}",
                identity.role.map(|r| r.as_str()),
                expected.as_str(),
                expected.login_page().path()
            );
            GuardOutcome::Redirected(expected.login_page())
        }
    }
}
