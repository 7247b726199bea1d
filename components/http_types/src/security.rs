//! Authentication challenge handling
//!
//! Modeled as a closed sum type (§9 design note) rather than a `dyn Trait`: most
//! callers either want the transport's default handling, a single fixed credential,
//! or a small amount of custom logic — a `Custom(fn)` variant covers the long tail.

use std::fmt;
use std::sync::Arc;

/// An authentication challenge raised by the transport mid-request
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    /// Authentication scheme requested (e.g. `"Basic"`, `"Bearer"`)
    pub scheme: String,
    /// Realm advertised by the server, if any
    pub realm: Option<String>,
    /// Host the challenge originated from
    pub host: String,
    /// Port the challenge originated from
    pub port: u16,
    /// Number of times this challenge has already been presented for this request
    pub previous_failure_count: u32,
}

/// A username/password credential
#[derive(Clone)]
pub struct Credential {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Disposition returned in response to an [`AuthChallenge`]
#[derive(Debug, Clone)]
pub enum ChallengeDisposition {
    /// Retry the request using the given credential
    UseCredential(Credential),
    /// Let the underlying transport apply its default handling (e.g. system keychain)
    PerformDefaultHandling,
    /// Abort this authentication attempt and fail the request
    CancelAuthenticationChallenge,
    /// Reject the entire protection space, preventing further challenges for it
    RejectProtectionSpace,
}

/// Security policy applied when a request's transport raises an [`AuthChallenge`]
#[derive(Clone)]
pub enum SecurityPolicy {
    /// Always perform the transport's default handling
    Default,
    /// Always answer with a fixed credential
    FixedCredential(Credential),
    /// Delegate to caller-supplied logic
    Custom(Arc<dyn Fn(&AuthChallenge) -> ChallengeDisposition + Send + Sync>),
}

impl fmt::Debug for SecurityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityPolicy::Default => f.write_str("Default"),
            SecurityPolicy::FixedCredential(cred) => {
                f.debug_tuple("FixedCredential").field(cred).finish()
            }
            SecurityPolicy::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        SecurityPolicy::Default
    }
}

impl SecurityPolicy {
    /// Resolve a disposition for the given challenge
    pub fn resolve(&self, challenge: &AuthChallenge) -> ChallengeDisposition {
        match self {
            SecurityPolicy::Default => ChallengeDisposition::PerformDefaultHandling,
            SecurityPolicy::FixedCredential(cred) => {
                ChallengeDisposition::UseCredential(cred.clone())
            }
            SecurityPolicy::Custom(f) => f(challenge),
        }
    }
}
