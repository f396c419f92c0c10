//! Access credentials for the target system.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Opaque bearer token. Never printed by `Debug`.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::new(token.into()))
    }

    /// Exposes the raw token for use in an `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.0.expose_secret().is_empty()
    }
}

impl From<SecretString> for AccessToken {
    fn from(secret: SecretString) -> Self {
        Self(secret)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// A cached access token with its usable-until time.
///
/// `expires_at` is the issuer TTL minus a safety margin, so a credential is
/// never presented after `expires_at`. When the TTL does not exceed the
/// margin, the margin is clamped to half the TTL.
#[derive(Debug, Clone)]
pub struct Credential {
    token: AccessToken,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Builds a credential issued at `issued_at` with the issuer-reported TTL.
    pub fn issued(
        token: AccessToken,
        ttl_secs: i64,
        margin: Duration,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let ttl = Duration::seconds(ttl_secs.max(0));
        let margin = if margin < ttl { margin } else { ttl / 2 };
        Self {
            token,
            expires_at: issued_at + ttl - margin,
        }
    }

    pub fn token(&self) -> &AccessToken {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true once `now` has reached the margin-adjusted expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> AccessToken {
        AccessToken::new("tok-123")
    }

    #[test]
    fn expiry_subtracts_margin() {
        let now = Utc::now();
        let cred = Credential::issued(token(), 3600, Duration::seconds(60), now);
        assert_eq!(cred.expires_at(), now + Duration::seconds(3540));
        assert!(!cred.is_expired_at(now + Duration::seconds(3539)));
        assert!(cred.is_expired_at(now + Duration::seconds(3540)));
    }

    #[test]
    fn margin_is_clamped_for_short_ttl() {
        let now = Utc::now();
        let cred = Credential::issued(token(), 40, Duration::seconds(60), now);
        assert_eq!(cred.expires_at(), now + Duration::seconds(20));
    }

    #[test]
    fn zero_ttl_is_immediately_expired() {
        let now = Utc::now();
        let cred = Credential::issued(token(), 0, Duration::seconds(60), now);
        assert!(cred.is_expired_at(now));
    }

    #[test]
    fn debug_output_redacts_token() {
        let cred = Credential::issued(token(), 3600, Duration::seconds(60), Utc::now());
        let debug = format!("{:?}", cred);
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn expose_returns_raw_token() {
        assert_eq!(token().expose(), "tok-123");
        assert!(!token().is_empty());
        assert!(AccessToken::new("").is_empty());
    }
}
