//! Access-token session state

use std::time::Instant;

use wakelink_domain::VehicleError;

/// Token cache plus the sticky failure flag
///
/// Once `sticky_error` is set it is returned for every later request and the
/// refresh token is never exchanged again.
#[derive(Debug, Default)]
pub(crate) struct AuthSession {
    token: Option<String>,
    expires_at: Option<Instant>,
    sticky_error: Option<VehicleError>,
}

impl AuthSession {
    /// Token that is still valid at `now`
    pub(crate) fn valid_token(&self, now: Instant) -> Option<&str> {
        match (&self.token, self.expires_at) {
            (Some(token), Some(expires_at)) if now < expires_at => Some(token),
            _ => None,
        }
    }

    pub(crate) fn sticky_error(&self) -> Option<&VehicleError> {
        self.sticky_error.as_ref()
    }

    pub(crate) fn store(&mut self, token: String, expires_at: Instant) {
        self.token = Some(token);
        self.expires_at = Some(expires_at);
    }

    pub(crate) fn fail(&mut self, error: VehicleError) {
        self.token = None;
        self.expires_at = None;
        self.sticky_error = Some(error);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_token_valid_until_expiry() {
        let now = Instant::now();
        let mut session = AuthSession::default();
        assert!(session.valid_token(now).is_none());

        session.store("abc".into(), now + Duration::from_secs(5));
        assert_eq!(session.valid_token(now), Some("abc"));
        assert!(session.valid_token(now + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn test_failure_is_sticky_and_drops_token() {
        let now = Instant::now();
        let mut session = AuthSession::default();
        session.store("abc".into(), now + Duration::from_secs(60));
        session.fail(VehicleError::Auth("invalid_grant".into()));

        assert!(session.valid_token(now).is_none());
        assert_eq!(session.sticky_error(), Some(&VehicleError::Auth("invalid_grant".into())));
    }
}
