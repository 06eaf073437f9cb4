//! Anti-forgery nonce issuance and verification
//!
//! A nonce is a truncated keyed hash over an action name and a coarse
//! time tick. Two ticks make up the configured lifetime, and a nonce is
//! accepted during the tick it was issued in and the following one, so
//! a freshly issued nonce is always valid for at least half a lifetime.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Length of an issued nonce in hex characters
const NONCE_LEN: usize = 10;

/// Issues and verifies anti-forgery nonces bound to an action name.
#[derive(Clone)]
pub struct NonceGuard {
    secret: Vec<u8>,
    lifetime: Duration,
}

impl NonceGuard {
    pub fn new(secret: impl Into<Vec<u8>>, lifetime: Duration) -> Self {
        Self {
            secret: secret.into(),
            // a lifetime under two seconds would collapse the tick window
            lifetime: lifetime.max(Duration::from_secs(2)),
        }
    }

    /// Issue a nonce for `action`, valid from now.
    pub fn issue(&self, action: &str) -> String {
        self.issue_at(action, SystemTime::now())
    }

    /// Verify `token` against `action`.
    pub fn verify(&self, action: &str, token: &str) -> bool {
        self.verify_at(action, token, SystemTime::now())
    }

    fn issue_at(&self, action: &str, now: SystemTime) -> String {
        self.token_for(action, self.tick_at(now))
    }

    fn verify_at(&self, action: &str, token: &str, now: SystemTime) -> bool {
        let tick = self.tick_at(now);
        if token == self.token_for(action, tick) {
            return true;
        }
        tick > 0 && token == self.token_for(action, tick - 1)
    }

    fn tick_at(&self, now: SystemTime) -> u64 {
        let secs = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        secs / (self.lifetime.as_secs() / 2)
    }

    fn token_for(&self, action: &str, tick: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.secret);
        hasher.update(b"|");
        hasher.update(action.as_bytes());
        hasher.update(b"|");
        hasher.update(tick.to_be_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..NONCE_LEN].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> NonceGuard {
        NonceGuard::new("test-secret", Duration::from_secs(86400))
    }

    #[test]
    fn issued_nonce_verifies() {
        let guard = guard();
        let nonce = guard.issue("download_media_file_action");
        assert_eq!(nonce.len(), NONCE_LEN);
        assert!(guard.verify("download_media_file_action", &nonce));
    }

    #[test]
    fn nonce_is_bound_to_action() {
        let guard = guard();
        let nonce = guard.issue("download_media_file_action");
        assert!(!guard.verify("some_other_action", &nonce));
    }

    #[test]
    fn tampered_nonce_fails() {
        let guard = guard();
        let mut nonce = guard.issue("download_media_file_action");
        nonce.replace_range(0..1, if nonce.starts_with('0') { "1" } else { "0" });
        assert!(!guard.verify("download_media_file_action", &nonce));
    }

    #[test]
    fn different_secrets_disagree() {
        let a = NonceGuard::new("secret-a", Duration::from_secs(86400));
        let b = NonceGuard::new("secret-b", Duration::from_secs(86400));
        let nonce = a.issue("download_media_file_action");
        assert!(!b.verify("download_media_file_action", &nonce));
    }

    #[test]
    fn previous_tick_still_accepted() {
        let guard = guard();
        let now = SystemTime::now();
        let half_life = Duration::from_secs(86400 / 2);

        let nonce = guard.issue_at("download_media_file_action", now);
        assert!(guard.verify_at("download_media_file_action", &nonce, now + half_life));
    }

    #[test]
    fn expired_nonce_rejected() {
        let guard = guard();
        let now = SystemTime::now();

        let nonce = guard.issue_at("download_media_file_action", now);
        let two_ticks = Duration::from_secs(86400);
        assert!(!guard.verify_at("download_media_file_action", &nonce, now + two_ticks + two_ticks));
    }
}
