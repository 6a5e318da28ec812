//! Connection lifecycle policy: when to reconnect and how long to wait.

use std::{fmt, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The credential was revoked or rejected; reconnecting cannot help.
    LoggedOut,
    ConnectionLost(String),
    Other(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::LoggedOut => f.write_str("logged out"),
            DisconnectReason::ConnectionLost(why) => write!(f, "connection lost: {why}"),
            DisconnectReason::Other(why) => f.write_str(why),
        }
    }
}

/// Reconnect on every close except a terminal logout.
pub fn should_reconnect(reason: &DisconnectReason) -> bool {
    !matches!(reason, DisconnectReason::LoggedOut)
}

#[derive(Clone, Copy, Debug)]
pub struct ReconnectPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// Exponential backoff for the given 0-based attempt, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(31)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `attempts` failures.
    pub fn allows(&self, attempts: u32) -> bool {
        self.max_attempts.map_or(true, |max| attempts < max)
    }

    /// Delay before the next attempt, or `None` when the reason is terminal or
    /// the attempt budget is spent.
    pub fn next_delay(&self, reason: &DisconnectReason, attempts: u32) -> Option<Duration> {
        if !should_reconnect(reason) || !self.allows(attempts) {
            return None;
        }
        Some(self.delay_for(attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logout_is_terminal() {
        assert!(!should_reconnect(&DisconnectReason::LoggedOut));
        assert!(should_reconnect(&DisconnectReason::ConnectionLost("reset".into())));
        assert!(should_reconnect(&DisconnectReason::Other("restart required".into())));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = ReconnectPolicy {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
            max_attempts: None,
        };
        assert_eq!(p.delay_for(0), Duration::from_millis(500));
        assert_eq!(p.delay_for(1), Duration::from_secs(1));
        assert_eq!(p.delay_for(2), Duration::from_secs(2));
        assert_eq!(p.delay_for(3), Duration::from_secs(3));
        assert_eq!(p.delay_for(40), Duration::from_secs(3));
    }

    #[test]
    fn next_delay_respects_budget_and_reason() {
        let p = ReconnectPolicy {
            max_attempts: Some(2),
            ..ReconnectPolicy::default()
        };
        let lost = DisconnectReason::ConnectionLost("timeout".into());
        assert!(p.next_delay(&lost, 0).is_some());
        assert!(p.next_delay(&lost, 1).is_some());
        assert!(p.next_delay(&lost, 2).is_none());
        assert!(p.next_delay(&DisconnectReason::LoggedOut, 0).is_none());
    }
}
