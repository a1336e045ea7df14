//! Expiration policies.
//!
//! A policy is attached to a ticket at creation time and never changes.
//! Expiry is a pure function of the ticket's usage state and the caller's
//! "now"; there is no hidden clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Usage snapshot a policy is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct TicketActivity {
    /// When the ticket was created.
    pub created_at: DateTime<Utc>,
    /// When the ticket was last used (creation time if never used).
    pub last_used_at: DateTime<Utc>,
    /// How many times the ticket has been used.
    pub use_count: u32,
}

/// Per-ticket expiration strategy.
///
/// Each bound expires the ticket independently (logical OR), and all time
/// comparisons are inclusive: a ticket exactly at its idle window, lifetime,
/// or use limit is expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ExpirationPolicy {
    /// The ticket never expires on its own.
    NeverExpires,
    /// The ticket is expired from the moment it is evaluated.
    AlwaysExpires,
    /// Expired once idle for the given window.
    IdleTimeout {
        /// Seconds of inactivity allowed.
        idle_seconds: u64,
    },
    /// Expired once the given lifetime has elapsed, regardless of use.
    HardTimeout {
        /// Maximum lifetime in seconds.
        max_lifetime_seconds: u64,
    },
    /// Session policy: an idle window and an absolute lifetime.
    SessionWindow {
        /// Seconds of inactivity allowed.
        idle_seconds: u64,
        /// Maximum lifetime in seconds.
        max_lifetime_seconds: u64,
    },
    /// Grant policy: a use limit and a time-to-live from creation.
    UseCountOrTimeout {
        /// Uses after which the ticket is spent.
        max_uses: u32,
        /// Seconds from creation after which the ticket expires unused.
        ttl_seconds: u64,
    },
}

impl ExpirationPolicy {
    /// Evaluate the policy against a usage snapshot.
    pub fn is_expired(&self, activity: &TicketActivity, now: DateTime<Utc>) -> bool {
        match self {
            Self::NeverExpires => false,
            Self::AlwaysExpires => true,
            Self::IdleTimeout { idle_seconds } => idle_elapsed(activity, now) >= *idle_seconds as i64,
            Self::HardTimeout {
                max_lifetime_seconds,
            } => lifetime_elapsed(activity, now) >= *max_lifetime_seconds as i64,
            Self::SessionWindow {
                idle_seconds,
                max_lifetime_seconds,
            } => {
                idle_elapsed(activity, now) >= *idle_seconds as i64
                    || lifetime_elapsed(activity, now) >= *max_lifetime_seconds as i64
            }
            Self::UseCountOrTimeout { max_uses, ttl_seconds } => {
                activity.use_count >= *max_uses
                    || lifetime_elapsed(activity, now) >= *ttl_seconds as i64
            }
        }
    }
}

fn idle_elapsed(activity: &TicketActivity, now: DateTime<Utc>) -> i64 {
    (now - activity.last_used_at).num_seconds()
}

fn lifetime_elapsed(activity: &TicketActivity, now: DateTime<Utc>) -> i64 {
    (now - activity.created_at).num_seconds()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn activity(created_ago: i64, used_ago: i64, uses: u32) -> (TicketActivity, DateTime<Utc>) {
        let now = Utc::now();
        (
            TicketActivity {
                created_at: now - Duration::seconds(created_ago),
                last_used_at: now - Duration::seconds(used_ago),
                use_count: uses,
            },
            now,
        )
    }

    #[test]
    fn test_never_and_always() {
        let (state, now) = activity(100_000, 100_000, 1000);
        assert!(!ExpirationPolicy::NeverExpires.is_expired(&state, now));
        let (state, now) = activity(0, 0, 0);
        assert!(ExpirationPolicy::AlwaysExpires.is_expired(&state, now));
    }

    #[test]
    fn test_idle_timeout_boundary_inclusive() {
        let policy = ExpirationPolicy::IdleTimeout { idle_seconds: 30 };
        let (state, now) = activity(60, 29, 0);
        assert!(!policy.is_expired(&state, now));
        let (state, now) = activity(60, 30, 0);
        assert!(policy.is_expired(&state, now));
        let (state, now) = activity(60, 31, 0);
        assert!(policy.is_expired(&state, now));
    }

    #[test]
    fn test_hard_timeout_ignores_activity() {
        let policy = ExpirationPolicy::HardTimeout {
            max_lifetime_seconds: 60,
        };
        let (state, now) = activity(59, 0, 0);
        assert!(!policy.is_expired(&state, now));
        let (state, now) = activity(60, 0, 0);
        assert!(policy.is_expired(&state, now));
    }

    #[test]
    fn test_session_window_either_bound() {
        let policy = ExpirationPolicy::SessionWindow {
            idle_seconds: 30,
            max_lifetime_seconds: 120,
        };
        // Fresh on both bounds.
        let (state, now) = activity(100, 10, 5);
        assert!(!policy.is_expired(&state, now));
        // Idle bound tripped.
        let (state, now) = activity(100, 30, 5);
        assert!(policy.is_expired(&state, now));
        // Lifetime bound tripped despite recent use.
        let (state, now) = activity(120, 1, 5);
        assert!(policy.is_expired(&state, now));
    }

    #[test]
    fn test_use_count_or_timeout() {
        let policy = ExpirationPolicy::UseCountOrTimeout {
            max_uses: 1,
            ttl_seconds: 10,
        };
        let (state, now) = activity(5, 5, 0);
        assert!(!policy.is_expired(&state, now));
        // Spent by use.
        let (state, now) = activity(5, 0, 1);
        assert!(policy.is_expired(&state, now));
        // Spent by time.
        let (state, now) = activity(10, 10, 0);
        assert!(policy.is_expired(&state, now));
    }

    #[test]
    fn test_policy_serde_roundtrip() {
        let policy = ExpirationPolicy::SessionWindow {
            idle_seconds: 7200,
            max_lifetime_seconds: 28800,
        };
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("session_window"));
        let back: ExpirationPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
