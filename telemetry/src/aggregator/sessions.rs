//! Active-session tracking.
//!
//! Maps a user identity to the last time it was seen authenticating. Entries
//! only leave the map on explicit removal or through [`SessionTracker::sweep_expired`].

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Default inactivity threshold, in seconds, after which a session is swept.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 300;

/// [`DEFAULT_SESSION_TTL_SECS`] as a `Duration`.
#[must_use]
pub fn default_session_ttl() -> Duration {
    Duration::seconds(DEFAULT_SESSION_TTL_SECS)
}

/// Last-seen timestamps per user.
#[derive(Debug, Default)]
pub struct SessionTracker {
    last_seen: HashMap<String, DateTime<Utc>>,
    override_count: Option<u64>,
}

impl SessionTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records activity for `user_id` at `now`. `None` is ignored.
    ///
    /// A repeated identity updates its timestamp and is never counted twice.
    pub fn mark_active(&mut self, user_id: Option<&str>, now: DateTime<Utc>) {
        let Some(user_id) = user_id else {
            return;
        };
        self.last_seen.insert(user_id.to_string(), now);
        self.override_count = None;
    }

    /// Forgets `user_id`. Unknown or absent identities are ignored.
    pub fn remove(&mut self, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            return;
        };
        self.last_seen.remove(user_id);
        self.override_count = None;
    }

    /// Removes every session last seen before `now - threshold`.
    ///
    /// Returns the number of sessions removed. A threshold reaching past the
    /// earliest representable time removes nothing.
    pub fn sweep_expired(&mut self, now: DateTime<Utc>, threshold: Duration) -> usize {
        let Some(cutoff) = now.checked_sub_signed(threshold) else {
            return 0;
        };
        let before = self.last_seen.len();
        self.last_seen.retain(|_, last_seen| *last_seen >= cutoff);
        let removed = before - self.last_seen.len();
        if removed > 0 {
            self.override_count = None;
        }
        removed
    }

    /// Live number of tracked sessions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.last_seen.len()
    }

    /// Returns true if `user_id` currently has a session.
    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.last_seen.contains_key(user_id)
    }

    /// Overrides the reported active-user count without touching the map.
    ///
    /// The override holds until the map changes again.
    pub fn set_override(&mut self, count: u64) {
        self.override_count = Some(count);
    }

    /// The value exported as the active-user gauge.
    #[must_use]
    pub fn reported_count(&self) -> u64 {
        self.override_count
            .unwrap_or_else(|| u64::try_from(self.last_seen.len()).unwrap_or(u64::MAX))
    }
}
