//! Server-side session store.
//!
//! Sessions live in memory, keyed by an opaque random key that the HTTP layer
//! carries in the session cookie. A session holds the authenticated staff id
//! and the flash messages waiting to be shown.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::messages::FlashMessage;
use crate::api::StaffId;

/// Session lifetime used when none is configured: two weeks.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 14;

/// Longest accepted session lifetime: ten years. Larger values are clamped.
pub const MAX_SESSION_TTL_SECS: u64 = 60 * 60 * 24 * 365 * 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub key: String,
    pub staff_id: Option<StaffId>,
    pub messages: Vec<FlashMessage>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    fn new(ttl: Duration) -> Self {
        Self {
            key: new_session_key(),
            staff_id: None,
            messages: Vec::new(),
            expires_at: expiry_after(Utc::now(), ttl),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_authenticated(&self) -> bool {
        self.staff_id.is_some()
    }
}

/// `now + ttl`, saturating at the latest representable instant.
fn expiry_after(now: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn new_session_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// In-memory session store shared by all request handlers.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl: Duration::seconds(ttl_secs.min(MAX_SESSION_TTL_SECS) as i64),
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Look up a live session. An expired session is removed and not returned.
    pub fn get(&self, key: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read();
            match sessions.get(key) {
                Some(session) if !session.is_expired(now) => return Some(session.clone()),
                None => return None,
                Some(_) => {}
            }
        }
        self.sessions.write().remove(key);
        None
    }

    /// The live session for `key`, or a freshly created empty one.
    pub fn load_or_create(&self, key: Option<&str>) -> Session {
        if let Some(session) = key.and_then(|k| self.get(k)) {
            return session;
        }
        let session = Session::new(self.ttl);
        self.sessions
            .write()
            .insert(session.key.clone(), session.clone());
        session
    }

    /// Apply `f` to a live session and extend its expiry. Returns `false` when
    /// the session does not exist.
    pub fn update<F>(&self, key: &str, f: F) -> bool
    where
        F: FnOnce(&mut Session),
    {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        match sessions.get_mut(key) {
            Some(session) if !session.is_expired(now) => {
                f(session);
                session.expires_at = expiry_after(now, self.ttl);
                true
            }
            _ => false,
        }
    }

    /// Authenticate a session under a new key, keeping pending messages.
    ///
    /// The previous key stops working so a session id captured before login
    /// cannot be reused.
    pub fn login(&self, key: Option<&str>, staff_id: StaffId) -> Session {
        let mut sessions = self.sessions.write();
        let previous = key.and_then(|k| sessions.remove(k));
        let mut session = Session::new(self.ttl);
        if let Some(previous) = previous {
            session.messages = previous.messages;
        }
        session.staff_id = Some(staff_id);
        sessions.insert(session.key.clone(), session.clone());
        session
    }

    /// Discard a session entirely and start an empty one under a new key.
    pub fn flush(&self, key: Option<&str>) -> Session {
        let mut sessions = self.sessions.write();
        if let Some(key) = key {
            sessions.remove(key);
        }
        let session = Session::new(self.ttl);
        sessions.insert(session.key.clone(), session.clone());
        session
    }

    /// Queue a message on a session.
    pub fn push_message(&self, key: &str, message: FlashMessage) -> bool {
        self.update(key, |session| session.messages.push(message))
    }

    /// Remove and return the queued messages of a session.
    pub fn take_messages(&self, key: &str) -> Vec<FlashMessage> {
        let mut taken = Vec::new();
        self.update(key, |session| taken = std::mem::take(&mut session.messages));
        taken
    }

    /// Drop every expired session, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn expire(&self, key: &str) {
        if let Some(session) = self.sessions.write().get_mut(key) {
            session.expires_at = Utc::now() - Duration::seconds(1);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL_SECS)
    }
}
