use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bloom_core::{ConversationSession, ConversationTurn};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

#[derive(Debug)]
struct SessionEntry {
    session: ConversationSession,
    last_active: DateTime<Utc>,
}

impl SessionEntry {
    fn new(session: ConversationSession, now: DateTime<Utc>) -> Self {
        Self {
            session,
            last_active: now,
        }
    }
}

/// In-memory conversation sessions for the HTTP host, one per client
/// interaction.
#[derive(Debug, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Runs `f` against the session named `session_id`, creating it when
    /// missing. The store stays locked for the duration of `f`.
    pub fn with_session<R>(
        &self,
        session_id: Option<&str>,
        f: impl FnOnce(&mut ConversationSession) -> R,
    ) -> R {
        let now = Utc::now();
        let mut sessions = self.sessions.write();

        let entry = match session_id {
            Some(id) => sessions
                .entry(id.to_string())
                .or_insert_with(|| SessionEntry::new(ConversationSession::with_id(id), now)),
            None => {
                let session = ConversationSession::new();
                sessions
                    .entry(session.session_id().to_string())
                    .or_insert_with(move || SessionEntry::new(session, now))
            }
        };
        entry.last_active = now;
        f(&mut entry.session)
    }

    pub fn transcript(&self, session_id: &str) -> Option<Vec<ConversationTurn>> {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| entry.session.turns().to_vec())
    }

    pub fn purge_expired(&self, now: DateTime<Utc>) -> u64 {
        let mut removed = 0_u64;
        self.sessions.write().retain(|_, entry| {
            let idle = (now - entry.last_active).to_std().unwrap_or_default();
            let keep = idle < self.ttl;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
