use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use rand_core::{OsRng, RngCore};
use tokio::sync::RwLock;

const TOKEN_BYTES: usize = 32;

/// In-memory session store. Tokens live until their TTL elapses and the
/// whole map dies with the process; there is deliberately no persistence.
#[derive(Clone)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Issue a fresh unguessable token and record its expiry. Inserts take
    /// the exclusive lock; lookups only need the shared one.
    pub async fn create(&self) -> String {
        let token = generate_token();
        let expires_at = Utc::now() + self.ttl;

        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), expires_at);
        token
    }

    /// A token is valid iff it is present and has not expired. Unknown and
    /// expired tokens are indistinguishable to the caller.
    pub async fn is_valid(&self, token: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .is_some_and(|expiry| Utc::now() < *expiry)
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, expiry| now < *expiry);
        before - sessions.len()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
