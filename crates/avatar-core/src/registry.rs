//! Session registry: process-local map from session id to the bearer token that
//! authorizes it. Built once per process and shared by `Arc`.

use std::fmt;

use dashmap::DashMap;

use crate::error::{AvatarError, AvatarResult};

/// Opaque per-session bearer credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token for the `Authorization` header. Do not log.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(***)")
    }
}

/// Open sessions known to this process. Operations on distinct ids never block each
/// other; writes to the same id are last-write-wins.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionToken>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session, replacing any previous token for the same id.
    pub fn put(&self, session_id: impl Into<String>, token: SessionToken) {
        let session_id = session_id.into();
        if self.sessions.insert(session_id.clone(), token).is_some() {
            tracing::debug!(%session_id, "registry: replaced existing session token");
        }
    }

    pub fn get(&self, session_id: &str) -> Option<SessionToken> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    /// Like [`get`](Self::get) but an unknown id is an error, never an empty token.
    pub fn require(&self, session_id: &str) -> AvatarResult<SessionToken> {
        self.get(session_id)
            .ok_or_else(|| AvatarError::NotFound(format!("unknown session_id: {}", session_id)))
    }

    /// Unconditional removal. Returns the token if one was present.
    pub fn remove(&self, session_id: &str) -> Option<SessionToken> {
        self.sessions.remove(session_id).map(|(_, token)| token)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn put_overwrites() {
        let reg = SessionRegistry::new();
        reg.put("s1", SessionToken::new("a"));
        reg.put("s1", SessionToken::new("b"));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get("s1").unwrap().expose(), "b");
    }

    #[test]
    fn unknown_session_is_not_found() {
        let reg = SessionRegistry::new();
        assert!(reg.get("missing").is_none());
        assert!(matches!(reg.require("missing"), Err(AvatarError::NotFound(_))));
    }

    #[test]
    fn remove_is_unconditional() {
        let reg = SessionRegistry::new();
        reg.put("s1", SessionToken::new("a"));
        assert!(reg.remove("s1").is_some());
        assert!(reg.remove("s1").is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn token_debug_is_redacted() {
        let t = SessionToken::new("very-secret");
        assert!(!format!("{:?}", t).contains("very-secret"));
    }

    #[tokio::test]
    async fn distinct_ids_do_not_interfere_across_tasks() {
        let reg = Arc::new(SessionRegistry::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let reg = Arc::clone(&reg);
            handles.push(tokio::spawn(async move {
                let id = format!("s{}", i);
                reg.put(id.clone(), SessionToken::new(format!("t{}", i)));
                assert_eq!(reg.get(&id).unwrap().expose(), format!("t{}", i));
                if i % 2 == 0 {
                    reg.remove(&id);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(reg.len(), 16);
        assert!(reg.contains("s1"));
        assert!(!reg.contains("s0"));
    }
}
