use std::collections::HashMap;
use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::roles::Role;

/// Authenticated context bound to one client, established only after
/// credential verification.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub role: Role,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// In-process session table keyed by opaque bearer token. The only state
/// shared across requests besides the database pool.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    /// Establishes a session under a freshly generated token. A new token is
    /// minted on every login, so a pre-login token can never become
    /// authenticated (fixation mitigation).
    pub async fn create(&self, user_id: i64, role: Role, name: String) -> Uuid {
        let token = Uuid::new_v4();
        let session = Session {
            user_id,
            role,
            name,
            created_at: OffsetDateTime::now_utc(),
        };
        debug!(%token, user_id, created_at = %session.created_at, "session created");
        self.inner.write().await.insert(token, session);
        token
    }

    pub async fn get(&self, token: Uuid) -> Option<Session> {
        self.inner.read().await.get(&token).cloned()
    }

    /// Idempotent; destroying an unknown token is a no-op.
    pub async fn destroy(&self, token: Uuid) {
        if self.inner.write().await.remove(&token).is_some() {
            debug!(%token, "session destroyed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_then_get_returns_the_session() {
        let store = SessionStore::default();
        let token = store.create(7, Role::Admin, "Alice".into()).await;
        let session = store.get(token).await.expect("session should exist");
        assert_eq!(session.user_id, 7);
        assert_eq!(session.role, Role::Admin);
        assert_eq!(session.name, "Alice");
        assert!(session.created_at <= OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn every_login_mints_a_distinct_token() {
        let store = SessionStore::default();
        let a = store.create(1, Role::Admin, "A".into()).await;
        let b = store.create(1, Role::Admin, "A".into()).await;
        assert_ne!(a, b);
        // Both remain resolvable until destroyed.
        assert!(store.get(a).await.is_some());
        assert!(store.get(b).await.is_some());
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = SessionStore::default();
        let token = store.create(1, Role::Customer, "B".into()).await;
        store.destroy(token).await;
        assert!(store.get(token).await.is_none());
        // Second destroy of the same token must not panic or error.
        store.destroy(token).await;
        assert!(store.get(token).await.is_none());
    }

    #[tokio::test]
    async fn unknown_token_resolves_to_none() {
        let store = SessionStore::default();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }
}
