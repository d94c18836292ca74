use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::session::{Session, SessionStore};
use crate::error::AppError;
use crate::state::AppState;

impl FromRef<AppState> for SessionStore {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

fn bearer_token(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            // Scheme is case-insensitive per RFC 7235.
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token)
        })
        .and_then(|t| Uuid::parse_str(t.trim()).ok())
}

/// Authenticated caller; rejects with `Unauthenticated` when no valid
/// session backs the presented token.
#[derive(Debug)]
pub struct CurrentUser {
    pub token: Uuid,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        let token = bearer_token(parts).ok_or(AppError::Unauthenticated)?;
        let session = sessions.get(token).await.ok_or_else(|| {
            warn!(%token, "unknown or expired session token");
            AppError::Unauthenticated
        })?;
        Ok(CurrentUser { token, session })
    }
}

/// Authenticated caller with the admin role; the gate for every category
/// mutation and read.
#[derive(Debug)]
pub struct AdminUser {
    pub token: Uuid,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentUser { token, session } = CurrentUser::from_request_parts(parts, state).await?;
        if !session.role.is_admin() {
            warn!(user_id = session.user_id, "non-admin denied");
            return Err(AppError::Forbidden);
        }
        Ok(AdminUser { token, session })
    }
}

/// Optional session; register/login use it to reject callers that are
/// already authenticated. A missing or malformed token is simply `None`.
#[derive(Debug)]
pub struct MaybeUser(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SessionStore: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionStore::from_ref(state);
        let session = match bearer_token(parts) {
            Some(token) => sessions.get(token).await,
            None => None,
        };
        Ok(MaybeUser(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::roles::Role;
    use axum::http::{header::AUTHORIZATION, Request};

    fn parts_with_auth(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn current_user_resolves_a_live_session() {
        let state = AppState::fake();
        let token = state.sessions.create(3, Role::Admin, "A".into()).await;
        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        let user = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("should authenticate");
        assert_eq!(user.token, token);
        assert_eq!(user.session.user_id, 3);
    }

    #[tokio::test]
    async fn bearer_scheme_is_case_insensitive() {
        let state = AppState::fake();
        let token = state.sessions.create(5, Role::Admin, "A".into()).await;
        for scheme in ["bearer", "BEARER", "Bearer"] {
            let mut parts = parts_with_auth(Some(format!("{scheme} {token}")));
            let user = CurrentUser::from_request_parts(&mut parts, &state)
                .await
                .expect("scheme case should not matter");
            assert_eq!(user.session.user_id, 5);
        }
    }

    #[tokio::test]
    async fn missing_header_is_unauthenticated() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn destroyed_session_is_unauthenticated() {
        let state = AppState::fake();
        let token = state.sessions.create(3, Role::Admin, "A".into()).await;
        state.sessions.destroy(token).await;
        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthenticated));
    }

    #[tokio::test]
    async fn admin_gate_rejects_customers() {
        let state = AppState::fake();
        let token = state.sessions.create(4, Role::Customer, "C".into()).await;
        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        let err = AdminUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[tokio::test]
    async fn admin_gate_accepts_admins() {
        let state = AppState::fake();
        let token = state.sessions.create(4, Role::Admin, "A".into()).await;
        let mut parts = parts_with_auth(Some(format!("Bearer {token}")));
        assert!(AdminUser::from_request_parts(&mut parts, &state)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn maybe_user_is_none_for_garbage_tokens() {
        let state = AppState::fake();
        let mut parts = parts_with_auth(Some("Bearer not-a-uuid".into()));
        let MaybeUser(session) = MaybeUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(session.is_none());
    }
}
