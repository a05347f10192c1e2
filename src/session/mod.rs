//! Auth session context.
//!
//! One [`Session`] is constructed per application run with [`Session::init`]
//! and torn down with [`Session::logout`]. Operations that need a signed-in
//! user take an [`AuthenticatedUser`] snapshot, so the token never changes
//! under an in-flight request.

mod token_store;

pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_KEY};

use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::connectors::{CmsConnector, ConnectorError};
use crate::forms::{LoginForm, RegisterForm};
use crate::models::User;
use crate::services::background::best_effort;

#[derive(Debug)]
pub enum SessionError {
    Validation(String),
    LoginRequired,
    Connector(ConnectorError),
    Storage(String),
    Io(std::io::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "Invalid input: {msg}"),
            Self::LoginRequired => write!(f, "You need to be logged in. Run: leftorium login"),
            Self::Connector(err) => write!(f, "{err}"),
            Self::Storage(msg) => write!(f, "Session storage error: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ConnectorError> for SessionError {
    fn from(err: ConnectorError) -> Self {
        Self::Connector(err)
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Token plus the identity it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub token: String,
    pub user: User,
}

impl AuthenticatedUser {
    pub fn profile_id(&self) -> Option<&str> {
        self.user.profile_id.as_deref()
    }
}

pub struct Session<S: TokenStore> {
    connector: Arc<dyn CmsConnector>,
    store: S,
    state: RwLock<Option<AuthenticatedUser>>,
}

impl<S: TokenStore> Session<S> {
    /// Restores the persisted session, if any.
    ///
    /// A token the CMS rejects is deleted. A token that could not be checked
    /// because the CMS was unreachable is kept for the next run, but this run
    /// starts anonymous.
    pub async fn init(connector: Arc<dyn CmsConnector>, store: S) -> Result<Self, SessionError> {
        let session = Self {
            connector,
            store,
            state: RwLock::new(None),
        };

        if let Some(token) = session.store.load()? {
            match session.resolve_user(&token).await {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, "restored session");
                    *session.state.write().await = Some(AuthenticatedUser { token, user });
                }
                Err(err) if err.is_transient() => {
                    tracing::warn!("could not validate stored token: {}", err);
                }
                Err(err) => {
                    tracing::warn!("discarding stored token: {}", err);
                    session.store.delete()?;
                }
            }
        }

        Ok(session)
    }

    /// Auth identity with the storefront profile merged over it.
    /// A missing or unreachable profile leaves the auth identity as is.
    async fn resolve_user(&self, token: &str) -> Result<User, ConnectorError> {
        let user = self.connector.current_user(token).await?;
        Ok(self.with_profile(token, user).await)
    }

    async fn with_profile(&self, token: &str, user: User) -> User {
        match best_effort("load_profile", self.connector.find_profile(token, &user.id)).await {
            Some(Some(profile)) => user.merge_profile(profile),
            _ => user,
        }
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AuthenticatedUser, SessionError> {
        form.check().map_err(SessionError::Validation)?;
        let grant = self.connector.login(&form.identifier, &form.password).await?;
        let user = self.with_profile(&grant.jwt, grant.user).await;
        self.establish(grant.jwt, user).await
    }

    /// Creates the auth identity, then links a storefront profile to it.
    /// Profile creation is best-effort: registration succeeds without it.
    pub async fn register(&self, form: &RegisterForm) -> Result<AuthenticatedUser, SessionError> {
        form.check().map_err(SessionError::Validation)?;
        let grant = self
            .connector
            .register(form.username.trim(), form.email.trim(), &form.password)
            .await?;

        let profile = best_effort(
            "create_profile",
            self.connector.create_profile(&grant.jwt, &grant.user),
        )
        .await;
        let user = match profile {
            Some(profile) => grant.user.merge_profile(profile),
            None => grant.user,
        };
        self.establish(grant.jwt, user).await
    }

    async fn establish(&self, token: String, user: User) -> Result<AuthenticatedUser, SessionError> {
        self.store.save(&token)?;
        let authenticated = AuthenticatedUser { token, user };
        tracing::info!(user_id = %authenticated.user.id, "session established");
        *self.state.write().await = Some(authenticated.clone());
        Ok(authenticated)
    }

    /// Forgets the token locally. The CMS keeps no server-side session.
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.store.delete()?;
        *self.state.write().await = None;
        tracing::info!("session closed");
        Ok(())
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_some()
    }

    pub async fn require_user(&self) -> Result<AuthenticatedUser, SessionError> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(SessionError::LoginRequired)
    }

    /// Current token, if any, for anonymous-capable reads.
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.as_ref().map(|s| s.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectors::cms::{MockCmsConnector, MockOperation};

    fn login_form(identifier: &str, password: &str) -> LoginForm {
        LoginForm {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn init_without_token_is_anonymous() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let session = Session::init(mock, MemoryTokenStore::default()).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert!(matches!(
            session.require_user().await,
            Err(SessionError::LoginRequired)
        ));
    }

    #[tokio::test]
    async fn init_restores_valid_token_with_profile() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let token = mock.token_for("ned").unwrap();
        let session = Session::init(mock, MemoryTokenStore::with_token(&token))
            .await
            .unwrap();

        let auth = session.require_user().await.unwrap();
        assert_eq!(auth.user.username, "ned");
        assert!(auth.profile_id().is_some());
    }

    #[tokio::test]
    async fn init_discards_rejected_token() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let store = MemoryTokenStore::with_token("stale");
        let session = Session::init(mock, store.clone()).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(store.current(), None);
    }

    #[tokio::test]
    async fn init_keeps_token_when_cms_unreachable() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let token = mock.token_for("ned").unwrap();
        mock.fail(MockOperation::CurrentUser);
        let store = MemoryTokenStore::with_token(&token);
        let session = Session::init(mock, store.clone()).await.unwrap();
        assert!(!session.is_authenticated().await);
        assert_eq!(store.current(), Some(token));
    }

    #[tokio::test]
    async fn login_persists_token_and_logout_clears_it() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let store = MemoryTokenStore::default();
        let session = Session::init(mock.clone(), store.clone()).await.unwrap();

        let auth = session.login(&login_form("ned", "okilydokily")).await.unwrap();
        assert_eq!(store.current(), Some(auth.token.clone()));
        assert!(auth.profile_id().is_some());
        assert_eq!(session.token().await, Some(auth.token));

        session.logout().await.unwrap();
        assert_eq!(store.current(), None);
        assert!(session.current_user().await.is_none());
    }

    #[tokio::test]
    async fn failed_login_leaves_state_untouched() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let store = MemoryTokenStore::default();
        let session = Session::init(mock, store.clone()).await.unwrap();

        let err = session.login(&login_form("ned", "wrong")).await.unwrap_err();
        assert!(matches!(err, SessionError::Connector(_)));
        assert_eq!(store.current(), None);
        assert!(!session.is_authenticated().await);

        let err = session.login(&login_form("", "pw")).await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[tokio::test]
    async fn register_survives_profile_failure() {
        let mock = Arc::new(MockCmsConnector::seeded());
        mock.fail(MockOperation::CreateProfile);
        let session = Session::init(mock.clone(), MemoryTokenStore::default())
            .await
            .unwrap();

        let auth = session
            .register(&RegisterForm {
                username: "rod".into(),
                email: "rod@leftorium.test".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert_eq!(auth.user.username, "rod");
        assert!(auth.profile_id().is_none());
        assert_eq!(mock.calls(MockOperation::CreateProfile), 1);
    }

    #[tokio::test]
    async fn register_links_profile() {
        let mock = Arc::new(MockCmsConnector::seeded());
        let session = Session::init(mock, MemoryTokenStore::default()).await.unwrap();

        let auth = session
            .register(&RegisterForm {
                username: "todd".into(),
                email: "todd@leftorium.test".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert!(auth.profile_id().is_some());
    }
}
