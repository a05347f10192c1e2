mod common;

use std::sync::Arc;

use leftorium::connectors::cms::MockOperation;
use leftorium::connectors::CmsConnector;
use leftorium::forms::{LoginForm, RegisterForm};
use leftorium::session::{FileTokenStore, MemoryTokenStore, Session, SessionError, TokenStore};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn http(server: &MockServer) -> Arc<dyn CmsConnector> {
    Arc::new(common::cms_client(server, None))
}

/// A stored token is validated against /users/me and the profile merged in.
#[tokio::test]
async fn test_init_restores_user_with_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .and(header("Authorization", "Bearer jwt-ned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "username": "ned", "email": "ned@leftorium.test"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leftorium-users"))
        .and(query_param("filters[user][id][$eq]", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": 8, "documentId": "prof8", "username": "Ned F." }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::init(http(&server), MemoryTokenStore::with_token("jwt-ned"))
        .await
        .unwrap();
    let auth = session.require_user().await.unwrap();
    assert_eq!(auth.user.id, "3");
    assert_eq!(auth.user.username, "Ned F.");
    assert_eq!(auth.profile_id(), Some("prof8"));
}

/// A token the CMS rejects is deleted from storage.
#[tokio::test]
async fn test_init_discards_rejected_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = MemoryTokenStore::with_token("expired");
    let session = Session::init(http(&server), store.clone()).await.unwrap();
    assert!(!session.is_authenticated().await);
    assert_eq!(store.current(), None);
}

/// A missing profile endpoint does not block login.
#[tokio::test]
async fn test_init_without_profile_keeps_auth_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5, "username": "rod", "email": "rod@leftorium.test"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leftorium-users"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = Session::init(http(&server), MemoryTokenStore::with_token("jwt-rod"))
        .await
        .unwrap();
    let user = session.current_user().await.unwrap();
    assert_eq!(user.username, "rod");
    assert!(user.profile_id.is_none());
}

/// Registration succeeds even when the profile record cannot be created.
#[tokio::test]
async fn test_register_with_failing_profile_creation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/local/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jwt": "jwt-maude",
            "user": { "id": 9, "username": "maude", "email": "maude@leftorium.test" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/leftorium-users"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryTokenStore::default();
    let session = Session::init(http(&server), store.clone()).await.unwrap();
    let auth = session
        .register(&RegisterForm {
            username: "maude".into(),
            email: "maude@leftorium.test".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();
    assert_eq!(auth.token, "jwt-maude");
    assert!(auth.profile_id().is_none());
    assert_eq!(store.current().as_deref(), Some("jwt-maude"));
}

/// Login persists the token on disk; a new session picks it up; logout removes it.
#[tokio::test]
async fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let token_path = dir.path().join("leftorium").join("session.json");
    let mock = common::seeded();

    let session = Session::init(mock.clone(), FileTokenStore::new(token_path.clone()))
        .await
        .unwrap();
    session
        .login(&LoginForm {
            identifier: "ned@leftorium.test".into(),
            password: "okilydokily".into(),
        })
        .await
        .unwrap();
    drop(session);

    let restarted = Session::init(mock.clone(), FileTokenStore::new(token_path.clone()))
        .await
        .unwrap();
    let auth = restarted.require_user().await.unwrap();
    assert_eq!(auth.user.username, "ned");
    assert!(auth.profile_id().is_some());

    restarted.logout().await.unwrap();
    assert!(!token_path.exists());
    assert!(matches!(
        restarted.require_user().await,
        Err(SessionError::LoginRequired)
    ));
}

/// An unreachable CMS at start-up keeps the token for the next run.
#[tokio::test]
async fn test_unreachable_cms_keeps_token() {
    let mock = common::seeded();
    let token = mock.token_for("ned").unwrap();
    mock.fail(MockOperation::CurrentUser);
    let store = MemoryTokenStore::with_token(&token);

    let session = Session::init(mock.clone(), store.clone()).await.unwrap();
    assert!(!session.is_authenticated().await);
    assert_eq!(store.load().unwrap(), Some(token));
}

/// A restored session's token is used for the command context's reads.
#[tokio::test]
async fn test_restored_session_reads_with_user_token() {
    use leftorium::cli::context::AppContext;
    use leftorium::configuration::Settings;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3, "username": "ned", "email": "ned@leftorium.test"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leftorium-users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/leftorium-comments"))
        .and(header("Authorization", "Bearer jwt-ned"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let store: Box<dyn TokenStore> = Box::new(MemoryTokenStore::with_token("jwt-ned"));
    let ctx = AppContext::from_parts(Settings::default(), http(&server), store)
        .await
        .unwrap();
    assert!(ctx.session.is_authenticated().await);

    let snapshot = ctx.comments.open("1").await.unwrap();
    assert!(snapshot.items.is_empty());
}
