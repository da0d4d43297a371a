mod common;

use plume_client::{ClientConfig, ClientError, accounts, oauth_apps, posts};
use plume_store::keys;
use plume_types::api::{OAuthAppConfig, UpdatePostRequest};
use plume_types::events::SessionEvent;
use plume_types::models::{OAuthAppCredentials, PostStatus, Session};

#[tokio::test]
async fn bearer_and_tenant_header_off_canonical_host() {
    let backend = common::spawn().await;
    let mut config = ClientConfig::new(&backend.url);
    config.app_host = Some("app.plume.test".into());
    config.base_domain = Some("plume.test".into());
    let sessions = common::session_store(config);
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();

    let list = posts::list(sessions.client(), None).await.unwrap();

    assert_eq!(list.len(), 2);
    let headers = backend.recorded.lock().unwrap().tenant_headers.clone();
    assert_eq!(headers, vec![Some("t-acme".to_string())]);
}

#[tokio::test]
async fn no_tenant_header_on_canonical_host() {
    let backend = common::spawn().await;
    let mut config = ClientConfig::new(&backend.url);
    config.app_host = Some("acme.plume.test".into());
    config.base_domain = Some("plume.test".into());
    let sessions = common::session_store(config);
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();

    posts::list(sessions.client(), Some(PostStatus::Scheduled)).await.unwrap();

    let headers = backend.recorded.lock().unwrap().tenant_headers.clone();
    assert_eq!(headers, vec![None]);
}

#[tokio::test]
async fn unauthorized_response_forces_logout_and_redirect() {
    let backend = common::spawn().await;
    let sessions = common::session_store(ClientConfig::new(&backend.url));
    sessions
        .handle()
        .establish(Session {
            token: "stale-token".into(),
            user: common::user(),
            tenant: common::tenant(),
        })
        .unwrap();
    sessions.client().set_current_path("/accounts");
    let mut events = sessions.client().events().subscribe();

    let err = accounts::connected(sessions.client()).await.unwrap_err();

    assert!(err.is_session_expired());
    assert!(!sessions.handle().is_authenticated());
    assert_eq!(sessions.handle().store().get(keys::AUTH_TOKEN).unwrap(), None);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Expired {
            redirect: "/login?redirect=%2Faccounts".into()
        }
    );
}

#[tokio::test]
async fn server_errors_surface_without_touching_session() {
    let backend = common::spawn().await;
    let sessions = common::session_store(ClientConfig::new(&backend.url));
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();

    let req = plume_types::api::CreatePostRequest {
        content: "please reject me".into(),
        networks: vec!["twitter".into()],
        media_urls: vec![],
        scheduled_at: None,
    };
    let err = posts::create(sessions.client(), &req).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 422, .. }));
    assert_eq!(err.user_message(), "Network rejected the post");

    let req = plume_types::api::CreatePostRequest {
        content: "explode".into(),
        ..req
    };
    let err = posts::create(sessions.client(), &req).await.unwrap_err();
    assert_eq!(err.user_message(), "Something went wrong on our side. Please try again.");

    let req = plume_types::api::CreatePostRequest {
        content: "list errors please".into(),
        ..req
    };
    let err = posts::create(sessions.client(), &req).await.unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 400, .. }));
    assert_eq!(
        err.user_message(),
        "content must not mention lists; networks must be unique"
    );

    assert!(sessions.handle().is_authenticated());
}

#[tokio::test]
async fn posts_and_accounts_round_trip() {
    let backend = common::spawn().await;
    let sessions = common::session_store(ClientConfig::new(&backend.url));
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();
    let client = sessions.client();

    let fetched = posts::get(client, "p-1").await.unwrap();
    assert_eq!(fetched.status, PostStatus::Scheduled);

    posts::delete(client, "p-1").await.unwrap();
    assert_eq!(posts::list(client, None).await.unwrap().len(), 1);

    let missing = posts::get(client, "p-1").await.unwrap_err();
    assert!(matches!(missing, ClientError::Server { status: 404, .. }));

    accounts::disconnect(client, "acc-1").await.unwrap();
    assert!(accounts::connected(client).await.unwrap().is_empty());
}

#[tokio::test]
async fn oauth_config_update_and_urls() {
    let backend = common::spawn().await;
    let sessions = common::session_store(ClientConfig::new(&backend.url));
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();
    let client = sessions.client();

    let mut config = OAuthAppConfig::default();
    config.apps.insert(
        "twitter".into(),
        OAuthAppCredentials {
            client_id: "abc".into(),
            client_secret: Some("shh".into()),
            redirect_uri: None,
            enabled: true,
        },
    );
    oauth_apps::update_config(client, &config).await.unwrap();
    assert_eq!(oauth_apps::config(client).await.unwrap(), config);

    let urls = oauth_apps::authorization_urls(client).await.unwrap();
    assert_eq!(urls[0].network, "twitter");

    let mut bad = config.clone();
    bad.apps.get_mut("twitter").unwrap().client_id.clear();
    let err = oauth_apps::update_config(client, &bad).await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn update_sends_only_changed_fields() {
    let backend = common::spawn().await;
    let sessions = common::session_store(ClientConfig::new(&backend.url));
    sessions.login(common::EMAIL, common::PASSWORD).await.unwrap();
    let client = sessions.client();

    let req = UpdatePostRequest {
        content: Some("edited copy".into()),
        scheduled_at: Some("2026-12-01T09:00:00.000Z".into()),
        ..Default::default()
    };
    let updated = posts::update(client, "p-1", &req).await.unwrap();

    assert_eq!(updated.id, "p-1");
    assert_eq!(updated.content, "edited copy");
    assert_eq!(updated.networks, vec!["twitter".to_string()]);
    assert_eq!(
        updated.scheduled_at.map(|at| at.to_rfc3339()),
        Some("2026-12-01T09:00:00+00:00".to_string())
    );

    let sent = backend.recorded.lock().unwrap().updates.clone();
    assert_eq!(
        sent,
        vec![serde_json::json!({"content": "edited copy", "scheduledAt": "2026-12-01T09:00:00.000Z"})]
    );

    let missing = posts::update(client, "p-404", &UpdatePostRequest::default()).await.unwrap_err();
    assert_eq!(missing.user_message(), "Post not found");
}
