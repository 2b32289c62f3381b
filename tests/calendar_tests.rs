mod common;

use chrono::Utc;
use common::{test_config, CALENDAR_ID};
use linecal::components::google_calendar::{
    Credential, CredentialStore, GoogleCalendarHandle, InMemoryCredentialStore,
};
use linecal::components::{AuthorizationService, CalendarQueryService};
use linecal::error::Error;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinSet;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn events_path() -> String {
    format!("/calendar/v3/calendars/{}/events", CALENDAR_ID)
}

fn credential(access_token: &str, expires_in: i64, refresh_token: Option<&str>) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        expires_at: Utc::now().timestamp() + expires_in,
        scope: Some("https://www.googleapis.com/auth/calendar.readonly".to_string()),
        token_type: Some("Bearer".to_string()),
    }
}

fn handle(server: &MockServer, store: Arc<InMemoryCredentialStore>) -> GoogleCalendarHandle {
    GoogleCalendarHandle::new(Arc::new(test_config(&server.uri())), store).unwrap()
}

fn events_response() -> serde_json::Value {
    json!({
        "kind": "calendar#events",
        "items": [
            {
                "id": "evt1",
                "summary": "Orientation",
                "start": { "dateTime": "2024-05-03T14:05:00+08:00", "timeZone": "Asia/Taipei" },
                "end": { "dateTime": "2024-05-03T15:00:00+08:00" }
            },
            {
                "id": "evt2_20240504",
                "summary": "Weekly standup",
                "start": { "date": "2024-05-04" },
                "end": { "date": "2024-05-05" }
            }
        ]
    })
}

#[tokio::test]
async fn queries_upcoming_events_with_fixed_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(events_path()))
        .and(query_param("maxResults", "100"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(header("authorization", "Bearer ya29.valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_response()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.valid",
        3600,
        Some("1//refresh"),
    )));
    let events = handle(&server, store).upcoming_events().await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "evt1");
    assert_eq!(events[0].start(), Some("2024-05-03T14:05:00+08:00"));
    assert_eq!(events[1].start(), Some("2024-05-04"));

    let requests = server.received_requests().await.unwrap();
    let url = &requests[0].url;
    assert!(url.query_pairs().any(|(k, _)| k == "timeMin"));
    assert!(!url.query_pairs().any(|(k, _)| k == "timeMax"));
}

#[tokio::test]
async fn missing_items_means_no_events() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(events_path()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "kind": "calendar#events" })),
        )
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.valid",
        3600,
        None,
    )));
    assert!(handle(&server, store).upcoming_events().await.unwrap().is_empty());
}

#[tokio::test]
async fn expired_credential_is_refreshed_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "scope": "https://www.googleapis.com/auth/calendar.readonly",
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(events_path()))
        .and(header("authorization", "Bearer ya29.fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_response()))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.stale",
        -10,
        Some("1//refresh"),
    )));
    let events = handle(&server, store.clone()).upcoming_events().await.unwrap();
    assert_eq!(events.len(), 2);

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.access_token, "ya29.fresh");
    // Google omits the refresh token on refresh; the old one is kept
    assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh"));
    assert!(!saved.is_expired());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_queries_refresh_the_credential_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(events_path()))
        .and(header("authorization", "Bearer ya29.fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(events_response()))
        .expect(8)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.stale",
        -10,
        Some("1//refresh"),
    )));
    let calendar = handle(&server, store.clone());

    let mut queries = JoinSet::new();
    for _ in 0..8 {
        let calendar = calendar.clone();
        queries.spawn(async move { calendar.upcoming_events().await });
    }
    while let Some(result) = queries.join_next().await {
        assert_eq!(result.unwrap().unwrap().len(), 2);
    }

    let refreshes = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/token")
        .count();
    assert_eq!(refreshes, 1);
    assert_eq!(store.load().await.unwrap().unwrap().access_token, "ya29.fresh");
}

#[tokio::test]
async fn refresh_failure_is_reported_as_refresh_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked."
        })))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.stale",
        -10,
        Some("1//revoked"),
    )));
    let err = handle(&server, store).upcoming_events().await.unwrap_err();

    assert!(matches!(err, Error::CredentialRefreshFailed(_)));
    assert!(err.is_credential_error());
}

#[tokio::test]
async fn expired_without_refresh_token_is_unavailable() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.stale",
        -10,
        None,
    )));

    let err = handle(&server, store).upcoming_events().await.unwrap_err();

    assert!(matches!(err, Error::CredentialUnavailable(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_credential_is_unavailable() {
    let server = MockServer::start().await;
    let store = Arc::new(InMemoryCredentialStore::default());

    let err = handle(&server, store).upcoming_events().await.unwrap_err();

    assert!(matches!(err, Error::CredentialUnavailable(_)));
}

#[tokio::test]
async fn calendar_error_status_is_a_query_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(events_path()))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::with_credential(credential(
        "ya29.valid",
        3600,
        None,
    )));
    let err = handle(&server, store).upcoming_events().await.unwrap_err();

    assert!(matches!(err, Error::CalendarQueryFailed(_)));
    assert!(!err.is_credential_error());
}

#[tokio::test]
async fn authorization_code_is_exchanged_and_stored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=4%2F0AbC"))
        .and(body_string_contains(
            "redirect_uri=https%3A%2F%2Fbot.example.com%2Fcallback",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.first",
            "refresh_token": "1//long-lived",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::default());
    handle(&server, store.clone()).authorize("4/0AbC").await.unwrap();

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(saved.access_token, "ya29.first");
    assert_eq!(saved.refresh_token.as_deref(), Some("1//long-lived"));
}

#[tokio::test]
async fn rejected_code_is_an_exchange_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "error": "invalid_grant" })))
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryCredentialStore::default());
    let err = handle(&server, store.clone()).authorize("used-code").await.unwrap_err();

    assert!(matches!(err, Error::TokenExchangeFailed(_)));
    assert_eq!(store.load().await.unwrap(), None);
}

#[tokio::test]
async fn authorization_url_requests_offline_read_only_access() {
    let server = MockServer::start().await;
    let url = handle(&server, Arc::new(InMemoryCredentialStore::default()))
        .authorization_url()
        .unwrap();
    let url = url::Url::parse(&url).unwrap();
    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    assert_eq!(url.host_str(), Some("accounts.google.com"));
    assert_eq!(
        param("scope").as_deref(),
        Some("https://www.googleapis.com/auth/calendar.readonly")
    );
    assert_eq!(param("access_type").as_deref(), Some("offline"));
    assert_eq!(param("response_type").as_deref(), Some("code"));
    assert_eq!(
        param("redirect_uri").as_deref(),
        Some("https://bot.example.com/callback")
    );
}
