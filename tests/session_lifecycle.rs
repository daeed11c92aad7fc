//! End-to-End Session Lifecycle Tests
//!
//! This module tests the complete session lifecycle against a mock
//! backend and a real on-disk token store:
//! 1. Cold start with no persisted token
//! 2. Login, token persistence, cache wipe
//! 3. Process restart and re-hydration from the persisted token
//! 4. Fail-closed hydration on a revoked token
//! 5. Profile update round-trip
//! 6. Quote caching across the query layer
//!
//! # Running the tests
//! ```bash
//! cargo test --test session_lifecycle
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tempfile::TempDir;

use stockdash::api::{ApiClient, ProfileUpdate};
use stockdash::core::{
    FileTokenStore, MarketDataService, QueryCache, SessionManager, TokenStore,
};

// =============================================================================
// Fixtures
// =============================================================================

fn user_json(username: &str, name: &str) -> serde_json::Value {
    json!({
        "id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
        "username": username,
        "email": format!("{}@example.com", username),
        "name": name,
        "subscription": {
            "tier": "pro",
            "status": "active",
            "expiresAt": "2026-12-31T00:00:00Z"
        },
        "settings": {
            "theme": "dark",
            "notifications": {"email": true, "push": false, "webhook": false},
            "defaultExchange": "NASDAQ",
            "defaultAssets": ["AAPL", "MSFT"]
        }
    })
}

fn auth_body(token: &str, username: &str) -> String {
    json!({
        "token": token,
        "user": user_json(username, "Demo Trader")
    })
    .to_string()
}

/// Build the full client stack against a mock server, with the token
/// file inside the given temp dir so runs never see each other's state
fn build_stack(
    server_url: &str,
    dir: &TempDir,
) -> (
    Arc<SessionManager<ApiClient, FileTokenStore>>,
    Arc<QueryCache>,
    ApiClient,
) {
    let client = ApiClient::new(server_url);
    let cache = Arc::new(QueryCache::new(Duration::from_secs(60)));
    let store = FileTokenStore::new(dir.path().join("token"));
    let manager = Arc::new(SessionManager::new(
        client.clone(),
        store,
        Arc::clone(&cache),
    ));
    (manager, cache, client)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_cold_start_is_unauthenticated_without_network() {
    let server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let (manager, _cache, _client) = build_stack(&server.url(), &dir);

    // No mocks registered: any request would fail the test loudly
    let session = manager.hydrate().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(!session.is_loading);
}

#[tokio::test]
async fn test_login_persists_token_and_survives_restart() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(auth_body("session-token-1", "demo"))
        .create_async()
        .await;

    // First "process": log in
    {
        let (manager, cache, _client) = build_stack(&server.url(), &dir);
        cache.insert("quotes:AAPL", &"pre-login data").await.unwrap();

        let user = manager.login("demo", "password").await.unwrap();
        assert_eq!(user.username, "demo");
        assert!(manager.is_authenticated().await);

        // Identity changed, cache must be empty
        assert!(cache.is_empty().await);
    }
    login_mock.assert_async().await;

    // Token landed on disk
    let store = FileTokenStore::new(dir.path().join("token"));
    assert_eq!(store.load().unwrap(), Some("session-token-1".to_string()));

    // Second "process": hydrate from the persisted token
    let me_mock = server
        .mock("GET", "/api/auth/me")
        .match_header("authorization", "Bearer session-token-1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(user_json("demo", "Demo Trader").to_string())
        .create_async()
        .await;

    let (manager, _cache, _client) = build_stack(&server.url(), &dir);
    let session = manager.hydrate().await.unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.user.unwrap().username, "demo");
    me_mock.assert_async().await;
}

#[tokio::test]
async fn test_revoked_token_fails_closed_and_clears_disk() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    // A previous run left a token that the backend no longer accepts
    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("revoked-token").unwrap();

    let me_mock = server
        .mock("GET", "/api/auth/me")
        .with_status(401)
        .with_body("token revoked")
        .create_async()
        .await;

    let (manager, _cache, _client) = build_stack(&server.url(), &dir);
    let session = manager.hydrate().await.unwrap();

    assert!(!session.is_authenticated());
    assert!(session.token.is_none());
    // The dead token must not survive to the next startup
    assert_eq!(store.load().unwrap(), None);
    me_mock.assert_async().await;
}

#[tokio::test]
async fn test_backend_outage_also_fails_closed() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let store = FileTokenStore::new(dir.path().join("token"));
    store.save("maybe-fine-token").unwrap();

    let _me_mock = server
        .mock("GET", "/api/auth/me")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let (manager, _cache, _client) = build_stack(&server.url(), &dir);
    let session = manager.hydrate().await.unwrap();

    // No distinction between revoked and unreachable: logged out either way
    assert!(!session.is_authenticated());
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_disk_and_cache() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let _login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(auth_body("tok", "demo"))
        .create_async()
        .await;

    let (manager, cache, _client) = build_stack(&server.url(), &dir);
    manager.login("demo", "password").await.unwrap();
    cache.insert("quotes:AAPL", &"data").await.unwrap();

    manager.logout().await;

    assert!(!manager.is_authenticated().await);
    assert!(cache.is_empty().await);
    let store = FileTokenStore::new(dir.path().join("token"));
    assert_eq!(store.load().unwrap(), None);
}

#[tokio::test]
async fn test_rejected_login_changes_nothing() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let _login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body("bad credentials")
        .create_async()
        .await;

    let (manager, _cache, _client) = build_stack(&server.url(), &dir);
    let result = manager.login("demo", "wrong-password").await;

    assert!(result.is_err());
    assert!(!manager.is_authenticated().await);
    let store = FileTokenStore::new(dir.path().join("token"));
    assert_eq!(store.load().unwrap(), None);
}

// =============================================================================
// Profile Update
// =============================================================================

#[tokio::test]
async fn test_profile_update_roundtrip() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let _login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(auth_body("tok", "demo"))
        .create_async()
        .await;

    let update_mock = server
        .mock("PUT", "/api/users/profile")
        .match_header("authorization", "Bearer tok")
        .match_body(mockito::Matcher::JsonString(
            r#"{"name": "Renamed Trader"}"#.to_string(),
        ))
        .with_status(200)
        .with_body(user_json("demo", "Renamed Trader").to_string())
        .create_async()
        .await;

    let (manager, _cache, _client) = build_stack(&server.url(), &dir);
    manager.login("demo", "password").await.unwrap();

    let update = ProfileUpdate {
        name: Some("Renamed Trader".to_string()),
        ..Default::default()
    };
    let updated = manager.update_user(&update).await.unwrap();

    assert_eq!(updated.name.as_deref(), Some("Renamed Trader"));
    let session = manager.snapshot().await;
    assert_eq!(
        session.user.unwrap().name.as_deref(),
        Some("Renamed Trader")
    );
    update_mock.assert_async().await;
}

// =============================================================================
// Query Layer
// =============================================================================

#[tokio::test]
async fn test_quote_reads_are_cached_across_the_stack() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let _login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(auth_body("tok", "demo"))
        .create_async()
        .await;

    let quotes_mock = server
        .mock("GET", "/api/market/quotes")
        .match_query(mockito::Matcher::UrlEncoded(
            "symbols".to_string(),
            "AAPL".to_string(),
        ))
        .with_status(200)
        .with_body(
            json!([{
                "symbol": "AAPL",
                "last": "189.93",
                "bid": "189.92",
                "ask": "189.94",
                "changePercent": "-0.42",
                "volume": 51234890,
                "timestamp": "2026-08-07T14:30:00Z"
            }])
            .to_string(),
        )
        // The second read must come from the cache
        .expect(1)
        .create_async()
        .await;

    let (manager, cache, client) = build_stack(&server.url(), &dir);
    manager.login("demo", "password").await.unwrap();

    let market = MarketDataService::new(client, Arc::clone(&cache), manager.handle());

    let first = market.quote("AAPL").await.unwrap();
    let second = market.quote("AAPL").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.last.to_string(), "189.93");
    quotes_mock.assert_async().await;
}

#[tokio::test]
async fn test_logout_invalidates_quote_cache() {
    let mut server = mockito::Server::new_async().await;
    let dir = TempDir::new().unwrap();

    let _login_mock = server
        .mock("POST", "/api/auth/login")
        .with_status(200)
        .with_body(auth_body("tok", "demo"))
        .create_async()
        .await;

    let quotes_mock = server
        .mock("GET", "/api/market/quotes")
        .match_query(mockito::Matcher::Any)
        .with_status(200)
        .with_body(
            json!([{
                "symbol": "AAPL",
                "last": "189.93",
                "bid": "189.92",
                "ask": "189.94",
                "changePercent": "-0.42",
                "volume": 51234890,
                "timestamp": "2026-08-07T14:30:00Z"
            }])
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let (manager, cache, client) = build_stack(&server.url(), &dir);
    manager.login("demo", "password").await.unwrap();

    let market = MarketDataService::new(client, Arc::clone(&cache), manager.handle());
    market.quote("AAPL").await.unwrap();
    assert_eq!(cache.len().await, 1);

    // Logging out wipes the namespace; the next read would need auth again
    manager.logout().await;
    assert!(cache.is_empty().await);

    let result = market.quote("AAPL").await;
    assert!(result.is_err());
    quotes_mock.assert_async().await;
}
