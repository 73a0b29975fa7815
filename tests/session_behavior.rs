//! Behaviour tests for the session token lifecycle and the API client.
//!
//! These tests verify WHEN the client logs in, what it sends with business
//! calls, and how connectivity and login checks report back.

mod support;

use std::time::Duration;

use livraria_core::config::option_names;
use livraria_core::{
    ApiErrorKind, CourierIdCache, HttpError, HttpMethod, OptionStore, SessionError, UtcDateTime,
    ValidationError, COURIER_IDS_TRANSIENT,
};
use serde_json::json;

use support::{login_success_json, Harness};

fn store_credentials(harness: &Harness) {
    harness.set_option(option_names::API_USERNAME, "shop@example.test");
    harness.set_option(option_names::API_PASSWORD, "secret");
}

// =============================================================================
// Token refresh
// =============================================================================

#[tokio::test]
async fn when_token_is_within_refresh_buffer_client_logs_in_before_the_call() {
    // Given: A token expiring in 100 seconds and stored credentials
    let harness = Harness::new();
    harness.store_token("old-token", 100);
    store_credentials(&harness);
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("new-token"))
        .on_json(HttpMethod::Get, "/expedition", 200, json!([]));

    // When: A business endpoint is called
    harness.api.list_expeditions().await.expect("list");

    // Then: The login happened first and the fresh token was used
    let requests = harness.http.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].url.ends_with("/auth/login"));
    assert_eq!(
        requests[1].headers.get("authorization").map(String::as_str),
        Some("Bearer new-token")
    );
    assert_eq!(
        harness.http.last_body(HttpMethod::Post, "/auth/login"),
        json!({"email": "shop@example.test", "password": "secret"})
    );
}

#[tokio::test]
async fn when_token_is_fresh_no_login_happens() {
    let harness = Harness::signed_in();
    harness
        .http
        .on_json(HttpMethod::Get, "/users/me", 200, json!({"id": "u1"}));

    harness.api.get_user_info().await.expect("user");

    assert_eq!(harness.http.count(HttpMethod::Post, "/auth/login"), 0);
    assert_eq!(
        harness.http.requests()[0]
            .headers
            .get("authorization")
            .map(String::as_str),
        Some("Bearer token-1")
    );
}

#[tokio::test]
async fn when_refresh_login_fails_business_endpoint_is_never_hit() {
    // Given: An expired token and credentials the server rejects
    let harness = Harness::new();
    harness.store_token("old-token", -10);
    store_credentials(&harness);
    harness.http.on_json(
        HttpMethod::Post,
        "/auth/login",
        401,
        json!({"message": "Invalid credentials"}),
    );

    // When: A business endpoint is called
    let error = harness.api.get_user_info().await.expect_err("unauthenticated");

    // Then: The call is refused locally
    assert_eq!(error.kind(), ApiErrorKind::Unauthenticated);
    assert_eq!(harness.http.count(HttpMethod::Get, "/users/me"), 0);
}

#[tokio::test]
async fn when_no_credentials_are_stored_no_login_is_attempted() {
    let harness = Harness::new();

    let error = harness.api.list_expeditions().await.expect_err("no token");

    assert_eq!(error.kind(), ApiErrorKind::Unauthenticated);
    assert!(harness.http.requests().is_empty());
}

#[tokio::test]
async fn when_base_url_is_missing_calls_fail_as_not_configured() {
    let harness = Harness::with_base_url("");

    let error = harness.api.list_expeditions().await.expect_err("no url");

    assert_eq!(error.kind(), ApiErrorKind::NotConfigured);
    assert_eq!(error.message(), "API base URL not configured");
}

#[tokio::test]
async fn when_concurrent_calls_need_a_token_only_one_login_happens() {
    // Given: An expired token
    let harness = Harness::new();
    store_credentials(&harness);
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("new-token"))
        .on_json(HttpMethod::Get, "/expedition", 200, json!([]));

    // When: Two calls race for a token
    let (left, right) = tokio::join!(harness.api.list_expeditions(), harness.api.list_expeditions());

    // Then: They share a single login
    left.expect("left");
    right.expect("right");
    assert_eq!(harness.http.count(HttpMethod::Post, "/auth/login"), 1);
}

#[tokio::test]
async fn when_expedition_is_fetched_by_id_the_id_is_path_encoded() {
    let harness = Harness::signed_in();
    harness.http.on_json(
        HttpMethod::Get,
        "/expedition/exp%201",
        200,
        json!({"id": "exp 1", "status": {"name": "Delivered"}}),
    );

    let expedition = harness
        .api
        .get_expedition_by_id("exp 1")
        .await
        .expect("expedition");
    let missing = harness
        .api
        .get_expedition_by_id("exp-2")
        .await
        .expect_err("not scripted");

    assert_eq!(expedition["status"]["name"], "Delivered");
    assert_eq!(missing.kind(), ApiErrorKind::HttpStatus);
}

// =============================================================================
// Login and sign-in
// =============================================================================

#[tokio::test]
async fn when_login_is_rejected_the_server_message_is_reported() {
    let harness = Harness::new();
    harness.http.on_json(
        HttpMethod::Post,
        "/auth/login",
        401,
        json!({"message": "Wrong password"}),
    );

    let result = harness.tokens.login("shop@example.test", "nope").await;

    assert!(!result.success);
    assert_eq!(result.message, "Login failed: Wrong password");
    assert_eq!(harness.tokens.current_token().expect("token"), None);
}

#[tokio::test]
async fn when_server_does_not_answer_login_reports_no_response() {
    let harness = Harness::new();
    harness.http.on(
        HttpMethod::Post,
        "/auth/login",
        Err(HttpError::new("connection refused")),
    );

    let result = harness.tokens.login("shop@example.test", "secret").await;

    assert_eq!(result.message, "Login failed: No response from server");
    assert!(!result.response_received);
}

#[tokio::test]
async fn when_sign_in_succeeds_with_remember_credentials_are_stored() {
    // Given: No configuration yet
    let harness = Harness::with_base_url("");
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("tok"));

    // When: The operator signs in and asks to be remembered
    let result = harness
        .tokens
        .sign_in("https://courier.test/", "shop@example.test", "secret", true)
        .await
        .expect("sign in");

    // Then: URL, token and credentials are persisted
    assert!(result.success);
    assert_eq!(result.message, "Login successful");
    let option = |name| harness.store.get_option(name).expect("option");
    assert_eq!(option(option_names::API_BASE_URL).as_deref(), Some("https://courier.test/"));
    assert_eq!(option(option_names::API_TOKEN).as_deref(), Some("tok"));
    assert_eq!(option(option_names::API_USERNAME).as_deref(), Some("shop@example.test"));
    assert_eq!(option(option_names::API_PASSWORD).as_deref(), Some("secret"));
    assert!(harness.api.is_configured());
}

#[tokio::test]
async fn when_sign_in_succeeds_without_remember_credentials_are_forgotten() {
    let harness = Harness::new();
    store_credentials(&harness);
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("tok"));

    harness
        .tokens
        .sign_in("https://courier.test", "shop@example.test", "secret", false)
        .await
        .expect("sign in");

    assert_eq!(harness.store.get_option(option_names::API_USERNAME).expect("option"), None);
    assert_eq!(harness.store.get_option(option_names::API_PASSWORD).expect("option"), None);
}

#[tokio::test]
async fn when_sign_in_fields_are_blank_nothing_is_sent() {
    let harness = Harness::new();

    let error = harness
        .tokens
        .sign_in("https://courier.test", " ", "secret", true)
        .await
        .expect_err("blank username");

    assert!(matches!(
        error,
        SessionError::Validation(ValidationError::MissingSignInFields)
    ));
    assert_eq!(error.to_string(), "API URL, username, and password are required");
    assert!(harness.http.requests().is_empty());
}

#[tokio::test]
async fn when_logging_out_the_token_is_forgotten_locally() {
    let harness = Harness::signed_in();
    assert!(harness.api.is_configured());

    harness.tokens.logout().expect("logout");

    assert!(!harness.api.is_configured());
    assert!(harness.http.requests().is_empty());
}

// =============================================================================
// Connectivity and login checks
// =============================================================================

#[tokio::test]
async fn when_server_answers_with_any_status_it_counts_as_reachable() {
    let harness = Harness::new();
    harness
        .http
        .on_json(HttpMethod::Get, "/", 503, json!({"message": "maintenance"}));

    let report = harness.api.test_connectivity().await;

    assert!(report.success);
    assert_eq!(report.message, "Server is reachable (HTTP 503)");
    let details = report.details.expect("details");
    assert_eq!(details.url, "https://courier.test/");
    assert_eq!(details.response_code, Some(503));
}

#[tokio::test]
async fn when_server_is_unreachable_connectivity_reports_network_error() {
    let harness = Harness::new();
    harness
        .http
        .on(HttpMethod::Get, "/", Err(HttpError::new("connection refused")));

    let report = harness.api.test_connectivity().await;

    assert!(!report.success);
    assert_eq!(report.message, "Network error: connection refused");
}

#[tokio::test]
async fn when_base_url_is_missing_connectivity_says_so() {
    let harness = Harness::with_base_url("");

    let report = harness.api.test_connectivity().await;

    assert!(!report.success);
    assert_eq!(report.message, "API base URL not configured");
    assert!(report.details.is_none());
}

#[tokio::test]
async fn when_test_login_credentials_are_empty_validation_message_is_returned() {
    let harness = Harness::new();

    let check = harness.api.test_login("", "").await;

    assert!(!check.success);
    assert_eq!(check.message, "Username and password are required");
}

#[tokio::test]
async fn when_test_login_succeeds_api_access_is_confirmed() {
    let harness = Harness::new();
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("tok"))
        .on_json(HttpMethod::Get, "/expedition", 200, json!([]));

    let check = harness.api.test_login("shop@example.test", "secret").await;

    assert!(check.success);
    assert_eq!(
        check.message,
        "Authentication successful! Login works and API access confirmed."
    );
    assert!(check.token_expires_at.is_some());
}

#[tokio::test]
async fn when_login_works_but_probe_fails_permissions_are_blamed() {
    let harness = Harness::new();
    harness
        .http
        .on_json(HttpMethod::Post, "/auth/login", 200, login_success_json("tok"))
        .on_json(HttpMethod::Get, "/expedition", 403, json!({"message": "Forbidden"}));

    let check = harness.api.test_login("shop@example.test", "secret").await;

    assert!(!check.success);
    assert_eq!(
        check.message,
        "Login successful but API access failed. Check API permissions."
    );
}

#[tokio::test]
async fn when_test_login_gets_no_response_network_hint_is_added() {
    let harness = Harness::new();
    harness.http.on(
        HttpMethod::Post,
        "/auth/login",
        Err(HttpError::new("timeout")),
    );

    let check = harness.api.test_login("shop@example.test", "secret").await;

    assert_eq!(
        check.message,
        "Login failed: No response from server (No response from server - check URL and network)"
    );
}

// =============================================================================
// Courier id cache
// =============================================================================

#[tokio::test]
async fn when_courier_ids_are_cached_the_list_is_fetched_once() {
    let harness = Harness::new();
    harness.http.on_json(
        HttpMethod::Get,
        "/public/couriers",
        200,
        json!({"data": [{"_id": "fan"}, {"id": "cargus"}]}),
    );
    let cache = CourierIdCache::new(harness.api.clone(), harness.store.clone());

    let first = cache.get_available_courier_ids().await;
    let second = cache.get_available_courier_ids().await;

    assert_eq!(first, vec!["fan", "cargus"]);
    assert_eq!(second, first);
    assert_eq!(harness.http.count(HttpMethod::Get, "/public/couriers"), 1);
    assert!(harness
        .store
        .get_transient(COURIER_IDS_TRANSIENT)
        .expect("transient")
        .is_some());
}

#[tokio::test]
async fn when_courier_list_is_empty_nothing_is_cached() {
    let harness = Harness::new();
    harness
        .http
        .on_json(HttpMethod::Get, "/public/couriers", 200, json!([]))
        .on_json(HttpMethod::Get, "/public/couriers", 200, json!([{"_id": "fan"}]));
    let cache = CourierIdCache::new(harness.api.clone(), harness.store.clone());

    assert!(cache.get_available_courier_ids().await.is_empty());
    assert_eq!(cache.get_available_courier_ids().await, vec!["fan"]);
    assert_eq!(harness.http.count(HttpMethod::Get, "/public/couriers"), 2);
}

#[tokio::test]
async fn when_ids_are_loaded_from_the_store_they_expire_with_the_stored_entry() {
    // Given: Another process cached ids that expire in two seconds
    let harness = Harness::new();
    let expires_at = UtcDateTime::now().unix_timestamp() + 2;
    harness
        .store
        .set_transient(
            COURIER_IDS_TRANSIENT,
            &json!({"ids": ["fan"], "expiresAt": expires_at}).to_string(),
            Duration::from_secs(3600),
        )
        .expect("transient");
    harness
        .http
        .on_json(HttpMethod::Get, "/public/couriers", 200, json!([{"_id": "cargus"}]));
    let cache = CourierIdCache::new(harness.api.clone(), harness.store.clone());

    // When: The ids are read now and again after the stored expiry
    let first = cache.get_available_courier_ids().await;
    tokio::time::sleep(Duration::from_secs(3)).await;
    let second = cache.get_available_courier_ids().await;

    // Then: The in-process copy did not outlive the stored one
    assert_eq!(first, vec!["fan"]);
    assert_eq!(second, vec!["cargus"]);
    assert_eq!(harness.http.count(HttpMethod::Get, "/public/couriers"), 1);
}
