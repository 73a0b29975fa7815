//! Behaviour tests for the DuckDB-backed store.
//!
//! These tests verify that options, transients and order metadata survive a
//! reopen, and that a whole workflow can run against the durable store.

mod support;

use std::sync::Arc;
use std::time::Duration;

use livraria_core::config::option_names;
use livraria_core::{
    ApiClient, CourierConfig, CourierIdCache, CourierTransport, MemoryOrderSource, OrderHandler,
    RuntimeEnvironment, TokenManager, UtcDateTime,
};
use livraria_store::{DuckDbStore, OptionStore, OrderMetaStore, StoreConfig};
use tempfile::tempdir;

use support::{cod_order, ScriptedHttpClient, BASE_URL};

fn open(home: &std::path::Path) -> DuckDbStore {
    DuckDbStore::open(StoreConfig::in_dir(home)).expect("store open")
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn when_store_is_reopened_options_and_order_meta_are_still_there() {
    // Given: A store with an option and order metadata
    let temp = tempdir().expect("tempdir");
    {
        let store = open(temp.path());
        store
            .set_option(option_names::AUTO_CREATE, "1")
            .expect("option");
        store
            .set_meta_many(
                7,
                &[
                    ("_courier_expedition_id", String::from("exp-1")),
                    ("_courier_awb_number", String::from("AWB1")),
                ],
            )
            .expect("meta");
    }

    // When: The store is opened again
    let store = open(temp.path());

    // Then: Everything written before is readable
    assert_eq!(
        store.get_option(option_names::AUTO_CREATE).expect("option").as_deref(),
        Some("1")
    );
    assert_eq!(
        store.get_meta(7, "_courier_awb_number").expect("meta").as_deref(),
        Some("AWB1")
    );
    assert_eq!(store.get_meta(8, "_courier_awb_number").expect("meta"), None);
}

#[test]
fn when_option_is_written_twice_the_latest_value_wins() {
    let temp = tempdir().expect("tempdir");
    let store = open(temp.path());

    store.set_option("shop_name", "First").expect("set");
    store.set_option("shop_name", "Second").expect("set");
    store.delete_meta(1, "missing").expect("deleting absent meta is fine");

    assert_eq!(
        store.get_option("shop_name").expect("get").as_deref(),
        Some("Second")
    );
}

#[test]
fn when_transient_is_taken_it_is_gone_for_everyone() {
    // Given: A recorded intent
    let temp = tempdir().expect("tempdir");
    let store = open(temp.path());
    store
        .set_transient("livraria_auto_create_order_5", "1", Duration::from_secs(60))
        .expect("set");

    // When: It is taken twice
    let first = store.take_transient("livraria_auto_create_order_5").expect("take");
    let second = store.take_transient("livraria_auto_create_order_5").expect("take");

    // Then: Only the first take sees it
    assert_eq!(first.as_deref(), Some("1"));
    assert_eq!(second, None);
}

#[test]
fn when_transient_expires_it_reads_as_absent_and_is_purged() {
    let temp = tempdir().expect("tempdir");
    let store = open(temp.path());
    store
        .set_transient("short", "x", Duration::ZERO)
        .expect("set");
    store
        .set_transient("long", "y", Duration::from_secs(3600))
        .expect("set");

    assert_eq!(store.get_transient("short").expect("get"), None);
    assert_eq!(store.purge_expired_transients().expect("purge"), 1);
    assert_eq!(store.get_transient("long").expect("get").as_deref(), Some("y"));
}

// =============================================================================
// Workflow against the durable store
// =============================================================================

#[tokio::test]
async fn when_workflow_runs_on_duckdb_the_expedition_is_persisted() {
    // Given: A handler wired to a DuckDB store and a scripted courier API
    let temp = tempdir().expect("tempdir");
    let store = Arc::new(open(temp.path()));
    let expires_at = UtcDateTime::now().unix_timestamp() + 3600;
    store.set_option(option_names::API_TOKEN, "tok").expect("token");
    store
        .set_option(option_names::TOKEN_EXPIRES_AT, &expires_at.to_string())
        .expect("expiry");
    store
        .set_option(option_names::DEFAULT_SENDER_PROFILE_ID, "sp-1")
        .expect("profile");

    let http = Arc::new(ScriptedHttpClient::new());
    script(&http);

    let transport = CourierTransport::new(
        http.clone(),
        CourierConfig::new(BASE_URL),
        RuntimeEnvironment::Host,
    );
    let tokens = Arc::new(TokenManager::new(transport, store.clone()));
    let api = ApiClient::new(tokens);
    let couriers = Arc::new(CourierIdCache::new(api.clone(), store.clone()));
    let orders = Arc::new(MemoryOrderSource::new([cod_order(77)]));
    let handler = OrderHandler::new(api, couriers, orders, store.clone(), store.clone());

    // When: The full interactive flow runs
    let quotes = handler.get_quotes_for_order(77, None).await.expect("quotes");
    handler
        .select_quote(77, &quotes.quote_request_id, "q-fan", None)
        .await
        .expect("select");
    handler.generate_label(77).await.expect("label");

    // Then: A reopened store sees the expedition
    drop(handler);
    drop(store);
    let reopened = open(temp.path());
    assert_eq!(
        reopened.get_meta(77, "_courier_expedition_id").expect("meta").as_deref(),
        Some("exp-1")
    );
    assert_eq!(
        reopened.get_meta(77, "_courier_quote_request_id").expect("meta"),
        None
    );
}

fn script(http: &ScriptedHttpClient) {
    use livraria_core::HttpMethod;
    use serde_json::json;

    http.on_json(HttpMethod::Get, "/public/couriers", 200, json!([{"_id": "fan"}]))
        .on_json(
            HttpMethod::Get,
            "/users/me/sender-profile",
            200,
            json!([support::sender_profile_json()]),
        )
        .on_json(
            HttpMethod::Post,
            "/public/awb/quotes",
            201,
            support::quote_response_json(),
        )
        .on_json(HttpMethod::Post, "/public/awb/quotes/select", 200, json!({}))
        .on_json(
            HttpMethod::Post,
            "/public/awb/quotes/billing-info",
            200,
            json!({"id": "bill-1"}),
        )
        .on_json(
            HttpMethod::Post,
            "/expedition",
            201,
            json!({"id": "exp-1", "awbNumber": "AWB123"}),
        );
}
