mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use steamsync::application::{AppError, ContentProvider, ProfileSource, Transport};
use steamsync::infrastructure::steam_deals_provider::SteamDealsProvider;
use steamsync::infrastructure::steam_profile_source::SteamProfileSource;
use steamsync::infrastructure::telegram_transport::TelegramTransport;

use common::{group, watcher};

const STEAM_ID: &str = "76561197960287930";

/// Serves `router` on an ephemeral local port and returns its base URL.
async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Default)]
struct SteamStub {
    vanity_calls: Arc<AtomicUsize>,
    vanity: Value,
    summaries: Value,
}

async fn resolve_vanity(
    State(stub): State<SteamStub>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    stub.vanity_calls.fetch_add(1, Ordering::SeqCst);
    assert!(q.contains_key("vanityurl"));
    Json(stub.vanity.clone())
}

async fn player_summaries(
    State(stub): State<SteamStub>,
    Query(q): Query<HashMap<String, String>>,
) -> Json<Value> {
    assert_eq!(q.get("steamids").map(String::as_str), Some(STEAM_ID));
    Json(stub.summaries.clone())
}

fn steam_router(stub: SteamStub) -> Router {
    Router::new()
        .route("/ISteamUser/ResolveVanityURL/v0001/", get(resolve_vanity))
        .route("/ISteamUser/GetPlayerSummaries/v0002/", get(player_summaries))
        .with_state(stub)
}

fn playing(game: Option<&str>, personastate: i64) -> Value {
    let mut player = json!({"steamid": STEAM_ID, "personastate": personastate});
    if let Some(g) = game {
        player["gameextrainfo"] = json!(g);
    }
    json!({"response": {"players": [player]}})
}

#[tokio::test]
async fn steam_id64_skips_vanity_lookup() {
    let stub = SteamStub {
        summaries: playing(Some("Rust"), 1),
        ..SteamStub::default()
    };
    let base = serve(steam_router(stub.clone())).await;
    let source = SteamProfileSource::with_base_url("KEY".into(), base);

    let observed = source.fetch_status(STEAM_ID).await.unwrap();

    assert_eq!(observed.observed_activity.as_deref(), Some("Rust"));
    assert!(observed.online);
    assert_eq!(stub.vanity_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn vanity_handle_is_resolved_first() {
    let stub = SteamStub {
        vanity: json!({"response": {"success": 1, "steamid": STEAM_ID}}),
        summaries: playing(None, 0),
        ..SteamStub::default()
    };
    let base = serve(steam_router(stub.clone())).await;
    let source = SteamProfileSource::with_base_url("KEY".into(), base);

    let observed = source.fetch_status("gaben").await.unwrap();

    assert_eq!(observed.observed_activity, None);
    assert!(!observed.online);
    assert_eq!(stub.vanity_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unresolvable_vanity_is_source_unavailable() {
    let stub = SteamStub {
        vanity: json!({"response": {"success": 42, "message": "No match"}}),
        ..SteamStub::default()
    };
    let base = serve(steam_router(stub)).await;
    let source = SteamProfileSource::with_base_url("KEY".into(), base);

    let err = source.fetch_status("nobody-here").await.unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
}

#[tokio::test]
async fn empty_player_list_is_source_unavailable() {
    let stub = SteamStub {
        summaries: json!({"response": {"players": []}}),
        ..SteamStub::default()
    };
    let base = serve(steam_router(stub)).await;
    let source = SteamProfileSource::with_base_url("KEY".into(), base);

    let err = source.fetch_status(STEAM_ID).await.unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
}

#[tokio::test]
async fn upstream_error_never_leaks_the_api_key() {
    let router = Router::new().route(
        "/ISteamUser/GetPlayerSummaries/v0002/",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let base = serve(router).await;
    let source = SteamProfileSource::with_base_url("SECRETKEY123".into(), base);

    let err = source.fetch_status(STEAM_ID).await.unwrap_err();

    assert!(matches!(err, AppError::SourceUnavailable(_)));
    assert!(err.to_string().contains("503"));
    assert!(!err.to_string().contains("SECRETKEY123"));
}

#[tokio::test]
async fn unreachable_steam_api_never_leaks_the_api_key() {
    // bind then drop so nothing is listening on the port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let source =
        SteamProfileSource::with_base_url("SECRETKEY123".into(), format!("http://{addr}"));

    let err = source.fetch_status("gaben").await.unwrap_err();

    assert!(matches!(err, AppError::SourceUnavailable(_)));
    assert!(!err.to_string().contains("SECRETKEY123"));
}

#[tokio::test]
async fn featured_specials_become_a_deals_post() {
    let router = Router::new().route(
        "/api/featuredcategories",
        get(|| async {
            Json(json!({
                "specials": {"items": [
                    {"id": 10, "name": "Counter-Strike", "discount_percent": 50,
                     "original_price": 999, "final_price": 499, "currency": "EUR"},
                    {"id": 20, "name": "Full Price Game", "discount_percent": 0,
                     "original_price": 1999, "final_price": 1999, "currency": "EUR"}
                ]},
                "coming_soon": {"items": []}
            }))
        }),
    );
    let base = serve(router).await;
    let provider = SteamDealsProvider::with_base_url(base, 5);

    let text = provider.generate("deals").await.unwrap().unwrap();

    assert!(text.contains("Counter-Strike -50%"));
    assert!(text.contains("9.99 EUR -> 4.99 EUR"));
    assert!(text.contains("/app/10"));
    assert!(!text.contains("Full Price Game"));

    assert_eq!(provider.generate("news").await.unwrap(), None);
}

#[tokio::test]
async fn store_outage_is_source_unavailable() {
    let router = Router::new().route(
        "/api/featuredcategories",
        get(|| async { StatusCode::BAD_GATEWAY }),
    );
    let base = serve(router).await;
    let provider = SteamDealsProvider::with_base_url(base, 5);

    let err = provider.generate("deals").await.unwrap_err();
    assert!(matches!(err, AppError::SourceUnavailable(_)));
}

type Received = Arc<Mutex<Vec<Value>>>;

fn telegram_router(received: Received, status: StatusCode, reply: Value) -> Router {
    Router::new().route(
        "/botTOKEN/sendMessage",
        post(move |Json(body): Json<Value>| {
            let received = received.clone();
            let reply = reply.clone();
            async move {
                received.lock().unwrap().push(body);
                (status, Json(reply)).into_response()
            }
        }),
    )
}

#[tokio::test]
async fn telegram_send_posts_chat_and_topic() {
    let received = Received::default();
    let router = telegram_router(received.clone(), StatusCode::OK, json!({"ok": true}));
    let base = serve(router).await;
    let transport = TelegramTransport::with_base_url("TOKEN".into(), base);

    transport.send(&group("-100123", Some("7")), "hello").await.unwrap();
    transport.send(&watcher("555"), "hi").await.unwrap();

    let received = received.lock().unwrap().clone();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0]["chat_id"], "-100123");
    assert_eq!(received[0]["message_thread_id"], 7);
    assert_eq!(received[0]["text"], "hello");
    assert_eq!(received[1]["chat_id"], "555");
    assert!(received[1].get("message_thread_id").is_none());
}

#[tokio::test]
async fn telegram_ok_false_is_delivery_failed() {
    let router = telegram_router(
        Received::default(),
        StatusCode::OK,
        json!({"ok": false, "description": "Bad Request: chat not found"}),
    );
    let base = serve(router).await;
    let transport = TelegramTransport::with_base_url("TOKEN".into(), base);

    let err = transport.send(&watcher("555"), "hi").await.unwrap_err();
    match err {
        AppError::DeliveryFailed(msg) => assert!(msg.contains("chat not found")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn telegram_http_error_is_delivery_failed_without_token() {
    let router = telegram_router(
        Received::default(),
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"ok": false}),
    );
    let base = serve(router).await;
    let transport = TelegramTransport::with_base_url("TOKEN".into(), base);

    let err = transport.send(&watcher("555"), "hi").await.unwrap_err();
    assert!(matches!(err, AppError::DeliveryFailed(_)));
    assert!(!err.to_string().contains("TOKEN"));
}
