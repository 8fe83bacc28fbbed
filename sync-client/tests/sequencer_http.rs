//! HttpTransport against an in-process fake sequencer.
//!
//! The fake serves the same three endpoints as the real node:
//! `/state/value` (404 when absent), `/state/subkeys`, `/operations`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;

use dungeon_sync_client::{
    GameClient, HttpTransport, StateClient, StateTransport, SyncConfig, TransportError,
    WorldSyncEngine,
};
use dungeon_sync_types::{codec, AccountId, Command, OperationBody, TileCode, MAP_TILES};

#[derive(Default)]
struct FakeSequencer {
    values: BTreeMap<String, String>,
    operations: Vec<String>,
    broken: BTreeSet<String>,
}

type Shared = Arc<Mutex<FakeSequencer>>;

#[derive(Deserialize)]
struct PathQuery {
    path: String,
}

async fn value_handler(
    Extension(state): Extension<Shared>,
    Query(query): Query<PathQuery>,
) -> Result<String, StatusCode> {
    let state = state.lock().unwrap();
    if state.broken.contains(&query.path) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    state
        .values
        .get(&query.path)
        .cloned()
        .ok_or(StatusCode::NOT_FOUND)
}

async fn subkeys_handler(
    Extension(state): Extension<Shared>,
    Query(query): Query<PathQuery>,
) -> Result<Json<Vec<String>>, StatusCode> {
    let state = state.lock().unwrap();
    if state.broken.contains(&query.path) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let prefix = format!("{}/", query.path);
    let children: BTreeSet<String> = state
        .values
        .keys()
        .filter_map(|key| key.strip_prefix(&prefix))
        .filter_map(|rest| rest.split('/').next())
        .map(str::to_string)
        .collect();
    Ok(Json(children.into_iter().collect()))
}

async fn operations_handler(
    Extension(state): Extension<Shared>,
    Json(body): Json<OperationBody>,
) -> StatusCode {
    let mut state = state.lock().unwrap();
    if state.broken.contains("/operations") {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    state.operations.push(body.data);
    StatusCode::OK
}

/// Start the fake on an ephemeral port and return its base URL.
async fn start_sequencer(state: Shared) -> String {
    let app = Router::new()
        .route("/state/value", get(value_handler))
        .route("/state/subkeys", get(subkeys_handler))
        .route("/operations", post(operations_handler))
        .layer(Extension(state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn seeded() -> Shared {
    let mut fake = FakeSequencer::default();
    let map = codec::encode_bytes(&vec![TileCode::Empty as u8; MAP_TILES]);
    for (key, value) in [
        ("/state/map", map.as_str()),
        ("/players/tz1alice/x_pos", "0000000000000001"),
        ("/players/tz1alice/y_pos", "0000000000000002"),
        ("/players/tz1alice/inventory", "01"),
        ("/players/tz1alice/gold", "0000000000000064"),
        ("/players/tz1bob/x_pos", "0000000000000005"),
        ("/market-place/tz1bob/02/value", "000000000000000c"),
    ] {
        fake.values.insert(key.to_string(), value.to_string());
    }
    Arc::new(Mutex::new(fake))
}

fn transport(base_url: &str) -> HttpTransport {
    HttpTransport::new(base_url, Duration::from_secs(2)).unwrap()
}

// ===========================================
// Transport Tests
// ===========================================

#[tokio::test]
async fn value_present_and_absent() {
    let url = start_sequencer(seeded()).await;
    let transport = transport(&url);

    assert_eq!(
        transport.read_value("/players/tz1alice/gold").await.unwrap(),
        Some("0000000000000064".to_string())
    );
    assert_eq!(
        transport.read_value("/players/tz1bob/gold").await.unwrap(),
        None
    );
}

#[tokio::test]
async fn subkeys_list_children_or_nothing() {
    let url = start_sequencer(seeded()).await;
    let transport = transport(&url);

    assert_eq!(
        transport.read_children("/players").await.unwrap(),
        vec!["tz1alice", "tz1bob"]
    );
    assert_eq!(
        transport.read_children("/market-place/tz1bob").await.unwrap(),
        vec!["02"]
    );
    assert!(transport
        .read_children("/market-place/tz1alice")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn server_error_is_transport_failure() {
    let state = seeded();
    state.lock().unwrap().broken.insert("/state/map".to_string());
    let url = start_sequencer(state).await;
    let transport = transport(&url);

    let result = transport.read_value("/state/map").await;

    assert!(matches!(
        result,
        Err(TransportError::Status { status: 500, .. })
    ));
}

#[tokio::test]
async fn submit_posts_data_field() {
    let state = seeded();
    let url = start_sequencer(state.clone()).await;
    let transport = transport(&url);

    let body = OperationBody {
        data: "747a316162632d3031".to_string(),
    };
    transport.submit(&body).await.unwrap();

    assert_eq!(
        state.lock().unwrap().operations,
        vec!["747a316162632d3031".to_string()]
    );
}

#[tokio::test]
async fn rejected_submission_reports_status() {
    let state = seeded();
    state.lock().unwrap().broken.insert("/operations".to_string());
    let url = start_sequencer(state).await;
    let transport = transport(&url);

    let body = OperationBody {
        data: "00".to_string(),
    };
    assert!(matches!(
        transport.submit(&body).await,
        Err(TransportError::Rejected { status: 503, .. })
    ));
}

// ===========================================
// End-to-End Tests
// ===========================================

#[tokio::test]
async fn engine_tick_over_http() {
    let url = start_sequencer(seeded()).await;
    let engine = WorldSyncEngine::new(StateClient::new(transport(&url), Duration::from_secs(2)));
    let alice = AccountId::parse("tz1alice").unwrap();

    let snapshot = engine.tick(&alice, None, 1, 1).await;

    // Bob has no y_pos yet, so only Alice is placed.
    assert_eq!(snapshot.players.len(), 1);
    assert_eq!(snapshot.local_position().map(|p| (p.x(), p.y())), Some((1, 2)));
    assert_eq!(snapshot.local_player.gold, 100);
    assert_eq!(snapshot.local_player.inventory.len(), 1);
    assert_eq!(snapshot.market.len(), 1);
    assert_eq!(snapshot.market[0].price, 12);
    assert!(snapshot.map.is_some());
}

#[tokio::test]
async fn game_client_polls_and_submits() {
    let state = seeded();
    let url = start_sequencer(state.clone()).await;
    let config = SyncConfig::new(&url).with_poll_interval(Duration::from_millis(50));
    let client = GameClient::connect(&config).unwrap();
    let alice = AccountId::parse("tz1alice").unwrap();

    let mut snapshots = client.subscribe();
    client.select_account(&alice).await;
    snapshots.changed().await.unwrap();
    assert_eq!(client.snapshot().unwrap().account, alice);

    let payload = client.drop_item(0).await.unwrap();
    assert_eq!(payload.decode().unwrap().1, Command::Drop { slot: 0 });
    assert_eq!(state.lock().unwrap().operations, vec![payload.to_string()]);

    client.shutdown().await;
}
