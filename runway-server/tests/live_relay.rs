mod support;

use std::time::Duration;

use runway_core::{
    api::routes::v1,
    database::ports::PipelinesRepository,
    model::PipelineStatus,
    notify::ChangeChannel,
};
use serde_json::{Value, json};
use support::{fixture, test_server};
use tokio::{sync::mpsc, time::timeout};

async fn next_frame(rx: &mut mpsc::Receiver<String>) -> Value {
    let frame = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("observer queue closed");
    serde_json::from_str(&frame).unwrap()
}

async fn assert_quiet(rx: &mut mpsc::Receiver<String>) {
    assert!(
        timeout(Duration::from_millis(100), rx.recv()).await.is_err(),
        "unexpected frame"
    );
}

#[tokio::test]
async fn new_observer_gets_three_snapshots_before_live_traffic() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();

    let (_connection, mut rx) = relay.attach_observer(16).await.unwrap();
    fx.notifier.publish(ChangeChannel::StorageChange, r#"{"id":"live"}"#);

    let kinds: Vec<Value> = vec![
        next_frame(&mut rx).await["type"].clone(),
        next_frame(&mut rx).await["type"].clone(),
        next_frame(&mut rx).await["type"].clone(),
    ];
    assert_eq!(
        kinds,
        vec![json!("initial_storage"), json!("initial_pipelines"), json!("initial_history")]
    );

    let live = next_frame(&mut rx).await;
    assert_eq!(live, json!({ "channel": "storage_change", "payload": { "id": "live" } }));

    relay.stop().await;
}

#[tokio::test]
async fn snapshots_carry_store_contents() {
    let fx = fixture().await;
    let (_connection, mut rx) = fx.state.relay.attach_observer(4).await.unwrap();

    let storage = next_frame(&mut rx).await;
    assert_eq!(storage["data"][0]["name"], "primary");
    let pipelines = next_frame(&mut rx).await;
    assert_eq!(pipelines["data"].as_array().map(Vec::len), Some(2));
    let history = next_frame(&mut rx).await;
    assert_eq!(history["data"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn pipeline_change_is_followed_by_full_refresh() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();

    let (_connection, mut rx) = relay.attach_observer(16).await.unwrap();
    for _ in 0..3 {
        next_frame(&mut rx).await;
    }

    fx.store
        .update_pipeline_status(fx.ingest, PipelineStatus::Failed)
        .await
        .unwrap();

    let raw = next_frame(&mut rx).await;
    assert_eq!(raw["channel"], "pipeline_change");
    assert_eq!(raw["payload"]["operation"], "UPDATE");
    assert_eq!(raw["payload"]["record"]["status"], "failed");

    let refresh = next_frame(&mut rx).await;
    assert_eq!(refresh["type"], "initial_pipelines");
    let ingest = refresh["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["name"] == "ingest")
        .cloned()
        .unwrap();
    assert_eq!(ingest["status"], "failed");

    relay.stop().await;
}

#[tokio::test]
async fn storage_change_is_not_followed_by_refresh() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();

    let (_connection, mut rx) = relay.attach_observer(16).await.unwrap();
    for _ in 0..3 {
        next_frame(&mut rx).await;
    }

    fx.store.set_used_capacity(fx.primary, 460.0).await.unwrap();

    let raw = next_frame(&mut rx).await;
    assert_eq!(raw["channel"], "storage_change");
    assert_eq!(raw["payload"]["record"]["used_capacity_gb"], 460.0);
    assert_quiet(&mut rx).await;

    relay.stop().await;
}

#[tokio::test]
async fn malformed_payloads_are_dropped_without_disconnecting() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();

    let (connection, mut rx) = relay.attach_observer(16).await.unwrap();
    for _ in 0..3 {
        next_frame(&mut rx).await;
    }

    fx.notifier.publish(ChangeChannel::StorageChange, "{not json");
    fx.notifier.publish(ChangeChannel::StorageChange, r#"{"after":true}"#);

    let next = next_frame(&mut rx).await;
    assert_eq!(next["payload"], json!({ "after": true }));
    assert!(fx.state.websocket_manager.get_connection(&connection.id).is_some());

    relay.stop().await;
}

#[tokio::test]
async fn observers_see_notifications_in_arrival_order() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();

    let (_a, mut first) = relay.attach_observer(32).await.unwrap();
    let (_b, mut second) = relay.attach_observer(32).await.unwrap();
    for rx in [&mut first, &mut second] {
        for _ in 0..3 {
            next_frame(rx).await;
        }
    }

    for n in 0..10 {
        fx.notifier
            .publish(ChangeChannel::StorageChange, json!({ "n": n }).to_string());
    }

    for rx in [&mut first, &mut second] {
        for n in 0..10 {
            assert_eq!(next_frame(rx).await["payload"]["n"], n);
        }
    }

    relay.stop().await;
}

#[tokio::test]
async fn stopped_relay_forwards_nothing() {
    let fx = fixture().await;
    let relay = fx.state.relay.clone();
    relay.start().await.unwrap();
    assert!(relay.is_running().await);

    let (_connection, mut rx) = relay.attach_observer(16).await.unwrap();
    for _ in 0..3 {
        next_frame(&mut rx).await;
    }

    relay.stop().await;
    assert!(!relay.is_running().await);

    fx.notifier.publish(ChangeChannel::StorageChange, r#"{"late":true}"#);
    assert_quiet(&mut rx).await;

    // restartable
    relay.start().await.unwrap();
    fx.notifier.publish(ChangeChannel::StorageChange, r#"{"again":true}"#);
    assert_eq!(next_frame(&mut rx).await["payload"], json!({ "again": true }));
    relay.stop().await;
}

#[tokio::test]
async fn websocket_observer_end_to_end() {
    let fx = fixture().await;
    fx.state.relay.start().await.unwrap();
    let server = test_server(fx.state.clone());

    let mut socket = server
        .get_websocket(v1::live::WEBSOCKET)
        .await
        .into_websocket()
        .await;

    let kinds: Vec<Value> = vec![
        socket.receive_json::<Value>().await["type"].clone(),
        socket.receive_json::<Value>().await["type"].clone(),
        socket.receive_json::<Value>().await["type"].clone(),
    ];
    assert_eq!(
        kinds,
        vec![json!("initial_storage"), json!("initial_pipelines"), json!("initial_history")]
    );

    server
        .put(&v1::pipelines::STATUS.replace("{id}", &fx.cleanup.to_string()))
        .json(&json!({ "status": "active" }))
        .await
        .assert_status_ok();

    let raw: Value = socket.receive_json().await;
    assert_eq!(raw["channel"], "pipeline_change");
    let refresh: Value = socket.receive_json().await;
    assert_eq!(refresh["type"], "initial_pipelines");

    socket.close().await;
    fx.state.relay.stop().await;
}
