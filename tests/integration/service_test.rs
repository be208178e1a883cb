//! Integration tests for subscription, access control, admin commands and
//! persistence.

mod helpers;

use std::collections::BTreeMap;

use parkhub_core::error::ErrorKind;
use parkhub_core::types::id::ActorId;
use parkhub_lot::PlaceState;
use parkhub_service::ActorContext;
use parkhub_stats::StatsExport;
use tempfile::TempDir;

fn read_users(app: &helpers::TestApp) -> BTreeMap<String, String> {
    let json = std::fs::read_to_string(app.users_file()).unwrap();
    serde_json::from_str(&json).unwrap()
}

#[tokio::test]
async fn test_start_sends_welcome_and_status() {
    let app = helpers::TestApp::new().await;
    app.start("1", "Alice").await;

    let surfaces = app.surfaces("1");
    assert_eq!(surfaces.len(), 2);
    assert!(surfaces[0].text.starts_with("Welcome"));
    assert_eq!(surfaces[1].text, "\u{1F7E9}\u{1F7E9}");
    let keyboard = surfaces[1].keyboard.as_ref().unwrap();
    assert_eq!(keyboard.rows.len(), 3);
    assert_eq!(keyboard.rows[2][0].callback, "statistics");

    assert_eq!(read_users(&app).get("1").map(String::as_str), Some("Alice"));
}

#[tokio::test]
async fn test_restart_replaces_the_view() {
    let app = helpers::TestApp::new().await;
    app.start("1", "Alice").await;
    app.start("1", "Alice").await;

    assert_eq!(app.surfaces("1").len(), 2);
    assert_eq!(app.service.views().len(), 1);
}

#[tokio::test]
async fn test_rename_is_persisted_and_sanitized() {
    let app = helpers::TestApp::new().await;
    app.start("1", "Alice").await;
    app.start("1", "Alice_[B]!").await;

    assert_eq!(read_users(&app).get("1").map(String::as_str), Some("AliceB"));
}

#[tokio::test]
async fn test_stop_removes_view_and_directory_entry() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;

    let goodbye = app.service.stop(&alice).await.unwrap();
    assert!(goodbye.contains("/start"));
    assert!(app.surfaces("1").is_empty());
    assert!(!app.service.views().contains(&alice.actor_id));
    assert!(read_users(&app).is_empty());

    let err = app.service.stop(&alice).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::NoOp);
}

#[tokio::test]
async fn test_cancel_reservation() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    let bob = app.start("2", "Bob").await;

    app.tap(&alice, "2").await;
    assert_eq!(
        app.tap(&bob, "cancel.2").await,
        "Use the keyboard from the latest message!"
    );
    assert_eq!(
        app.tap(&alice, "cancel.2").await,
        "You cancelled the reservation of place 2"
    );

    assert_eq!(
        app.content("2").await.info,
        "*Alice* cancelled the reservation of place *2*"
    );
    assert!(app.service.lot().is_free().await);
    assert_eq!(app.service.stats().export().await.by_place.total(), 0);
    assert_eq!(
        app.tap(&alice, "cancel.2").await,
        "Use the keyboard from the latest message!"
    );
}

#[tokio::test]
async fn test_statistics_go_to_the_requester_only() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    app.start("2", "Bob").await;
    app.tap(&alice, "1").await;
    app.tap(&alice, "1").await;
    let bob_before = app.content("2").await;

    assert_eq!(app.tap(&alice, "statistics").await, "You requested statistics");

    let info = app.content("1").await.info;
    assert!(info.contains("*Total count*: 1"));
    assert!(info.contains("*People*\n1. Alice - 1"));
    assert!(info.contains("*Places*\n1. 1 - 1"));
    assert_eq!(app.content("2").await, bob_before);
}

#[tokio::test]
async fn test_statistics_without_view_opens_the_start_view() {
    let app = helpers::TestApp::new().await;
    let carol = helpers::actor("3", "Carol");

    app.tap(&carol, "statistics").await;

    // The welcome view is sent first and its info surface is then edited.
    let surfaces = app.surfaces("3");
    assert_eq!(surfaces.len(), 2);
    assert_eq!(surfaces[0].edits, 1);
    assert!(surfaces[0].text.contains("*Statistics*"));
    assert!(surfaces[1].keyboard.is_some());
    assert!(app.content("3").await.info.contains("*Statistics*"));
}

#[tokio::test]
async fn test_whitelist_ignores_strangers() {
    let config = helpers::TestApp::config(&["1"], true, None);
    let app = helpers::TestApp::with_config(config).await;

    let err = app
        .service
        .start(&helpers::actor("9", "Mallory"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(app.surfaces("9").is_empty());
    assert!(read_users(&app).is_empty());
}

#[tokio::test]
async fn test_whitelist_admits_known_actors() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("users.json"), r#"{"7": "Grace"}"#).unwrap();
    let config = helpers::TestApp::config(&["1"], true, None);
    let app = helpers::TestApp::boot(config, dir).await;

    let grace = helpers::actor("7", "Grace");
    app.service.start(&grace).await.unwrap();
    assert_eq!(app.tap(&grace, "1").await, "You reserved place 1");
}

#[tokio::test]
async fn test_owner_commands_require_owner() {
    let app = helpers::TestApp::with_owner().await;
    let stranger = helpers::actor("1", "Alice");

    for err in [
        app.service.toggle_whitelist(&stranger).await.unwrap_err(),
        app.service.export_stats(&stranger).await.unwrap_err(),
        app.service.import_stats(&stranger, "{}").await.unwrap_err(),
        app.service.logs(&stranger, None).await.unwrap_err(),
    ] {
        assert_eq!(err.kind, ErrorKind::Authorization);
    }
}

#[tokio::test]
async fn test_toggle_whitelist() {
    let app = helpers::TestApp::with_owner().await;
    let owner = ActorContext::new(helpers::OWNER);

    assert!(app.service.toggle_whitelist(&owner).await.unwrap());
    let err = app
        .service
        .start(&helpers::actor("5", "Eve"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);

    assert!(!app.service.toggle_whitelist(&owner).await.unwrap());
    app.service.start(&helpers::actor("5", "Eve")).await.unwrap();
}

#[tokio::test]
async fn test_export_import_stats() {
    let app = helpers::TestApp::with_owner().await;
    let owner = ActorContext::new(helpers::OWNER);
    let alice = app.start("1", "Alice").await;
    app.tap(&alice, "2").await;
    app.tap(&alice, "2").await;

    let json = app.service.export_stats(&owner).await.unwrap();
    let exported = StatsExport::from_json(&json).unwrap();
    assert_eq!(exported.by_place.get("2"), 1);

    let other = helpers::TestApp::with_owner().await;
    other.service.import_stats(&owner, &json).await.unwrap();
    assert_eq!(
        other.service.stats().ranked_report().await,
        app.service.stats().ranked_report().await
    );
    assert!(other.data_file().exists());

    let err = other.service.import_stats(&owner, "  ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(other.service.import_stats(&owner, "not json").await.is_err());
}

#[tokio::test]
async fn test_logs_returns_tail_in_chunks() {
    let mut config = helpers::TestApp::config(&["1"], false, Some(helpers::OWNER));
    let log_dir = TempDir::new().unwrap();
    let log_file = log_dir.path().join("parkhub.log");
    let long_line = "x".repeat(5000);
    std::fs::write(&log_file, format!("first\nsecond\n{long_line}\nlast\n")).unwrap();
    config.logging.file = Some(log_file.to_string_lossy().into_owned());
    config.logging.log_length = 2;
    let app = helpers::TestApp::with_config(config).await;
    let owner = ActorContext::new(helpers::OWNER);

    let chunks = app.service.logs(&owner, None).await.unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].chars().count(), 4096);
    assert!(chunks[1].ends_with("\nlast"));

    let chunks = app.service.logs(&owner, Some(1)).await.unwrap();
    assert_eq!(chunks, vec!["last".to_string()]);
}

#[tokio::test]
async fn test_logs_without_file() {
    let app = helpers::TestApp::with_owner().await;
    let err = app
        .service
        .logs(&ActorContext::new(helpers::OWNER), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_stats_survive_restart_but_lot_does_not() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    app.tap(&alice, "1").await;
    app.tap(&alice, "1").await;
    app.tap(&alice, "2").await;

    let config = app.config.clone();
    let dir = app.dir;
    let restarted = helpers::TestApp::boot(config, dir).await;

    let export = restarted.service.stats().export().await;
    assert_eq!(export.by_place.get("1"), 1);
    assert_eq!(
        export.actor_directory.get(&ActorId::from("1")).map(String::as_str),
        Some("Alice")
    );
    let snapshot = restarted.service.lot().snapshot().await;
    assert_eq!(snapshot.count(PlaceState::Free), 2);
    assert!(restarted.service.views().is_empty());
}
