//! End-to-end scenarios over the lot, statistics and views.

mod helpers;

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};

use parkhub_core::error::ErrorKind;
use parkhub_core::traits::directory::ActorNames;
use parkhub_core::types::id::ActorId;
use parkhub_lot::{Lot, PlaceState};
use parkhub_stats::StatsEngine;

#[tokio::test]
async fn test_reserve_occupy_free_with_stats() {
    let lot = Lot::new(["1", "2"]).unwrap();
    let stats = StatsEngine::new(ActorNames::new());
    let a = ActorId::from("A");
    let b = ActorId::from("B");
    let place = lot.get("1").unwrap();
    let t0 = Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap();

    let reserve = place.toggle_at(&a, t0).await.unwrap();
    stats.count_at(&reserve.before, t0).await;
    assert_eq!(reserve.after.state, PlaceState::Reserved);
    assert_eq!(reserve.after.occupant, Some(a.clone()));

    let occupied_at = t0 + Duration::minutes(5);
    let occupy = place.toggle_at(&a, occupied_at).await.unwrap();
    stats.count_at(&occupy.before, occupied_at).await;
    assert_eq!(occupy.after.state, PlaceState::Occupied);
    assert_eq!(occupy.after.occupied_since, Some(occupied_at));

    let err = place.toggle_at(&b, occupied_at).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);
    assert_eq!(place.snapshot().await, occupy.after);

    let freed_at = occupied_at + Duration::minutes(125);
    let free = place.toggle_at(&a, freed_at).await.unwrap();
    stats.count_at(&free.before, freed_at).await;
    assert!(free.after.is_free());

    let export = stats.export().await;
    assert_eq!(export.by_place.get("1"), 1);
    assert_eq!(export.by_actor.get("A"), 1);
    assert_eq!(export.total_occupied_seconds, 125.0 * 60.0);
    assert_eq!(stats.ranked_report().await.total_time, "2:05");
    assert!(lot.is_free().await);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_presses_have_one_winner() {
    let app = Arc::new(helpers::TestApp::new().await);
    let actors: Vec<_> = (0..16)
        .map(|i| helpers::actor(&format!("{i}"), &format!("Driver {i}")))
        .collect();
    for ctx in &actors {
        app.service.start(ctx).await.unwrap();
    }

    let tasks: Vec<_> = actors
        .into_iter()
        .map(|ctx| {
            let app = Arc::clone(&app);
            tokio::spawn(async move { app.service.handle_callback(&ctx, "1").await.unwrap() })
        })
        .collect();

    let mut won = 0;
    let mut lost = 0;
    for task in tasks {
        match task.await.unwrap().as_str() {
            "You reserved place 1" => won += 1,
            "Place 1 is not free!" => lost += 1,
            other => panic!("unexpected notice {other}"),
        }
    }
    assert_eq!((won, lost), (1, 15));

    let snapshot = app.service.lot().snapshot().await;
    assert_eq!(snapshot.get("1").unwrap().state, PlaceState::Reserved);
    assert_eq!(app.service.stats().export().await.by_place.total(), 0);
}

#[tokio::test]
async fn test_full_day_through_the_service() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    let bob = app.start("2", "Bob").await;

    assert_eq!(app.tap(&alice, "1").await, "You reserved place 1");
    assert_eq!(app.tap(&bob, "1").await, "Place 1 is not free!");
    assert_eq!(app.tap(&bob, "2").await, "You reserved place 2");
    assert_eq!(app.tap(&alice, "1").await, "You occupied place 1");

    let bob_view = app.content("2").await;
    assert_eq!(bob_view.info, "*Alice* occupied place *1*");
    assert_eq!(bob_view.status, "\u{1F7E5}\u{1F7E8}");
    let keyboard = bob_view.keyboard.unwrap();
    assert_eq!(keyboard.rows[0][0].caption, "\u{1F7E5} 1 Alice");
    assert_eq!(keyboard.rows[1][1].callback, "cancel.2");

    assert_eq!(app.tap(&bob, "clear").await, "You cleared the parking");
    assert!(app.service.lot().is_free().await);
    assert_eq!(app.tap(&alice, "clear").await, "Use the keyboard from the latest message!");

    let export = app.service.stats().export().await;
    assert_eq!(export.by_place.get("1"), 1);
    assert_eq!(export.by_place.get("2"), 1);
    assert_eq!(export.by_actor.get("1"), 1);
    assert_eq!(export.by_actor.get("2"), 1);
    assert!(export.total_occupied_seconds >= 0.0);

    let alice_view = app.content("1").await;
    assert_eq!(alice_view.info, "*Bob* cleared the parking");
    assert_eq!(alice_view.status, "\u{1F7E9}\u{1F7E9}");
    assert!(alice_view.keyboard.unwrap().find("clear").is_none());
}
