//! Integration tests for view repair and broadcast isolation.

mod helpers;

use parkhub_core::error::ErrorKind;
use parkhub_core::types::id::ActorId;
use parkhub_view::{RefreshOutcome, ViewUpdate};

#[tokio::test]
async fn test_broadcast_repairs_deleted_view() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    app.start("2", "Bob").await;
    let old_ids: Vec<String> = app.surfaces("2").into_iter().map(|s| s.id).collect();

    assert_eq!(app.transport.remove_actor_surfaces(&ActorId::from("2")), 2);
    app.tap(&alice, "1").await;

    let surfaces = app.surfaces("2");
    assert_eq!(surfaces.len(), 2);
    assert!(surfaces.iter().all(|s| !old_ids.contains(&s.id)));
    assert_eq!(surfaces[0].text, "*Alice* reserved place *1*");
    assert_eq!(surfaces[1].text, "\u{1F7E8}\u{1F7E9}");
}

#[tokio::test]
async fn test_partial_loss_is_repaired_without_leftovers() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    let status_id = app.surfaces("1")[1].id.clone();

    assert!(app.transport.remove_surface(&status_id));
    app.tap(&alice, "2").await;

    let surfaces = app.surfaces("1");
    assert_eq!(surfaces.len(), 2);
    assert_eq!(surfaces[0].text, "*Alice* reserved place *2*");
    assert!(surfaces[1].keyboard.as_ref().unwrap().find("cancel.2").is_some());
}

#[tokio::test]
async fn test_update_desync_then_repair() {
    let app = helpers::TestApp::new().await;
    app.start("1", "Alice").await;
    let actor = ActorId::from("1");
    let views = app.service.views();

    app.transport.remove_actor_surfaces(&actor);
    let update = ViewUpdate::info("hello");
    let err = views.update_view(&actor, &update).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Desynchronized);

    views.repair_view(&actor, &update).await.unwrap();
    views.update_view(&actor, &ViewUpdate::info("again")).await.unwrap();
    assert_eq!(app.surfaces("1")[0].text, "again");
    assert_eq!(
        views.refresh_view(&actor, &update).await.unwrap(),
        RefreshOutcome::Updated
    );
}

#[tokio::test]
async fn test_unreachable_actor_does_not_block_others() {
    let app = helpers::TestApp::new().await;
    let alice = app.start("1", "Alice").await;
    app.start("2", "Bob").await;
    app.start("3", "Carol").await;

    let bob = ActorId::from("2");
    app.transport.remove_actor_surfaces(&bob);
    app.transport.block_actor(&bob);

    assert_eq!(app.tap(&alice, "1").await, "You reserved place 1");
    assert_eq!(app.content("3").await.info, "*Alice* reserved place *1*");
    assert!(app.surfaces("2").is_empty());

    app.transport.unblock_actor(&bob);
    app.tap(&alice, "1").await;
    assert_eq!(app.surfaces("2")[0].text, "*Alice* occupied place *1*");
}

#[tokio::test]
async fn test_offline_transport_fails_start_without_state_change() {
    let app = helpers::TestApp::new().await;
    app.transport.set_offline(true);

    let err = app
        .service
        .start(&helpers::actor("1", "Alice"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Transport);
    assert!(app.service.views().is_empty());
    assert!(app.service.lot().is_free().await);
}
