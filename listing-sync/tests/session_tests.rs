//! Step navigation gating and optimistic local lifecycle.

mod helpers;

use std::sync::Arc;

use helpers::{sample_property, FailingStore, TestEnv};
use listing_core::PropertyField;
use listing_sync::session::EditorSession;
use listing_sync::store::{RecordStore, SqliteAssetTable};

#[tokio::test]
async fn next_while_dirty_saves_exactly_once_before_advancing() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    session.set_title("Renamed Villa");
    let step = session.handle_next().await.unwrap();

    assert_eq!(step, 1);
    assert_eq!(env.records.update_count(), 1);
    assert!(!session.is_dirty(Some(PropertyField::Title)));
    assert_eq!(env.row("p1").await.title, "Renamed Villa");
}

#[tokio::test]
async fn next_while_clean_never_calls_the_store() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    let step = session.handle_next().await.unwrap();
    assert_eq!(step, 1);
    assert_eq!(env.records.update_count(), 0);
}

#[tokio::test]
async fn failed_save_blocks_navigation() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;

    let mut session = EditorSession::open(
        Arc::new(FailingStore::new(env.pool.clone())),
        Arc::new(SqliteAssetTable::new(env.pool.clone())),
        env.blobs.clone(),
        "p1",
        0,
    )
    .await
    .unwrap();

    session.set_title("Renamed");
    assert!(session.handle_next().await.is_err());

    // Still on the first step with the change pending
    assert_eq!(session.step(), 0);
    assert!(session.is_dirty(Some(PropertyField::Title)));
}

#[tokio::test]
async fn navigation_saves_only_the_current_steps_fields() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    // Features belong to step 1; we are on step 0
    session.add_feature("Pool");
    let step = session.handle_next().await.unwrap();

    assert_eq!(step, 1);
    assert_eq!(env.records.update_count(), 0);
    assert!(session.is_dirty(Some(PropertyField::Features)));
}

#[tokio::test]
async fn step_clicks_and_seeds_clamp() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;

    let mut session = EditorSession::open(
        env.records.clone(),
        env.assets.clone(),
        env.blobs.clone(),
        "p1",
        99,
    )
    .await
    .unwrap();
    assert_eq!(session.step(), 5);

    let step = session.handle_step_click(42).await.unwrap();
    assert_eq!(step, 5);
    let step = session.handle_step_click(2).await.unwrap();
    assert_eq!(step, 2);
}

#[tokio::test]
async fn feature_added_and_removed_before_save_emits_no_remote_calls() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    let feature = session.add_feature("Temporary");
    session.remove_feature(&feature.id);

    let saved = session.save().await.unwrap();
    assert!(saved);
    assert_eq!(env.records.update_count(), 0);
    assert!(!session.is_dirty(None));
}

#[tokio::test]
async fn collection_entities_get_local_ids_before_persistence() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    let feature = session.add_feature("Pool");
    assert!(!feature.id.is_empty());
    session.update_feature(&feature.id, "Heated pool").unwrap();
    assert_eq!(session.current().features[0].description, "Heated pool");
    assert_eq!(env.records.update_count(), 0);
}

#[tokio::test]
async fn delete_removes_record_rows_and_blobs() {
    let env = TestEnv::new().await;
    env.seed(&sample_property("p1", "Villa")).await;
    let mut session = env.open("p1").await;

    session.upload_image("a.jpg", b"a").await.unwrap();
    session.upload_floorplan("plan.pdf", b"plan").await.unwrap();
    session.delete().await.unwrap();

    assert!(env.records.select("p1").await.unwrap().is_none());
    assert_eq!(env.blobs.remove_count(), 2);

    use listing_sync::store::AssetTable;
    let rows = env
        .assets
        .list("p1", listing_core::db::AssetKind::Image)
        .await
        .unwrap();
    assert!(rows.is_empty());
}
