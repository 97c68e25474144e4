//! Live integration tests for stashd-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness; run them with `cargo test -- --ignored` against a
//! reachable `DATABASE_URL`.

use stashd_core::{
    CompletedContent, ContentState, ContentStore, Depth, InterestStore, NewSubmission,
    Perspective, SummaryBlock,
};
use stashd_db::{content_items, interests, links, PgStore};
use uuid::Uuid;

fn submission(user_id: Uuid, url: &str) -> NewSubmission {
    NewSubmission {
        user_id,
        url: url.to_owned(),
        source_domain: "YouTube".to_owned(),
        memo: Some("for later".to_owned()),
    }
}

fn completed() -> CompletedContent {
    CompletedContent {
        title: "a talk".to_owned(),
        thumbnail_url: Some("https://img.example/t.png".to_owned()),
        category: "tech".to_owned(),
        topic: "rust".to_owned(),
        small_summary: Some("short".to_owned()),
        medium_summary: None,
        summary_blocks: vec![SummaryBlock {
            title: "intro".to_owned(),
            body: "body".to_owned(),
        }],
        consumption_time_min: Some(9),
    }
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn submissions_dedup_on_url_and_always_create_links(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let url = "https://youtube.com/watch?v=abc";

    let first = store
        .record_submission(submission(Uuid::new_v4(), url))
        .await
        .expect("first submission");
    let second = store
        .record_submission(submission(Uuid::new_v4(), url))
        .await
        .expect("second submission");

    assert!(first.content_created);
    assert!(!second.content_created);
    assert_eq!(first.content.id, second.content.id);
    assert_ne!(first.link.id, second.link.id);
    assert_eq!(second.content.state, ContentState::Pending);
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn claim_is_single_winner_and_finalize_round_trips(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let outcome = store
        .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
        .await
        .expect("submission");
    let id = outcome.content.id;

    let claimed = store.claim_for_processing(id).await.expect("claim");
    assert_eq!(claimed.expect("claimed item").state, ContentState::Running);
    assert!(
        store
            .claim_for_processing(id)
            .await
            .expect("second claim")
            .is_none(),
        "second claim must lose"
    );

    store.finalize_done(id, &completed()).await.expect("finalize");
    let item = store
        .content(id)
        .await
        .expect("fetch")
        .expect("item exists");
    assert_eq!(item.state, ContentState::Done);
    assert_eq!(item.title.as_deref(), Some("a talk"));
    assert_eq!(item.consumption_time_min, Some(9));
    assert_eq!(item.summary_blocks.len(), 1);
    assert_eq!(item.error_message, None);
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn finalize_done_refuses_non_running_items(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let outcome = store
        .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
        .await
        .expect("submission");

    let err = store
        .finalize_done(outcome.content.id, &completed())
        .await
        .expect_err("pending item must not finalize");
    assert!(matches!(
        err,
        stashd_core::StoreError::IllegalTransition { .. }
    ));
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn failed_items_restart_on_resubmission(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let url = "https://youtu.be/x";
    let outcome = store
        .record_submission(submission(Uuid::new_v4(), url))
        .await
        .expect("submission");
    let id = outcome.content.id;

    store.claim_for_processing(id).await.expect("claim");
    store
        .finalize_failed(id, "upstream rejected: 400")
        .await
        .expect("fail");

    let again = store
        .record_submission(submission(Uuid::new_v4(), url))
        .await
        .expect("resubmission");
    assert!(again.restarted);
    assert_eq!(again.content.id, id);
    assert_eq!(again.content.state, ContentState::Pending);
    assert_eq!(again.content.error_message, None);
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn label_components_write_once_per_change(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let outcome = store
        .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
        .await
        .expect("submission");
    let link_id = outcome.link.id;

    let changed = store
        .apply_label_components(link_id, Some(Depth::Light), Some(Perspective::Now))
        .await
        .expect("first write");
    assert!(changed);

    let changed = store
        .apply_label_components(link_id, Some(Depth::Light), Some(Perspective::Now))
        .await
        .expect("second write");
    assert!(!changed, "identical components must not touch the row");

    let err = store
        .apply_label_components(Uuid::new_v4(), Some(Depth::Light), None)
        .await
        .expect_err("unknown link");
    assert!(matches!(err, stashd_core::StoreError::NotFound));
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn view_marks_read_and_confirm_replaces_memo(pool: sqlx::PgPool) {
    let store = PgStore::new(pool);
    let user_id = Uuid::new_v4();
    let outcome = store
        .record_submission(submission(user_id, "https://youtu.be/x"))
        .await
        .expect("submission");
    let link_id = outcome.link.id;

    let (link, content) = store.view_link(user_id, link_id).await.expect("view");
    assert!(link.is_read);
    assert!(link.last_viewed_at.is_some());
    assert_eq!(content.id, outcome.content.id);

    store
        .confirm_link(user_id, link_id, Some("keep this".to_owned()))
        .await
        .expect("confirm");
    let (link, _) = store.view_link(user_id, link_id).await.expect("re-view");
    assert!(link.is_confirmed);
    assert_eq!(link.memo.as_deref(), Some("keep this"));

    let err = store
        .view_link(Uuid::new_v4(), link_id)
        .await
        .expect_err("other users must not see the link");
    assert!(matches!(err, stashd_core::StoreError::NotFound));
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn interest_horizons_feed_now_categories(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    interests::replace_for_horizon(
        &pool,
        user_id,
        "now",
        &["tech".to_owned(), "design".to_owned()],
    )
    .await
    .expect("seed now");
    interests::replace_for_horizon(&pool, user_id, "future", &["finance".to_owned()])
        .await
        .expect("seed future");

    let store = PgStore::new(pool);
    let now = store.now_categories(user_id).await.expect("now categories");
    assert_eq!(now.len(), 2);
    assert!(now.contains("tech"));
    assert!(!now.contains("finance"), "future horizon must not leak");
}

#[ignore]
#[sqlx::test(migrations = "../../migrations")]
async fn stuck_sweep_only_sees_old_running_items(pool: sqlx::PgPool) {
    let store = PgStore::new(pool.clone());
    let outcome = store
        .record_submission(submission(Uuid::new_v4(), "https://youtu.be/x"))
        .await
        .expect("submission");
    let id = outcome.content.id;
    store.claim_for_processing(id).await.expect("claim");

    let stuck = content_items::list_stuck_running(&pool, 30)
        .await
        .expect("sweep");
    assert!(stuck.is_empty(), "freshly claimed items are not stuck");

    sqlx::query("UPDATE content_items SET updated_at = NOW() - INTERVAL '45 minutes' WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .expect("age the row");

    let stuck = content_items::list_stuck_running(&pool, 30)
        .await
        .expect("sweep");
    assert_eq!(stuck.len(), 1);
    assert_eq!(stuck[0].id, id);

    let links = links::list_for_content(&pool, id).await.expect("links");
    assert_eq!(links.len(), 1);
}
