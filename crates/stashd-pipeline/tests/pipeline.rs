//! End-to-end pipeline tests against the in-memory store and a mocked
//! summarizer.

use std::sync::Arc;
use std::time::Duration;

use stashd_core::labels::format_label;
use stashd_core::{ContentState, Depth, Perspective};
use stashd_pipeline::{fanout, Dispatcher, IngestError, IngestGate, MemoryStore, PipelineContext};
use stashd_summarizer::SummarizerClient;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Harness {
    store: Arc<MemoryStore>,
    gate: IngestGate,
    dispatcher: Dispatcher,
    server: MockServer,
}

async fn harness_with(workers: usize, queue_capacity: usize) -> Harness {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let summarizer = SummarizerClient::new(&server.uri(), 5, 5, 3, 0).expect("client");
    let ctx = Arc::new(PipelineContext {
        store: store.clone(),
        interests: store.clone(),
        summarizer,
    });
    let dispatcher = Dispatcher::start(ctx.clone(), workers, queue_capacity);
    let gate = IngestGate::new(ctx, dispatcher.handle());
    Harness {
        store,
        gate,
        dispatcher,
        server,
    }
}

async fn harness() -> Harness {
    harness_with(4, 16).await
}

fn video_body(duration_secs: i64) -> serde_json::Value {
    serde_json::json!({
        "video_info": {
            "title": "a talk",
            "thumbnail_url": "https://img.example/t.png",
            "duration": duration_secs
        },
        "analysis": {
            "category": "tech",
            "topic": "rust",
            "small_card_summary": "short",
            "medium_card_summary": "medium",
            "summaries": [{"title": "intro", "content": "body"}]
        }
    })
}

fn article_body(word_count: i64) -> serde_json::Value {
    serde_json::json!({
        "article_info": {"title": "a story", "word_count": word_count},
        "analysis": {"category": "design", "topic": "typography", "summaries": []}
    })
}

/// Polls the store until the URL's content item reaches a terminal state.
async fn wait_terminal(store: &MemoryStore, url: &str) -> stashd_core::ContentItem {
    for _ in 0..200 {
        if let Some(item) = store.content_for_url(url) {
            if item.state.is_terminal() {
                return item;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("content item for {url} never reached a terminal state");
}

#[tokio::test]
async fn success_populates_content_and_labels_per_user() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body(540)))
        .mount(&h.server)
        .await;

    let tech_fan = Uuid::new_v4();
    let other = Uuid::new_v4();
    h.store.set_now_categories(tech_fan, ["tech"]);

    let url = "https://youtube.com/watch?v=abc";
    let first = h
        .gate
        .submit(tech_fan, url, Some("watch later".to_owned()))
        .await
        .expect("first submission");
    let second = h.gate.submit(other, url, None).await.expect("second submission");
    assert!(first.content_created);
    assert_eq!(first.content_item_id, second.content_item_id);

    let item = wait_terminal(&h.store, url).await;
    assert_eq!(item.state, ContentState::Done);
    assert_eq!(item.title.as_deref(), Some("a talk"));
    assert_eq!(item.category.as_deref(), Some("tech"));
    assert_eq!(item.consumption_time_min, Some(9));
    assert_eq!(item.summary_blocks.len(), 1);

    // The dispatcher merged or the store refused the duplicate claim; either
    // way exactly one upstream call was made for two submissions.
    h.dispatcher.shutdown().await;
    assert_eq!(h.server.received_requests().await.expect("requests").len(), 1);

    let first_link = h.store.link_snapshot(first.link_id).expect("first link");
    let second_link = h.store.link_snapshot(second.link_id).expect("second link");
    assert_eq!(first_link.depth, Some(Depth::Light));
    assert_eq!(first_link.perspective, Some(Perspective::Now));
    assert_eq!(
        format_label(first_link.depth, first_link.perspective),
        Some("inspiration")
    );
    assert_eq!(second_link.perspective, Some(Perspective::Future));
    assert_eq!(
        format_label(second_link.depth, second_link.perspective),
        Some("growth-bite")
    );
}

#[tokio::test]
async fn article_flow_uses_word_count_for_depth() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/article"))
        .respond_with(ResponseTemplate::new(200).set_body_json(article_body(4000)))
        .mount(&h.server)
        .await;

    let user = Uuid::new_v4();
    let url = "https://blog.tistory.com/entry/1";
    let receipt = h.gate.submit(user, url, None).await.expect("submission");

    let item = wait_terminal(&h.store, url).await;
    assert_eq!(item.state, ContentState::Done);
    assert_eq!(item.consumption_time_min, Some(10));

    h.dispatcher.shutdown().await;
    let link = h.store.link_snapshot(receipt.link_id).expect("link");
    assert_eq!(link.depth, Some(Depth::Deep));
}

#[tokio::test]
async fn transient_errors_retry_within_budget() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/article"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/article"))
        .respond_with(ResponseTemplate::new(200).set_body_json(article_body(1200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let url = "https://medium.com/@a/post";
    h.gate.submit(Uuid::new_v4(), url, None).await.expect("submission");

    let item = wait_terminal(&h.store, url).await;
    assert_eq!(item.state, ContentState::Done);
    assert_eq!(item.consumption_time_min, Some(3));
    h.dispatcher.shutdown().await;
}

#[tokio::test]
async fn upstream_rejection_fails_item_with_message_preserved() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(400).set_body_string("no transcript available"))
        .expect(1)
        .mount(&h.server)
        .await;

    let user = Uuid::new_v4();
    let url = "https://youtu.be/broken";
    let receipt = h.gate.submit(user, url, None).await.expect("submission");

    let item = wait_terminal(&h.store, url).await;
    assert_eq!(item.state, ContentState::Failed);
    let message = item.error_message.expect("failure message");
    assert!(message.contains("400"), "message was: {message}");
    assert!(
        message.contains("no transcript available"),
        "message was: {message}"
    );

    h.dispatcher.shutdown().await;
    let link = h.store.link_snapshot(receipt.link_id).expect("link");
    assert_eq!(link.depth, None);
    assert_eq!(link.perspective, None);
}

#[tokio::test]
async fn unsupported_kind_fails_without_calling_upstream() {
    let h = harness().await;

    let url = "ftp://files.example.com/archive.zip";
    h.gate.submit(Uuid::new_v4(), url, None).await.expect("submission");

    let item = wait_terminal(&h.store, url).await;
    assert_eq!(item.state, ContentState::Failed);
    assert!(
        item.error_message
            .as_deref()
            .expect("failure message")
            .contains("unsupported domain type"),
    );

    h.dispatcher.shutdown().await;
    assert!(h.server.received_requests().await.expect("requests").is_empty());
}

#[tokio::test]
async fn malformed_url_is_rejected_before_any_write() {
    let h = harness().await;

    let err = h
        .gate
        .submit(Uuid::new_v4(), "not a url at all", None)
        .await
        .expect_err("must reject");
    assert!(matches!(err, IngestError::InvalidUrl(_)));
    assert_eq!(h.store.content_count(), 0);
    assert_eq!(h.store.link_count(), 0);
    h.dispatcher.shutdown().await;
}

#[tokio::test]
async fn submitting_a_done_url_labels_the_new_link_inline() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body(1200)))
        .expect(1)
        .mount(&h.server)
        .await;

    let url = "https://vimeo.com/12345";
    h.gate.submit(Uuid::new_v4(), url, None).await.expect("first");
    wait_terminal(&h.store, url).await;

    let late_user = Uuid::new_v4();
    h.store.set_now_categories(late_user, ["tech"]);
    let receipt = h.gate.submit(late_user, url, None).await.expect("late submission");
    assert_eq!(receipt.state, ContentState::Done);
    assert!(!receipt.content_created);

    let link = h.store.link_snapshot(receipt.link_id).expect("link");
    assert_eq!(link.depth, Some(Depth::Deep));
    assert_eq!(link.perspective, Some(Perspective::Now));
    assert_eq!(format_label(link.depth, link.perspective), Some("deep-dive"));
    h.dispatcher.shutdown().await;
}

#[tokio::test]
async fn failed_item_restarts_on_fresh_submission() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad id"))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body(60)))
        .mount(&h.server)
        .await;

    let url = "https://youtu.be/flaky";
    h.gate.submit(Uuid::new_v4(), url, None).await.expect("first");
    let failed = wait_terminal(&h.store, url).await;
    assert_eq!(failed.state, ContentState::Failed);

    let receipt = h.gate.submit(Uuid::new_v4(), url, None).await.expect("retry");
    assert_eq!(receipt.state, ContentState::Pending);
    let done = wait_terminal(&h.store, url).await;
    assert_eq!(done.state, ContentState::Done);
    assert_eq!(done.error_message, None);
    assert_eq!(h.store.content_count(), 1, "restart must reuse the item");
    assert_eq!(h.store.link_count(), 2);
    h.dispatcher.shutdown().await;
}

#[tokio::test]
async fn full_queue_rejects_with_busy() {
    let h = harness_with(1, 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(video_body(60))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&h.server)
        .await;

    let user = Uuid::new_v4();
    h.gate
        .submit(user, "https://youtu.be/one", None)
        .await
        .expect("first submission");

    // Wait until the single worker has claimed the first item so the queue
    // slot is actually free for the second.
    for _ in 0..200 {
        if h.store
            .content_for_url("https://youtu.be/one")
            .is_some_and(|item| item.state == ContentState::Running)
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    h.gate
        .submit(user, "https://youtu.be/two", None)
        .await
        .expect("second submission fills the queue");
    let err = h
        .gate
        .submit(user, "https://youtu.be/three", None)
        .await
        .expect_err("third submission must be rejected");
    assert!(matches!(err, IngestError::Busy));
    h.dispatcher.shutdown().await;
}

#[tokio::test]
async fn relabel_is_idempotent() {
    let h = harness().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/summarize/video"))
        .respond_with(ResponseTemplate::new(200).set_body_json(video_body(540)))
        .mount(&h.server)
        .await;

    let url = "https://youtube.com/watch?v=again";
    let receipt = h.gate.submit(Uuid::new_v4(), url, None).await.expect("submission");
    let item = wait_terminal(&h.store, url).await;
    h.dispatcher.shutdown().await;

    let updated = fanout::relabel_content(
        h.store.as_ref(),
        h.store.as_ref(),
        receipt.content_item_id,
        item.category.as_deref(),
        item.consumption_time_min,
    )
    .await
    .expect("relabel");
    assert_eq!(updated, 0, "second pass must write nothing");
}
