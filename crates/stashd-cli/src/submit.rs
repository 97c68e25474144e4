//! `submit` command: drive one URL through the pipeline from the terminal.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use stashd_pipeline::{Dispatcher, IngestGate, PipelineContext};
use stashd_summarizer::SummarizerClient;

pub(crate) async fn run(
    user: Uuid,
    url: &str,
    memo: Option<String>,
    wait: bool,
) -> anyhow::Result<()> {
    let config = stashd_core::load_app_config()?;
    let pool_config = stashd_db::PoolConfig::from_app_config(&config);
    let pool = stashd_db::connect_pool(&config.database_url, pool_config).await?;
    stashd_db::run_migrations(&pool).await?;

    let store = Arc::new(stashd_db::PgStore::new(pool));
    let summarizer = SummarizerClient::from_config(&config)?;
    let ctx = Arc::new(PipelineContext {
        store: store.clone(),
        interests: store.clone(),
        summarizer,
    });
    // One worker is plenty for a single interactive submission.
    let dispatcher = Dispatcher::start(Arc::clone(&ctx), 1, 4);
    let gate = IngestGate::new(Arc::clone(&ctx), dispatcher.handle());

    let receipt = gate.submit(user, url, memo).await?;
    println!("link id:      {}", receipt.link_id);
    println!("content id:   {}", receipt.content_item_id);
    println!("state:        {}", receipt.state);
    println!("new content:  {}", receipt.content_created);

    if wait {
        loop {
            let item = ctx
                .store
                .content(receipt.content_item_id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("content item disappeared"))?;
            if item.state.is_terminal() {
                println!("final state:  {}", item.state);
                if let Some(title) = &item.title {
                    println!("title:        {title}");
                }
                if let Some(minutes) = item.consumption_time_min {
                    println!("est. minutes: {minutes}");
                }
                if let Some(error) = &item.error_message {
                    println!("error:        {error}");
                }
                break;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    dispatcher.shutdown().await;
    Ok(())
}
