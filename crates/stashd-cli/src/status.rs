//! `status` command: print one saved link with its content and label.

use uuid::Uuid;

use stashd_core::labels::format_label;
use stashd_core::ContentStore;

pub(crate) async fn run(user: Uuid, link_id: Uuid) -> anyhow::Result<()> {
    let pool = stashd_db::connect_pool_from_env().await?;
    let store = stashd_db::PgStore::new(pool);

    let (link, content) = store.view_link(user, link_id).await?;

    println!("url:          {}", content.url);
    println!("source:       {}", content.source_domain);
    println!("state:        {}", content.state);
    if let Some(title) = &content.title {
        println!("title:        {title}");
    }
    if let Some(category) = &content.category {
        println!("category:     {category}");
    }
    if let Some(minutes) = content.consumption_time_min {
        println!("est. minutes: {minutes}");
    }
    match format_label(link.depth, link.perspective) {
        Some(label) => println!("label:        {label}"),
        None => println!("label:        (not yet classified)"),
    }
    if let Some(memo) = &link.memo {
        println!("memo:         {memo}");
    }
    if let Some(error) = &content.error_message {
        println!("error:        {error}");
    }
    println!("read:         {}", link.is_read);
    println!("confirmed:    {}", link.is_confirmed);
    Ok(())
}
