//! Label fan-out: recomputing depth/perspective for every link on an item.
//!
//! Labels are derived state, so every function here is safe to re-run; a
//! second pass over unchanged inputs writes nothing.

use stashd_core::labels;
use stashd_core::{ContentStore, InterestStore, StoreError, UserContentLink};
use uuid::Uuid;

/// Recomputes and stores label components for one link.
///
/// Returns `true` when the stored components changed.
pub async fn relabel_link(
    store: &dyn ContentStore,
    interests: &dyn InterestStore,
    link: &UserContentLink,
    category: Option<&str>,
    consumption_time_min: Option<i32>,
) -> Result<bool, StoreError> {
    let depth = labels::depth_for(consumption_time_min);
    let now_categories = interests.now_categories(link.user_id).await?;
    let perspective = labels::perspective_for(category, &now_categories);
    store
        .apply_label_components(link.id, depth, perspective)
        .await
}

/// Recomputes labels for every link pointing at `content_id`.
///
/// Depth is shared across links; perspective is per-user, driven by each
/// owner's current interest set. Returns the number of links whose stored
/// components actually changed.
pub async fn relabel_content(
    store: &dyn ContentStore,
    interests: &dyn InterestStore,
    content_id: Uuid,
    category: Option<&str>,
    consumption_time_min: Option<i32>,
) -> Result<usize, StoreError> {
    let links = store.links_for_content(content_id).await?;
    let mut updated = 0;
    for link in &links {
        if relabel_link(store, interests, link, category, consumption_time_min).await? {
            updated += 1;
        }
    }
    Ok(updated)
}
