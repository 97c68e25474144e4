//! Per-user link records and their label components.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Depth component of the display label, derived from estimated consumption
/// time. `None` on the link means the referenced content has no known
/// consumption time yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Light,
    Deep,
}

impl Depth {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Depth::Light => "light",
            Depth::Deep => "deep",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Depth::Light),
            "deep" => Some(Depth::Deep),
            _ => None,
        }
    }
}

/// Perspective component of the display label: whether the item's category is
/// inside the user's current interest set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Perspective {
    Now,
    Future,
}

impl Perspective {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Perspective::Now => "now",
            Perspective::Future => "future",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "now" => Some(Perspective::Now),
            "future" => Some(Perspective::Future),
            _ => None,
        }
    }
}

/// One user's relationship to a [`crate::ContentItem`].
///
/// Created once per submission, even when the content item already existed
/// from another user's submission. The pipeline owns `depth`/`perspective`;
/// read-side callers own `memo`, `is_read`, `is_confirmed`, `last_viewed_at`
/// and `confirmed_at`. Depth/perspective stay `None` until the referenced
/// content reaches `Done`.
#[derive(Debug, Clone)]
pub struct UserContentLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_item_id: Uuid,
    pub memo: Option<String>,
    pub is_read: bool,
    pub is_confirmed: bool,
    pub depth: Option<Depth>,
    pub perspective: Option<Perspective>,
    pub last_viewed_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
