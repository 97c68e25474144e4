//! Display-label math: depth, perspective, and the 4-way label mapping.

use std::collections::HashSet;

use crate::links::{Depth, Perspective};

/// Items consumable in under this many minutes are `Light`; everything else
/// is `Deep`.
pub const LIGHT_DEEP_THRESHOLD_MIN: i32 = 10;

/// Derives the depth component from estimated consumption time.
///
/// Unknown consumption time yields `None` — never a default depth.
#[must_use]
pub fn depth_for(consumption_time_min: Option<i32>) -> Option<Depth> {
    consumption_time_min.map(|minutes| {
        if minutes < LIGHT_DEEP_THRESHOLD_MIN {
            Depth::Light
        } else {
            Depth::Deep
        }
    })
}

/// Derives the perspective component: `Now` when the item's category is in
/// the user's current interest set, `Future` otherwise.
///
/// An unknown category yields `None`.
#[must_use]
pub fn perspective_for(
    category: Option<&str>,
    now_categories: &HashSet<String>,
) -> Option<Perspective> {
    category.map(|c| {
        if now_categories.contains(c) {
            Perspective::Now
        } else {
            Perspective::Future
        }
    })
}

/// Maps a (depth, perspective) pair to its fixed display label.
///
/// Total over the four known combinations; either component missing means no
/// label can be shown yet.
#[must_use]
pub fn format_label(depth: Option<Depth>, perspective: Option<Perspective>) -> Option<&'static str> {
    match (depth?, perspective?) {
        (Depth::Light, Perspective::Now) => Some("inspiration"),
        (Depth::Deep, Perspective::Now) => Some("deep-dive"),
        (Depth::Light, Perspective::Future) => Some("growth-bite"),
        (Depth::Deep, Perspective::Future) => Some("new-horizons"),
    }
}
