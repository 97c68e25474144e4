//! URL domain classifier.
//!
//! Decides which summarization call variant a URL needs, by case-insensitive
//! pattern matching on host and path. Pure and total: every input maps to a
//! [`ContentKind`], garbage included.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

static VIDEO_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(youtube\.com/watch|youtu\.be/|vimeo\.com/\d)").expect("static pattern")
});

static NEWS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(news\.naver\.com|n\.news\.naver\.com|news\.google\.com)/")
        .expect("static pattern")
});

static BLOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\.tistory\.com/|brunch\.co\.kr/@|medium\.com/|\.substack\.com/)")
        .expect("static pattern")
});

/// Content category tag selecting the summarization call variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Video,
    NewsArticle,
    BlogArticle,
    GenericWeb,
    Unknown,
}

impl ContentKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Video => "video",
            ContentKind::NewsArticle => "news-article",
            ContentKind::BlogArticle => "blog-article",
            ContentKind::GenericWeb => "generic-web",
            ContentKind::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies a URL into a [`ContentKind`].
///
/// Unparsable URLs, URLs without a host, and non-http(s) schemes are
/// [`ContentKind::Unknown`]. Anything else that matches no known platform
/// pattern is [`ContentKind::GenericWeb`].
#[must_use]
pub fn classify(url: &str) -> ContentKind {
    let Ok(parsed) = Url::parse(url.trim()) else {
        return ContentKind::Unknown;
    };
    if parsed.host_str().is_none() || !matches!(parsed.scheme(), "http" | "https") {
        return ContentKind::Unknown;
    }

    if VIDEO_PATTERN.is_match(url) {
        return ContentKind::Video;
    }
    if NEWS_PATTERN.is_match(url) {
        return ContentKind::NewsArticle;
    }
    if BLOG_PATTERN.is_match(url) {
        return ContentKind::BlogArticle;
    }
    ContentKind::GenericWeb
}

/// True for every kind whose content must be fetched and crawled before
/// summarization — everything except videos (which have their own extraction
/// path upstream) and unknowns (which are never summarized).
#[must_use]
pub fn needs_crawling(kind: ContentKind) -> bool {
    matches!(
        kind,
        ContentKind::NewsArticle | ContentKind::BlogArticle | ContentKind::GenericWeb
    )
}
