//! Source-domain normalization for display and deduplication.

use url::Url;

/// Extracts the host from a URL with any leading `www.` stripped.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_owned())
}

/// Maps a URL to its canonical source-domain label.
///
/// Known platforms collapse to one fixed label each (all YouTube hosts become
/// `YouTube`, and so on); unknown hosts fall back to the raw stripped host;
/// a URL without a usable host is `Unknown`.
#[must_use]
pub fn canonical_source_name(url: &str) -> String {
    let Some(host) = extract_host(url) else {
        return "Unknown".to_owned();
    };

    let lowered = host.to_ascii_lowercase();
    let label = if lowered.contains("youtube.com") || lowered.contains("youtu.be") {
        "YouTube"
    } else if lowered.contains("vimeo.com") {
        "Vimeo"
    } else if lowered.contains("news.naver.com") {
        "Naver News"
    } else if lowered.contains("news.google.com") {
        "Google News"
    } else if lowered.contains("medium.com") {
        "Medium"
    } else if lowered.contains("substack.com") {
        "Substack"
    } else if lowered.contains("tistory.com") {
        "Tistory"
    } else if lowered.contains("brunch.co.kr") {
        "Brunch"
    } else {
        return host;
    };
    label.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_host_strips_leading_www() {
        assert_eq!(
            extract_host("https://www.example.com/page").as_deref(),
            Some("example.com")
        );
        assert_eq!(
            extract_host("https://example.com/page").as_deref(),
            Some("example.com")
        );
    }

    #[test]
    fn extract_host_rejects_malformed_input() {
        assert_eq!(extract_host("definitely not a url"), None);
        assert_eq!(extract_host("mailto:a@b.c"), None);
    }

    #[test]
    fn video_hosts_collapse_to_one_label() {
        assert_eq!(
            canonical_source_name("https://www.youtube.com/watch?v=x"),
            "YouTube"
        );
        assert_eq!(canonical_source_name("https://youtu.be/x"), "YouTube");
    }

    #[test]
    fn unknown_hosts_keep_the_raw_host() {
        assert_eq!(
            canonical_source_name("https://www.rust-lang.org/learn"),
            "rust-lang.org"
        );
    }

    #[test]
    fn unparsable_urls_are_unknown() {
        assert_eq!(canonical_source_name("::::"), "Unknown");
    }
}
