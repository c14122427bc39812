//! Source labels derived from feed URLs.

/// Label used when a URL matches no known publisher.
pub const DEFAULT_SOURCE_LABEL: &str = "Tin tức";

/// Known publishers, matched by URL substring in this order.
const KNOWN_SOURCES: &[(&str, &str)] = &[
    ("vnexpress", "VNExpress"),
    ("tuoitre", "Tuổi Trẻ"),
    ("thanhnien", "Thanh Niên"),
];

/// Label of the publisher behind a feed URL.
pub fn source_label(url: &str) -> &'static str {
    let url = url.to_lowercase();
    KNOWN_SOURCES
        .iter()
        .find(|(needle, _)| url.contains(needle))
        .map(|(_, label)| *label)
        .unwrap_or(DEFAULT_SOURCE_LABEL)
}
