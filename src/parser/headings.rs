use super::tree::PageNode;

/// Tags that can act as a section heading, in lookup priority order.
pub const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "b"];

/// First heading-like element whose text contains `needle`.
///
/// Tag kinds are scanned in `HEADING_TAGS` order, so an `<h3>` anywhere in the
/// page beats a `<b>` that comes earlier. Matching is a case-sensitive
/// substring test.
pub fn find_heading<N: PageNode>(root: N, needle: &str) -> Option<N> {
    HEADING_TAGS.iter().find_map(|tag| {
        root.descendants_named(&[*tag])
            .into_iter()
            .find(|el| el.text_content().contains(needle))
    })
}
