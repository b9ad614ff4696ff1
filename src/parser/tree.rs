use scraper::ElementRef;

/// The slice of a parsed HTML tree the extractors need.
///
/// Extractors are written against this trait only, so the parsing crate
/// underneath can change without touching them.
pub trait PageNode: Copy {
    /// Lowercase tag name.
    fn tag_name(&self) -> &str;

    fn attr(&self, name: &str) -> Option<&str>;

    /// Concatenated text of every descendant text node, untrimmed.
    fn text_content(&self) -> String;

    fn next_element_sibling(&self) -> Option<Self>;

    /// Descendant elements whose tag is in `tags`, in document order.
    /// The node itself is never included.
    fn descendants_named(&self, tags: &[&str]) -> Vec<Self>;

    fn is(&self, tag: &str) -> bool {
        self.tag_name().eq_ignore_ascii_case(tag)
    }
}

impl<'a> PageNode for ElementRef<'a> {
    fn tag_name(&self) -> &str {
        self.value().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.value().attr(name)
    }

    fn text_content(&self) -> String {
        self.text().collect()
    }

    fn next_element_sibling(&self) -> Option<Self> {
        self.next_siblings().find_map(ElementRef::wrap)
    }

    fn descendants_named(&self, tags: &[&str]) -> Vec<Self> {
        self.descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|el| tags.iter().any(|t| el.is(t)))
            .collect()
    }
}
