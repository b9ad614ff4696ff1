use url::Url;

use crate::model::Asset;
use crate::parser::tree::PageNode;

/// Every link to a PDF, a Java source file or a tree/browse page, in page
/// order. Duplicates are kept.
pub fn extract<N: PageNode>(root: N, base: Option<&Url>) -> Vec<Asset> {
    root.descendants_named(&["a"])
        .into_iter()
        .filter_map(|a| {
            let href = a.attr("href")?;
            let url = resolve(base, href);
            if !is_asset(&url) {
                return None;
            }
            let text = a.text_content();
            let name = match text.trim() {
                "" => url.clone(),
                t => t.to_string(),
            };
            Some(Asset { name, url })
        })
        .collect()
}

fn is_asset(url: &str) -> bool {
    url.ends_with(".pdf") || url.ends_with(".java") || url.to_lowercase().contains("tree")
}

/// Absolute form of `href`; falls back to the raw value when it can't be resolved.
fn resolve(base: Option<&Url>, href: &str) -> String {
    let joined = match base {
        Some(b) => b.join(href),
        None => Url::parse(href),
    };
    joined
        .map(String::from)
        .unwrap_or_else(|_| href.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn run(html: &str, base: &str) -> Vec<Asset> {
        let page = Html::parse_document(html);
        let base = Url::parse(base).ok();
        extract(page.root_element(), base.as_ref())
    }

    #[test]
    fn filters_by_extension_and_tree() {
        let assets = run(
            r#"<a href="report.pdf">Report</a>
               <a href="src/Source.java"> Source </a>
               <a href="/tree/abc">Browse</a>
               <a href="index.html">Home</a>"#,
            "http://hash.h10a.de/",
        );
        let urls: Vec<_> = assets.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "http://hash.h10a.de/report.pdf",
                "http://hash.h10a.de/src/Source.java",
                "http://hash.h10a.de/tree/abc",
            ]
        );
        assert_eq!(assets[1].name, "Source");
    }

    #[test]
    fn empty_text_uses_url_and_duplicates_kept() {
        let assets = run(
            r#"<a href="a.pdf"> </a><a href="a.pdf">A</a><a>no href.pdf</a>"#,
            "http://example.org/dir/",
        );
        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].name, "http://example.org/dir/a.pdf");
        assert_eq!(assets[0].url, assets[1].url);
    }

    #[test]
    fn tree_match_is_case_insensitive() {
        let assets = run(r#"<a href="https://git.example/TreeView">t</a>"#, "http://x/");
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn unresolvable_base_keeps_href() {
        let assets = run(r#"<a href="docs/spec.pdf">Spec</a>"#, "not a url");
        assert_eq!(assets[0].url, "docs/spec.pdf");
    }
}
