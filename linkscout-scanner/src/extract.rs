use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

static REFERENCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a, link, script, img").unwrap());

/// The elements whose references are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    /// `<a href>`
    Anchor,
    /// `<link href>` (stylesheets, icons, preloads)
    Link,
    /// `<script src>`
    Script,
    /// `<img src>`
    Image,
}

impl ReferenceKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "a" => Some(ReferenceKind::Anchor),
            "link" => Some(ReferenceKind::Link),
            "script" => Some(ReferenceKind::Script),
            "img" => Some(ReferenceKind::Image),
            _ => None,
        }
    }

    pub fn attribute(&self) -> &'static str {
        match self {
            ReferenceKind::Anchor | ReferenceKind::Link => "href",
            ReferenceKind::Script | ReferenceKind::Image => "src",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub value: String,
}

/// The raw references of a parsed page, in document order.
///
/// Parsing never fails: html5ever recovers what it can from malformed markup,
/// so a broken page simply yields fewer (or no) references.
#[derive(Debug, Clone, Default)]
pub struct Document {
    references: Vec<Reference>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let references = document
            .select(&REFERENCE_SELECTOR)
            .filter_map(|element| {
                let kind = ReferenceKind::from_tag(element.value().name())?;
                let value = element.value().attr(kind.attribute())?;
                Some(Reference {
                    kind,
                    value: value.to_string(),
                })
            })
            .collect();

        Self { references }
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }
}

/// Resolve every non-empty reference in `document` against `origin`.
///
/// Yields absolute URLs lazily, in document order, duplicates included.
/// References that cannot be joined are skipped.
pub fn extract<'a>(origin: &'a Url, document: &'a Document) -> impl Iterator<Item = String> + 'a {
    document
        .references()
        .iter()
        .filter(|reference| !reference.value.is_empty())
        .filter_map(move |reference| resolve_url(origin, &reference.value))
}

/// RFC 3986 reference resolution. Absolute references come back as-is
/// (modulo serialization), everything else is joined onto `base`.
pub fn resolve_url(base: &Url, reference: &str) -> Option<String> {
    match base.join(reference) {
        Ok(url) => Some(url.to_string()),
        Err(e) => {
            debug!("Skipping unresolvable reference {:?} on {}: {}", reference, base, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(html: &str, origin: &str) -> Vec<String> {
        let origin = Url::parse(origin).unwrap();
        let document = Document::parse(html);
        extract(&origin, &document).collect()
    }

    #[test]
    fn test_resolve_parent_relative() {
        let base = Url::parse("https://x.test/a/b").unwrap();
        assert_eq!(resolve_url(&base, "../c"), Some("https://x.test/c".to_string()));
    }

    #[test]
    fn test_resolve_path_relative() {
        let base = Url::parse("https://x.test/a/").unwrap();
        assert_eq!(resolve_url(&base, "c"), Some("https://x.test/a/c".to_string()));
    }

    #[test]
    fn test_resolve_absolute_unchanged() {
        let base = Url::parse("https://x.test/a/").unwrap();
        assert_eq!(
            resolve_url(&base, "https://other.test/d"),
            Some("https://other.test/d".to_string())
        );
    }

    #[test]
    fn test_resolve_scheme_relative() {
        let base = Url::parse("https://x.test/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "//cdn.test/app.js"),
            Some("https://cdn.test/app.js".to_string())
        );
    }

    #[test]
    fn test_resolve_query_only() {
        let base = Url::parse("https://x.test/a/b?old=1").unwrap();
        assert_eq!(
            resolve_url(&base, "?page=2"),
            Some("https://x.test/a/b?page=2".to_string())
        );
    }

    #[test]
    fn test_resolve_fragment_only() {
        let base = Url::parse("https://x.test/a/b").unwrap();
        assert_eq!(
            resolve_url(&base, "#top"),
            Some("https://x.test/a/b#top".to_string())
        );
    }

    #[test]
    fn test_resolve_malformed_reference() {
        let base = Url::parse("https://x.test/").unwrap();
        assert_eq!(resolve_url(&base, "http://[not-an-ip/"), None);
    }

    #[test]
    fn test_document_collects_all_element_kinds() {
        let html = r#"<html><head>
                <link rel="stylesheet" href="/style.css">
                <script src="/app.js"></script>
            </head><body>
                <a href="/about">About</a>
                <img src="logo.png">
            </body></html>"#;

        let document = Document::parse(html);
        let kinds: Vec<ReferenceKind> = document.references().iter().map(|r| r.kind).collect();

        assert_eq!(
            kinds,
            vec![
                ReferenceKind::Link,
                ReferenceKind::Script,
                ReferenceKind::Anchor,
                ReferenceKind::Image,
            ]
        );
    }

    #[test]
    fn test_elements_without_attribute_are_skipped() {
        let html = r#"<a name="anchor">x</a><script>var a = 1;</script><img alt="none"><link rel="x">"#;
        assert!(Document::parse(html).references().is_empty());
    }

    #[test]
    fn test_wrong_attribute_is_ignored() {
        // `src` on an anchor and `href` on an image are not references
        let html = r#"<a src="/nope">x</a><img href="/nope">"#;
        assert!(Document::parse(html).references().is_empty());
    }

    #[test]
    fn test_extract_document_order_with_duplicates() {
        let html = r#"
            <a href="/one">1</a>
            <img src="/two.png">
            <a href="/one">again</a>
        "#;

        assert_eq!(
            links(html, "https://x.test/"),
            vec![
                "https://x.test/one",
                "https://x.test/two.png",
                "https://x.test/one",
            ]
        );
    }

    #[test]
    fn test_extract_skips_empty_references() {
        let html = r#"<a href="">empty</a><a href="/kept">kept</a>"#;
        assert_eq!(links(html, "https://x.test/"), vec!["https://x.test/kept"]);
    }

    #[test]
    fn test_extract_skips_bad_reference_but_keeps_rest() {
        let html = r#"<a href="http://[broken/">bad</a><script src="/ok.js"></script>"#;
        assert_eq!(links(html, "https://x.test/"), vec!["https://x.test/ok.js"]);
    }

    #[test]
    fn test_extract_keeps_non_http_schemes() {
        let html = r#"<a href="mailto:someone@x.test">mail</a>"#;
        assert_eq!(links(html, "https://x.test/"), vec!["mailto:someone@x.test"]);
    }

    #[test]
    fn test_extract_from_malformed_markup() {
        let html = r#"<div><a href="/recovered">unclosed <p><img src="/pic.gif""#;
        let found = links(html, "https://x.test/");
        assert!(found.contains(&"https://x.test/recovered".to_string()));
    }
}
