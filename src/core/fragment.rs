use crate::domain::model::{FragmentResponse, RawResponse};
use regex::Regex;
use std::sync::OnceLock;

pub const CSS_MANIFEST_MARKER: &str = "SPA-CSS-META:";

fn title_pattern() -> &'static Regex {
    static TITLE: OnceLock<Regex> = OnceLock::new();
    TITLE.get_or_init(|| Regex::new(r"<title>(.*?)</title>").expect("valid title pattern"))
}

fn manifest_pattern() -> &'static Regex {
    static MANIFEST: OnceLock<Regex> = OnceLock::new();
    MANIFEST.get_or_init(|| {
        Regex::new(r"<!-- SPA-CSS-META:\s*(.*?)\s*-->").expect("valid manifest pattern")
    })
}

/// 只讀第一個單行 `<title>`
pub fn extract_title(html: &str) -> Option<String> {
    title_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// 第一個 `<!-- SPA-CSS-META: ... -->` 內以空白分隔的 href
pub fn extract_css_manifest(html: &str) -> Vec<String> {
    manifest_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

impl FragmentResponse {
    pub fn from_raw(raw: RawResponse) -> Self {
        let title = extract_title(&raw.body);
        let css_manifest = extract_css_manifest(&raw.body);
        Self {
            status: raw.status,
            body_html: raw.body,
            title,
            css_manifest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<title>Orders</title><div>x</div>"),
            Some("Orders".to_string())
        );
        assert_eq!(
            extract_title("<title>Замовлення — Smart3D</title>"),
            Some("Замовлення — Smart3D".to_string())
        );
        assert_eq!(extract_title("<title></title>"), Some(String::new()));
        assert_eq!(extract_title("<div>no title</div>"), None);
    }

    #[test]
    fn test_title_must_be_on_one_line() {
        assert_eq!(extract_title("<title>Multi\nline</title>"), None);
    }

    #[test]
    fn test_first_title_wins() {
        assert_eq!(
            extract_title("<title>First</title><title>Second</title>"),
            Some("First".to_string())
        );
    }

    #[test]
    fn test_extract_css_manifest() {
        assert_eq!(
            extract_css_manifest("<!-- SPA-CSS-META: /static/css/orders.css -->"),
            vec!["/static/css/orders.css".to_string()]
        );
        assert_eq!(
            extract_css_manifest("<!-- SPA-CSS-META:   /a.css\t/b.css   /c.css -->"),
            vec!["/a.css", "/b.css", "/c.css"]
        );
        assert!(extract_css_manifest("<!-- SPA-CSS-META:   -->").is_empty());
        assert!(extract_css_manifest("<!-- other comment -->").is_empty());
        assert!(extract_css_manifest("").is_empty());
    }

    #[test]
    fn test_from_raw() {
        let fragment = FragmentResponse::from_raw(RawResponse {
            status: 200,
            body: "<title>Admin</title><!-- SPA-CSS-META: /static/css/admin.css -->".to_string(),
        });
        assert_eq!(fragment.status, 200);
        assert_eq!(fragment.title.as_deref(), Some("Admin"));
        assert_eq!(fragment.css_manifest, vec!["/static/css/admin.css"]);
    }
}
