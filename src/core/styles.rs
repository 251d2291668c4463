use crate::domain::ports::Document;

/// Drops the stylesheets injected for the previous page and injects the ones
/// listed in the new fragment's manifest, in order. Hand-authored stylesheets
/// of the shell are never touched.
pub fn reconcile_stylesheets<D: Document + ?Sized>(document: &mut D, manifest: &[String]) {
    let removed = document.remove_dynamic_stylesheets();
    tracing::debug!("Removed {} dynamic stylesheet(s)", removed);

    if manifest.is_empty() {
        tracing::debug!("No page-specific stylesheets for this route");
        return;
    }

    for href in manifest.iter().filter(|href| !href.is_empty()) {
        tracing::debug!("Injecting stylesheet {}", href);
        document.append_dynamic_stylesheet(href);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::dom::{HeadlessDocument, ShellOptions};

    const SHELL: &str = r#"<html><head><link rel="stylesheet" href="/static/css/main.css"></head>
<body><main id="main-content"></main></body></html>"#;

    #[test]
    fn test_replaces_previous_set() {
        let mut doc = HeadlessDocument::parse(SHELL, ShellOptions::default());

        reconcile_stylesheets(&mut doc, &["/a.css".to_string(), "/b.css".to_string()]);
        assert_eq!(doc.dynamic_stylesheets(), vec!["/a.css", "/b.css"]);

        reconcile_stylesheets(&mut doc, &["/c.css".to_string()]);
        assert_eq!(doc.dynamic_stylesheets(), vec!["/c.css"]);

        reconcile_stylesheets(&mut doc, &[]);
        assert!(doc.dynamic_stylesheets().is_empty());
    }

    #[test]
    fn test_keeps_shell_stylesheets() {
        let mut doc = HeadlessDocument::parse(SHELL, ShellOptions::default());
        reconcile_stylesheets(&mut doc, &["/a.css".to_string()]);
        reconcile_stylesheets(&mut doc, &[]);
        assert_eq!(doc.stylesheet_hrefs(), vec!["/static/css/main.css"]);
    }
}
