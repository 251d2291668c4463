use crate::utils::error::{Result, RouterError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A navigable path without origin, e.g. `/orders` or `/orders?page=2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

impl Route {
    pub fn parse(href: &str) -> Result<Self> {
        // "//host" and "/\host" resolve to another origin
        let crosses_origin = href.starts_with("//") || href.starts_with("/\\");
        if href.is_empty() || href == "#" || !href.starts_with('/') || crosses_origin {
            return Err(RouterError::RejectedRoute {
                href: href.to_string(),
            });
        }
        Ok(Self(href.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Route {
    type Error = RouterError;

    fn try_from(value: String) -> Result<Self> {
        Route::parse(&value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationTrigger {
    LinkClick,
    HistoryPop,
    Programmatic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub route: Route,
    pub trigger: NavigationTrigger,
    pub sequence: u64,
}

/// Raw answer of the content fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentResponse {
    pub status: u16,
    pub body_html: String,
    pub title: Option<String>,
    pub css_manifest: Vec<String>,
}

/// A script element as it must be recreated: attributes in source order plus
/// its inline text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptElement {
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl ScriptElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn src(&self) -> Option<&str> {
        self.attribute("src")
    }

    pub fn is_external(&self) -> bool {
        self.src().is_some()
    }

    /// Short label for logs: the `src`, or the first line of inline code.
    pub fn describe(&self) -> String {
        match self.src() {
            Some(src) => src.to_string(),
            None => {
                let first = self.text.trim().lines().next().unwrap_or("");
                let short: String = first.chars().take(40).collect();
                format!("inline `{}`", short)
            }
        }
    }
}

/// Payload of the page-loaded broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLoaded {
    pub route: Route,
    pub sequence: u64,
    pub loaded_at: DateTime<Utc>,
}

/// Observable summary of one navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum NavigationOutcome {
    Rejected { href: String },
    Applied { route: Route, sequence: u64 },
    Failed { route: Route, sequence: u64, reason: String },
    Superseded { route: Route, sequence: u64 },
}

impl NavigationOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, NavigationOutcome::Applied { .. })
    }
}

/// Point-in-time view of the applied page, for display and inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageSnapshot {
    pub route: Option<Route>,
    pub title: String,
    pub dynamic_stylesheets: Vec<String>,
    pub loading: bool,
    pub content_html: String,
    pub history: Vec<Route>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_rejects_placeholders() {
        assert!(Route::parse("").is_err());
        assert!(Route::parse("#").is_err());
        assert!(Route::parse("https://example.com/orders").is_err());
        assert!(Route::parse("orders").is_err());
        assert_eq!(Route::parse("/orders?page=2").unwrap().as_str(), "/orders?page=2");
    }

    #[test]
    fn test_route_rejects_scheme_relative_hrefs() {
        assert!(Route::parse("//evil.example/steal").is_err());
        assert!(Route::parse("/\\evil.example/steal").is_err());
        let bad: std::result::Result<Route, _> = serde_json::from_str("\"//evil.example\"");
        assert!(bad.is_err());
        assert!(Route::parse("/orders//recent").is_ok());
    }

    #[test]
    fn test_route_deserializes_through_validation() {
        let ok: std::result::Result<Route, _> = serde_json::from_str("\"/admin_page\"");
        assert!(ok.is_ok());
        let bad: std::result::Result<Route, _> = serde_json::from_str("\"#\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_script_describe() {
        let external = ScriptElement {
            attributes: vec![("src".to_string(), "/static/js/orders.js".to_string())],
            text: String::new(),
        };
        assert!(external.is_external());
        assert_eq!(external.describe(), "/static/js/orders.js");

        let inline = ScriptElement {
            attributes: vec![],
            text: "\n  loadOrders();\n  other();".to_string(),
        };
        assert_eq!(inline.describe(), "inline `loadOrders();`");
    }
}
