use crate::core::events::GlobalScope;
use crate::domain::model::{RawResponse, Route, ScriptElement};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Opaque handle to a node of the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// An inert script found inside the mount point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSlot {
    pub node: NodeId,
    pub script: ScriptElement,
}

/// Performs the HTTP request for a route.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, route: &Route, headers: &[(&str, &str)]) -> Result<RawResponse>;
}

/// Runs a freshly created script element. Implementations only have to start
/// external scripts; the engine never waits for them to finish loading.
pub trait ScriptExecutor: Send + Sync {
    fn execute(&self, script: &ScriptElement, scope: &GlobalScope) -> Result<()>;
}

/// The DOM surface the navigation engine owns. The host decides which element
/// is the mount point and which attributes mark navigable links and dynamic
/// stylesheets.
pub trait Document: Send {
    fn has_mount_point(&self) -> bool;

    fn is_loading(&self) -> bool;
    fn set_loading(&mut self, loading: bool);

    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);

    /// hrefs of the injected stylesheets, in document order.
    fn dynamic_stylesheets(&self) -> Vec<String>;
    fn remove_dynamic_stylesheets(&mut self) -> usize;
    fn append_dynamic_stylesheet(&mut self, href: &str);

    /// Replaces the mount point's children with `html`. Scripts created this
    /// way must stay inert.
    fn replace_content(&mut self, html: &str);
    fn content_html(&self) -> String;

    /// Inert scripts inside the mount point, in document order.
    fn inert_scripts(&self) -> Vec<ScriptSlot>;
    /// Puts a fresh, executable copy of `script` where `slot` was.
    fn substitute_script(&mut self, slot: NodeId, script: &ScriptElement) -> NodeId;

    /// href of the closest ancestor-or-self of `node` carrying the navigable
    /// marker. `Some(None)` means a marked element without an href.
    fn navigable_target(&self, node: NodeId) -> Option<Option<String>>;

    fn scroll_position(&self) -> (i64, i64);
    fn scroll_to(&mut self, x: i64, y: i64);
}

/// Session history as the browser keeps it: URLs only, no state object.
pub trait BrowserHistory: Send {
    fn push(&mut self, route: &Route);
    fn current(&self) -> Option<Route>;
    /// Moves the cursor one entry back. Returns false at the start.
    fn back(&mut self) -> bool;
    /// Moves the cursor one entry forward. Returns false at the end.
    fn forward(&mut self) -> bool;
    fn entries(&self) -> Vec<Route>;
}
