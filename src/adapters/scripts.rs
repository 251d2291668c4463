use crate::core::events::GlobalScope;
use crate::domain::model::ScriptElement;
use crate::domain::ports::ScriptExecutor;
use crate::utils::error::Result;
use std::sync::{Arc, Mutex};

pub type PageModule = Arc<dyn Fn(&ScriptElement, &GlobalScope) -> Result<()> + Send + Sync>;

enum Matcher {
    Source(String),
    InlineMarker(String),
}

impl Matcher {
    fn matches(&self, script: &ScriptElement) -> bool {
        match self {
            Matcher::Source(src) => script
                .src()
                .map(|candidate| strip_query(candidate) == src.as_str())
                .unwrap_or(false),
            Matcher::InlineMarker(marker) => !script.is_external() && script.text.contains(marker),
        }
    }
}

fn strip_query(src: &str) -> &str {
    src.split(['?', '#']).next().unwrap_or(src)
}

/// Whether a browser would run a script with this `type` attribute. Data
/// blocks such as `application/json` are left alone.
pub fn is_executable_type(script: &ScriptElement) -> bool {
    match script.attribute("type").map(|t| t.trim().to_ascii_lowercase()) {
        None => true,
        Some(t) if t.is_empty() || t == "module" => true,
        Some(t) => matches!(
            t.as_str(),
            "text/javascript"
                | "application/javascript"
                | "application/ecmascript"
                | "text/ecmascript"
                | "text/jscript"
        ),
    }
}

/// Runs native page modules in place of the scripts a fragment ships.
///
/// External scripts are matched by `src` (query string ignored), inline
/// scripts by a marker substring of their text. Scripts with no registered
/// module are only recorded.
#[derive(Default)]
pub struct ScriptRegistry {
    modules: Vec<(Matcher, PageModule)>,
    executed: Mutex<Vec<String>>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_external<F>(mut self, src: &str, module: F) -> Self
    where
        F: Fn(&ScriptElement, &GlobalScope) -> Result<()> + Send + Sync + 'static,
    {
        self.modules
            .push((Matcher::Source(strip_query(src).to_string()), Arc::new(module)));
        self
    }

    pub fn register_inline<F>(mut self, marker: &str, module: F) -> Self
    where
        F: Fn(&ScriptElement, &GlobalScope) -> Result<()> + Send + Sync + 'static,
    {
        self.modules
            .push((Matcher::InlineMarker(marker.to_string()), Arc::new(module)));
        self
    }

    /// Descriptions of every script started so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear_executed(&self) {
        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl ScriptExecutor for ScriptRegistry {
    fn execute(&self, script: &ScriptElement, scope: &GlobalScope) -> Result<()> {
        if !is_executable_type(script) {
            tracing::debug!("Skipping non-script block {}", script.describe());
            return Ok(());
        }

        self.executed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(script.describe());

        match self.modules.iter().find(|(matcher, _)| matcher.matches(script)) {
            Some((_, module)) => module(script, scope),
            None => {
                tracing::debug!("No page module for script {}", script.describe());
                Ok(())
            }
        }
    }
}
