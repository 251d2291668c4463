use crate::adapters::dom::HeadlessDocument;
use crate::adapters::history::SessionHistory;
use crate::adapters::http::HttpFetcher;
use crate::adapters::scripts::ScriptRegistry;
use crate::config::RouterConfig;
use crate::core::engine::{EngineParts, NavigationEngine};
use crate::core::events::GlobalScope;
use crate::domain::model::{NavigationOutcome, PageSnapshot, Route};
use crate::domain::ports::{ContentFetcher, Document};
use crate::utils::error::{Result, RouterError};
use serde::Serialize;
use std::sync::Arc;

pub type HeadlessEngine = NavigationEngine<HeadlessDocument, SessionHistory>;

/// What one navigation did to the page.
#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    pub outcome: Option<NavigationOutcome>,
    pub scripts_executed: Vec<String>,
    pub page: PageSnapshot,
}

/// Reports as pretty JSON, the CLI's `--json` output.
pub fn reports_to_json(reports: &[PageReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}

pub enum SessionStart {
    Active(BrowserSession),
    /// The shell has no mount point; links behave as plain page loads.
    Static { route: Route, title: String },
}

pub struct BrowserSession {
    engine: HeadlessEngine,
    scripts: Arc<ScriptRegistry>,
}

impl BrowserSession {
    /// Fetches `start` as a full page (no fragment headers) and activates the
    /// engine on it.
    pub async fn open(config: &RouterConfig, start: &str, scripts: ScriptRegistry) -> Result<SessionStart> {
        let start = Route::parse(start)?;
        let fetcher =
            HttpFetcher::new(&config.server.base_url)?.with_timeout(config.request_timeout());

        tracing::info!("Loading shell from {}", fetcher.url_for(&start)?);
        let shell = fetcher.fetch(&start, &[]).await?;
        if !shell.is_success() {
            return Err(RouterError::StatusError {
                status: shell.status,
                route: start.to_string(),
            });
        }

        let document = HeadlessDocument::parse(&shell.body, config.shell_options());
        let title = document.title();
        let scripts = Arc::new(scripts);

        let engine = NavigationEngine::activate(EngineParts {
            fetcher: Arc::new(fetcher),
            executor: scripts.clone(),
            document,
            history: SessionHistory::new(start.clone()),
            scope: Arc::new(GlobalScope::new(config.events.page_loaded.clone())),
            options: config.engine_options(),
        });

        Ok(match engine {
            Some(engine) => SessionStart::Active(Self { engine, scripts }),
            None => SessionStart::Static { route: start, title },
        })
    }

    pub fn engine(&self) -> &HeadlessEngine {
        &self.engine
    }

    pub async fn visit(&self, href: &str) -> PageReport {
        self.scripts.clear_executed();
        let outcome = self.engine.navigate_to(href).await;
        self.report(Some(outcome)).await
    }

    pub async fn back(&self) -> PageReport {
        self.scripts.clear_executed();
        let outcome = self.engine.go_back().await;
        self.report(outcome).await
    }

    pub async fn report(&self, outcome: Option<NavigationOutcome>) -> PageReport {
        PageReport {
            outcome,
            scripts_executed: self.scripts.executed(),
            page: self.engine.snapshot().await,
        }
    }
}
