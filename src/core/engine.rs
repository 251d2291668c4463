use crate::core::events::GlobalScope;
use crate::core::scripts::rerun_scripts;
use crate::core::styles::reconcile_stylesheets;
use crate::domain::model::{
    FragmentResponse, NavigationOutcome, NavigationRequest, NavigationTrigger, PageLoaded,
    PageSnapshot, Route,
};
use crate::domain::ports::{BrowserHistory, ContentFetcher, Document, NodeId, ScriptExecutor};
use crate::utils::error::{Result, RouterError};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Headers telling the server to render only the page fragment.
pub const FRAGMENT_HEADERS: [(&str, &str); 2] = [
    ("X-SPA", "true"),
    ("X-Requested-With", "XMLHttpRequest"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// Name of the global hook refreshing login/logout UI.
    pub auth_hook: String,
    /// Heading of the panel shown when a navigation fails.
    pub error_heading: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            auth_hook: "handleAuth".to_string(),
            error_heading: "Помилка завантаження".to_string(),
        }
    }
}

/// Everything the engine needs, handed over once at activation.
pub struct EngineParts<D, H> {
    pub fetcher: Arc<dyn ContentFetcher>,
    pub executor: Arc<dyn ScriptExecutor>,
    pub document: D,
    pub history: H,
    pub scope: Arc<GlobalScope>,
    pub options: EngineOptions,
}

struct Inner<D, H> {
    fetcher: Arc<dyn ContentFetcher>,
    executor: Arc<dyn ScriptExecutor>,
    document: Mutex<D>,
    history: Mutex<H>,
    scope: Arc<GlobalScope>,
    options: EngineOptions,
    latest: AtomicU64,
}

/// Handle to the single engine of an application. Clones share one document
/// and history; of concurrent navigations only the newest one is applied.
pub struct NavigationEngine<D, H> {
    inner: Arc<Inner<D, H>>,
}

impl<D, H> Clone for NavigationEngine<D, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D, H> NavigationEngine<D, H>
where
    D: Document + 'static,
    H: BrowserHistory + 'static,
{
    /// Starts the engine, or returns `None` when the document has no mount
    /// point: such a page is not SPA-enabled and keeps normal browser
    /// navigation.
    pub fn activate(parts: EngineParts<D, H>) -> Option<Self> {
        if !parts.document.has_mount_point() {
            tracing::info!("No mount point in this document; navigation engine stays inactive");
            return None;
        }

        tracing::info!("Navigation engine initialized");
        Some(Self {
            inner: Arc::new(Inner {
                fetcher: parts.fetcher,
                executor: parts.executor,
                document: Mutex::new(parts.document),
                history: Mutex::new(parts.history),
                scope: parts.scope,
                options: parts.options,
                latest: AtomicU64::new(0),
            }),
        })
    }

    pub fn scope(&self) -> &Arc<GlobalScope> {
        &self.inner.scope
    }

    /// Exclusive access to the document. Holding it blocks navigations from
    /// applying their results.
    pub async fn document(&self) -> MutexGuard<'_, D> {
        self.inner.document.lock().await
    }

    pub async fn current_route(&self) -> Option<Route> {
        self.inner.history.lock().await.current()
    }

    pub async fn history(&self) -> Vec<Route> {
        self.inner.history.lock().await.entries()
    }

    /// Pushes one history entry for `href` and loads it. Empty hrefs and the
    /// `#` placeholder are ignored without touching history.
    pub async fn navigate_to(&self, href: &str) -> NavigationOutcome {
        self.navigate(href, NavigationTrigger::Programmatic).await
    }

    /// Click interception. Returns `None` when the click is not on (or inside)
    /// a navigable link and the browser default should proceed.
    pub async fn handle_click(&self, target: NodeId) -> Option<NavigationOutcome> {
        let href = self.inner.document.lock().await.navigable_target(target)?;
        let href = href.unwrap_or_default();
        Some(self.navigate(&href, NavigationTrigger::LinkClick).await)
    }

    /// Reacts to the browser moving through history: loads whatever is now
    /// current without pushing a new entry.
    pub async fn on_pop_state(&self) -> Option<NavigationOutcome> {
        let route = self.inner.history.lock().await.current()?;
        Some(
            self.handle_navigation(route, NavigationTrigger::HistoryPop)
                .await,
        )
    }

    pub async fn go_back(&self) -> Option<NavigationOutcome> {
        let moved = self.inner.history.lock().await.back();
        if !moved {
            return None;
        }
        self.on_pop_state().await
    }

    pub async fn go_forward(&self) -> Option<NavigationOutcome> {
        let moved = self.inner.history.lock().await.forward();
        if !moved {
            return None;
        }
        self.on_pop_state().await
    }

    async fn navigate(&self, href: &str, trigger: NavigationTrigger) -> NavigationOutcome {
        let route = match Route::parse(href) {
            Ok(route) => route,
            Err(e) => {
                tracing::debug!("Ignoring navigation: {}", e);
                return NavigationOutcome::Rejected {
                    href: href.to_string(),
                };
            }
        };

        self.inner.history.lock().await.push(&route);
        self.handle_navigation(route, trigger).await
    }

    /// Fetches `route` and applies it. The route must already be current in
    /// history. Never short-circuits: every call fetches fresh content.
    pub async fn handle_navigation(
        &self,
        route: Route,
        trigger: NavigationTrigger,
    ) -> NavigationOutcome {
        let sequence = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let request = NavigationRequest {
            route,
            trigger,
            sequence,
        };
        tracing::debug!(
            "Navigation #{} to {} ({:?})",
            request.sequence,
            request.route,
            request.trigger
        );

        // 標記載入中
        self.inner.document.lock().await.set_loading(true);

        let fetched = self.fetch(&request.route).await;

        // 已有更新的導航開始，丟棄此結果
        let mut document = self.inner.document.lock().await;
        if self.inner.latest.load(Ordering::SeqCst) != request.sequence {
            tracing::warn!(
                "Dropping result of navigation #{} to {}: a newer navigation started",
                request.sequence,
                request.route
            );
            return NavigationOutcome::Superseded {
                route: request.route,
                sequence: request.sequence,
            };
        }

        // 套用片段或顯示錯誤面板
        let outcome = match fetched {
            Ok(fragment) => {
                self.apply(&mut *document, &request, fragment);
                tracing::info!("Navigated to {}", request.route);
                NavigationOutcome::Applied {
                    route: request.route,
                    sequence: request.sequence,
                }
            }
            Err(e) => {
                tracing::error!("Routing error for {}: {}", request.route, e);
                let reason = e.to_string();
                document.replace_content(&error_panel(&self.inner.options.error_heading, &reason));
                document.scroll_to(0, 0);
                NavigationOutcome::Failed {
                    route: request.route,
                    sequence: request.sequence,
                    reason,
                }
            }
        };

        document.set_loading(false);
        outcome
    }

    async fn fetch(&self, route: &Route) -> Result<FragmentResponse> {
        let raw = self.inner.fetcher.fetch(route, &FRAGMENT_HEADERS).await?;
        if !raw.is_success() {
            return Err(RouterError::StatusError {
                status: raw.status,
                route: route.to_string(),
            });
        }
        Ok(FragmentResponse::from_raw(raw))
    }

    fn apply(&self, document: &mut D, request: &NavigationRequest, fragment: FragmentResponse) {
        if let Some(title) = &fragment.title {
            document.set_title(title);
        }

        // 樣式表須在替換內容前就位
        reconcile_stylesheets(document, &fragment.css_manifest);

        // Server output is trusted and inserted unsanitized.
        document.replace_content(&fragment.body_html);

        // 重新執行腳本，再廣播 page-loaded
        let started = rerun_scripts(document, self.inner.executor.as_ref(), &self.inner.scope);
        tracing::debug!("Re-ran {} script(s) for {}", started, request.route);

        self.inner.scope.dispatch_page_loaded(&PageLoaded {
            route: request.route.clone(),
            sequence: request.sequence,
            loaded_at: Utc::now(),
        });

        document.scroll_to(0, 0);

        let hook = &self.inner.options.auth_hook;
        if !self.inner.scope.invoke_hook(hook) {
            tracing::debug!("No {} hook registered", hook);
        }
    }

    pub async fn snapshot(&self) -> PageSnapshot {
        let (route, history) = {
            let history = self.inner.history.lock().await;
            (history.current(), history.entries())
        };
        let document = self.inner.document.lock().await;
        PageSnapshot {
            route,
            title: document.title(),
            dynamic_stylesheets: document.dynamic_stylesheets(),
            loading: document.is_loading(),
            content_html: document.content_html(),
            history,
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn error_panel(heading: &str, reason: &str) -> String {
    format!(
        r#"<div class="spa-error" style="padding: 50px; text-align: center;"><h2>{}</h2><p>{}</p></div>"#,
        escape_html(heading),
        escape_html(reason)
    )
}
