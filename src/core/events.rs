use crate::domain::model::PageLoaded;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

pub type PageLoadedListener = Arc<dyn Fn(&PageLoaded) + Send + Sync>;
pub type GlobalHook = Arc<dyn Fn() + Send + Sync>;

const CHANNEL_CAPACITY: usize = 32;

/// Scope shared by the engine and page modules: event listeners keyed by
/// event name, plus named global hooks such as `handleAuth`.
pub struct GlobalScope {
    page_loaded_event: String,
    listeners: RwLock<HashMap<String, Vec<PageLoadedListener>>>,
    hooks: RwLock<HashMap<String, GlobalHook>>,
    sender: broadcast::Sender<PageLoaded>,
}

impl GlobalScope {
    pub fn new(page_loaded_event: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            page_loaded_event: page_loaded_event.into(),
            listeners: RwLock::new(HashMap::new()),
            hooks: RwLock::new(HashMap::new()),
            sender,
        }
    }

    /// Name under which the engine raises page-loaded.
    pub fn page_loaded_event(&self) -> &str {
        &self.page_loaded_event
    }

    pub fn add_event_listener<F>(&self, event: &str, listener: F)
    where
        F: Fn(&PageLoaded) + Send + Sync + 'static,
    {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(listener));
    }

    pub fn on_page_loaded<F>(&self, listener: F)
    where
        F: Fn(&PageLoaded) + Send + Sync + 'static,
    {
        self.add_event_listener(&self.page_loaded_event, listener);
    }

    /// Async alternative to [`GlobalScope::on_page_loaded`].
    pub fn subscribe(&self) -> broadcast::Receiver<PageLoaded> {
        self.sender.subscribe()
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(event)
            .map_or(0, Vec::len)
    }

    /// Raises the page-loaded event for every listener registered under its
    /// name so far, then for async subscribers. Nobody listening is fine.
    pub fn dispatch_page_loaded(&self, event: &PageLoaded) -> usize {
        // Listeners may register further listeners; snapshot first.
        let listeners: Vec<PageLoadedListener> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&self.page_loaded_event)
            .cloned()
            .unwrap_or_default();

        tracing::debug!(
            "Dispatching {} for {} to {} listener(s)",
            self.page_loaded_event,
            event.route,
            listeners.len()
        );

        for listener in &listeners {
            listener(event);
        }

        let subscribers = self.sender.send(event.clone()).unwrap_or(0);
        listeners.len() + subscribers
    }

    pub fn register_hook<F>(&self, name: impl Into<String>, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(name.into(), Arc::new(hook));
    }

    pub fn remove_hook(&self, name: &str) -> bool {
        self.hooks
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(name)
            .is_some()
    }

    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(name)
    }

    /// Calls the hook registered under `name`. Returns false when there is none.
    pub fn invoke_hook(&self, name: &str) -> bool {
        let hook = self
            .hooks
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned();

        match hook {
            Some(hook) => {
                hook();
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for GlobalScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalScope")
            .field("page_loaded_event", &self.page_loaded_event)
            .field("listeners", &self.listener_count(&self.page_loaded_event))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Route;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(route: &str) -> PageLoaded {
        PageLoaded {
            route: Route::parse(route).unwrap(),
            sequence: 1,
            loaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_dispatch_without_listeners_is_fine() {
        let scope = GlobalScope::new("page-loaded");
        assert_eq!(scope.dispatch_page_loaded(&event("/orders")), 0);
    }

    #[test]
    fn test_listeners_receive_route() {
        let scope = GlobalScope::new("page-loaded");
        let seen = Arc::new(RwLock::new(Vec::new()));
        let sink = seen.clone();
        scope.on_page_loaded(move |e| sink.write().unwrap().push(e.route.to_string()));

        scope.dispatch_page_loaded(&event("/orders"));
        scope.dispatch_page_loaded(&event("/admin_page"));

        assert_eq!(*seen.read().unwrap(), vec!["/orders", "/admin_page"]);
    }

    #[test]
    fn test_only_listeners_of_configured_event_are_called() {
        let scope = GlobalScope::new("route-ready");
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = calls.clone();
        scope.add_event_listener("page-loaded", move |_| {
            counter.fetch_add(100, Ordering::SeqCst);
        });
        let counter = calls.clone();
        scope.add_event_listener("route-ready", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let counter = calls.clone();
        scope.on_page_loaded(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(scope.listener_count("route-ready"), 2);
        assert_eq!(scope.dispatch_page_loaded(&event("/orders")), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_registered_during_dispatch_waits_for_next_event() {
        let scope = Arc::new(GlobalScope::new("page-loaded"));
        let late_calls = Arc::new(AtomicUsize::new(0));

        let inner_scope = scope.clone();
        let counter = late_calls.clone();
        scope.on_page_loaded(move |_| {
            let counter = counter.clone();
            inner_scope.on_page_loaded(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        scope.dispatch_page_loaded(&event("/orders"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        scope.dispatch_page_loaded(&event("/orders"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_hooks() {
        let scope = GlobalScope::new("page-loaded");
        assert!(!scope.invoke_hook("handleAuth"));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        scope.register_hook("handleAuth", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(scope.has_hook("handleAuth"));
        assert!(scope.invoke_hook("handleAuth"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(scope.remove_hook("handleAuth"));
        assert!(!scope.invoke_hook("handleAuth"));
    }

    #[tokio::test]
    async fn test_async_subscribers() {
        let scope = GlobalScope::new("page-loaded");
        let mut rx = scope.subscribe();
        assert_eq!(scope.dispatch_page_loaded(&event("/info")), 1);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.route.as_str(), "/info");
    }
}
