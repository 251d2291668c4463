use crate::domain::model::Route;
use crate::domain::ports::BrowserHistory;

/// Session history kept in memory with browser semantics: pushing while not at
/// the newest entry drops the forward entries.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<Route>,
    cursor: usize,
}

impl SessionHistory {
    /// Starts with `initial` as the current location, like a freshly opened tab.
    pub fn new(initial: Route) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

impl BrowserHistory for SessionHistory {
    fn push(&mut self, route: &Route) {
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(route.clone());
        self.cursor = self.entries.len() - 1;
    }

    fn current(&self) -> Option<Route> {
        self.entries.get(self.cursor).cloned()
    }

    fn back(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    fn forward(&mut self) -> bool {
        if self.cursor + 1 >= self.entries.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    fn entries(&self) -> Vec<Route> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(path: &str) -> Route {
        Route::parse(path).unwrap()
    }

    #[test]
    fn test_push_and_traverse() {
        let mut history = SessionHistory::new(route("/"));
        history.push(&route("/orders"));
        history.push(&route("/admin_page"));
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some(route("/admin_page")));

        assert!(history.back());
        assert_eq!(history.current(), Some(route("/orders")));
        assert!(history.back());
        assert!(!history.back());
        assert_eq!(history.current(), Some(route("/")));

        assert!(history.forward());
        assert_eq!(history.current(), Some(route("/orders")));
    }

    #[test]
    fn test_push_drops_forward_entries() {
        let mut history = SessionHistory::new(route("/"));
        history.push(&route("/orders"));
        history.push(&route("/info"));
        history.back();
        history.push(&route("/contacts"));

        assert_eq!(
            history.entries(),
            vec![route("/"), route("/orders"), route("/contacts")]
        );
        assert!(!history.forward());
    }

    #[test]
    fn test_empty_history() {
        let mut history = SessionHistory::default();
        assert!(history.is_empty());
        assert_eq!(history.current(), None);
        history.push(&route("/orders"));
        assert_eq!(history.current(), Some(route("/orders")));
        assert_eq!(history.cursor(), 0);
    }
}
