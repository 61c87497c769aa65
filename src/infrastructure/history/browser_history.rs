use crate::domain::entities::SyncSettings;
use crate::domain::ports::{NavigationCause, NavigationError, NavigationEvent, WriteTag};
use crate::domain::services::{EventBus, Subscription};
use std::cell::{Cell, RefCell};
use std::fmt;
use url::Url;

const ORIGIN: &str = "http://storefront.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub path: String,
    /// Raw query without the leading `?`.
    pub query: String,
    pub state: Option<WriteTag>,
}

impl HistoryEntry {
    fn parse(location: &str) -> Result<Self, NavigationError> {
        let base = Url::parse(ORIGIN).map_err(|e| NavigationError::InvalidLocation(e.to_string()))?;
        let url = base
            .join(location.trim())
            .map_err(|e| NavigationError::InvalidLocation(format!("{}: {}", location, e)))?;

        Ok(Self {
            path: url.path().to_string(),
            query: url.query().unwrap_or_default().to_string(),
            state: None,
        })
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            write!(f, "{}", self.path)
        } else {
            write!(f, "{}?{}", self.path, self.query)
        }
    }
}

/// In-memory session history standing in for a browser's address bar.
///
/// `push`, `load`, `back` and `forward` report a change to subscribers.
/// `replace_query` rewrites the current entry in place and, when
/// `echo_writes` is on, reports that as a change too, the way routers built
/// on history listeners do.
pub struct BrowserHistory {
    entries: RefCell<Vec<HistoryEntry>>,
    index: Cell<usize>,
    changes: EventBus<NavigationEvent>,
    echo_writes: bool,
    entry_state: bool,
    max_query_len: usize,
}

impl BrowserHistory {
    pub fn new(settings: &SyncSettings) -> Self {
        Self {
            entries: RefCell::new(vec![HistoryEntry {
                path: "/".to_string(),
                query: String::new(),
                state: None,
            }]),
            index: Cell::new(0),
            changes: EventBus::new(),
            echo_writes: settings.echo_writes,
            entry_state: settings.entry_state,
            max_query_len: settings.max_query_len,
        }
    }

    pub fn current(&self) -> HistoryEntry {
        self.entries.borrow()[self.index.get()].clone()
    }

    pub fn location(&self) -> String {
        self.current().to_string()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn can_go_back(&self) -> bool {
        self.index.get() > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.index.get() + 1 < self.len()
    }

    /// A fresh page load: the session starts over at `location`.
    pub fn load(&self, location: &str) -> Result<(), NavigationError> {
        let entry = HistoryEntry::parse(location)?;
        tracing::debug!("Loading {}", entry);
        self.entries.replace(vec![entry]);
        self.index.set(0);
        self.notify(NavigationCause::Load);
        Ok(())
    }

    /// Navigation started by a link: discards forward entries and appends.
    pub fn push(&self, location: &str) -> Result<(), NavigationError> {
        let entry = HistoryEntry::parse(location)?;
        tracing::debug!("Navigating to {}", entry);
        {
            let mut entries = self.entries.borrow_mut();
            entries.truncate(self.index.get() + 1);
            entries.push(entry);
            self.index.set(entries.len() - 1);
        }
        self.notify(NavigationCause::Link);
        Ok(())
    }

    pub fn back(&self) -> bool {
        if !self.can_go_back() {
            return false;
        }
        self.index.set(self.index.get() - 1);
        self.notify(NavigationCause::Traverse);
        true
    }

    pub fn forward(&self) -> bool {
        if !self.can_go_forward() {
            return false;
        }
        self.index.set(self.index.get() + 1);
        self.notify(NavigationCause::Traverse);
        true
    }

    pub fn replace_query(
        &self,
        query: &str,
        state: Option<WriteTag>,
    ) -> Result<(), NavigationError> {
        if query.len() > self.max_query_len {
            return Err(NavigationError::QueryTooLong {
                len: query.len(),
                limit: self.max_query_len,
            });
        }

        {
            let mut entries = self.entries.borrow_mut();
            let entry = &mut entries[self.index.get()];
            entry.query = query.to_string();
            entry.state = if self.entry_state { state } else { None };
        }

        if self.echo_writes {
            self.notify(NavigationCause::Replace);
        }
        Ok(())
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&NavigationEvent) + 'static,
    {
        self.changes.subscribe(listener)
    }

    fn notify(&self, cause: NavigationCause) {
        let entry = self.current();
        self.changes.publish(&NavigationEvent {
            query: entry.query,
            tag: entry.state,
            cause,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn history() -> BrowserHistory {
        BrowserHistory::new(&SyncSettings::default())
    }

    fn record(history: &BrowserHistory) -> (Rc<RefCell<Vec<NavigationEvent>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = history.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        (seen, subscription)
    }

    #[test]
    fn push_and_traverse_report_changes() {
        let history = history();
        let (seen, _subscription) = record(&history);

        history.push("/products?categories=fruits").expect("valid location");
        history.push("/products?categories=dairy").expect("valid location");
        assert!(history.back());
        assert_eq!(history.location(), "/products?categories=fruits");
        assert!(history.forward());
        assert!(!history.forward());

        let causes: Vec<NavigationCause> = seen.borrow().iter().map(|e| e.cause).collect();
        assert_eq!(
            causes,
            vec![
                NavigationCause::Link,
                NavigationCause::Link,
                NavigationCause::Traverse,
                NavigationCause::Traverse,
            ]
        );
    }

    #[test]
    fn push_discards_forward_entries() {
        let history = history();
        history.push("/products?rating=4").expect("valid location");
        history.push("/products?rating=5").expect("valid location");
        history.back();
        history.push("/orders").expect("valid location");

        assert_eq!(history.len(), 3);
        assert!(!history.can_go_forward());
        assert_eq!(history.location(), "/orders");
    }

    #[test]
    fn replace_keeps_history_length_and_stores_tag() {
        let history = history();
        let (seen, _subscription) = record(&history);
        history.load("/products").expect("valid location");

        history
            .replace_query("organic=true", Some(WriteTag::new(7)))
            .expect("short query");

        assert_eq!(history.len(), 1);
        assert_eq!(history.current().state, Some(WriteTag::new(7)));
        let last = seen.borrow().last().cloned().expect("echo reported");
        assert_eq!(last.cause, NavigationCause::Replace);
        assert_eq!(last.tag, Some(WriteTag::new(7)));
    }

    #[test]
    fn host_without_entry_state_drops_tags() {
        let history = BrowserHistory::new(&SyncSettings {
            entry_state: false,
            ..SyncSettings::default()
        });
        history
            .replace_query("organic=true", Some(WriteTag::new(1)))
            .expect("short query");
        assert_eq!(history.current().state, None);
    }

    #[test]
    fn overlong_queries_are_rejected() {
        let settings = SyncSettings {
            max_query_len: 8,
            ..SyncSettings::default()
        };
        let history = BrowserHistory::new(&settings);

        let result = history.replace_query("searchTerm=broccoli", None);

        assert_eq!(
            result,
            Err(NavigationError::QueryTooLong { len: 19, limit: 8 })
        );
        assert_eq!(history.location(), "/");
    }

    #[test]
    fn full_urls_are_reduced_to_path_and_query() {
        let history = history();
        history
            .load("https://shop.example/products?brands=FarmCo#grid")
            .expect("valid location");
        assert_eq!(history.location(), "/products?brands=FarmCo");
    }
}
