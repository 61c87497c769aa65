use super::BrowserHistory;
use crate::domain::ports::{NavigationAdapter, NavigationError, NavigationEvent, WriteTag};
use crate::domain::services::{QueryString, Subscription};
use std::rc::{Rc, Weak};

/// [`NavigationAdapter`] over a [`BrowserHistory`] owned by the shell, scoped
/// to the entries of one page.
///
/// Entries on other paths are invisible: their query reads as empty, their
/// navigations are not reported and writes to them are rejected. Holds the
/// history weakly; once the shell drops it, writes fail with
/// [`NavigationError::Detached`].
pub struct HistoryNavigationAdapter {
    history: Weak<BrowserHistory>,
    path: Rc<str>,
}

impl HistoryNavigationAdapter {
    pub fn new(history: &Rc<BrowserHistory>, path: &str) -> Self {
        Self {
            history: Rc::downgrade(history),
            path: Rc::from(path),
        }
    }
}

impl NavigationAdapter for HistoryNavigationAdapter {
    fn current_query(&self) -> String {
        self.history
            .upgrade()
            .map(|history| history.current())
            .filter(|entry| *entry.path == *self.path)
            .map(|entry| entry.query)
            .unwrap_or_default()
    }

    fn replace_query(&self, query: &QueryString, tag: WriteTag) -> Result<(), NavigationError> {
        let history = self.history.upgrade().ok_or(NavigationError::Detached)?;
        let current = history.current().path;
        if *current != *self.path {
            return Err(NavigationError::Rejected(format!(
                "{} is not {}",
                current, self.path
            )));
        }
        history.replace_query(&query.to_string(), Some(tag))
    }

    fn on_external_change(&self, listener: Box<dyn Fn(&NavigationEvent)>) -> Subscription {
        let Some(history) = self.history.upgrade() else {
            tracing::warn!("Subscribed to a navigation host that is gone");
            return Subscription::new(|| {});
        };

        let weak = Weak::clone(&self.history);
        let path = Rc::clone(&self.path);
        history.subscribe(move |event| {
            let on_page = weak
                .upgrade()
                .is_some_and(|history| *history.current().path == *path);
            if on_page {
                listener(event);
            } else {
                tracing::trace!("Skipping navigation outside {}", path);
            }
        })
    }
}
