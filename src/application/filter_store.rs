use crate::domain::entities::FilterState;
use crate::domain::services::{EventBus, Subscription};
use std::cell::RefCell;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Edited on this screen: filter controls, "clear all", programmatic updates.
    Local,
    /// Decoded from an address the user navigated to.
    Navigation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    pub state: FilterState,
    pub origin: ChangeOrigin,
}

/// Holds the current [`FilterState`] and notifies subscribers on every write.
pub struct FilterStore {
    state: RefCell<FilterState>,
    changes: EventBus<FilterChange>,
}

impl FilterStore {
    pub fn new(initial: FilterState) -> Self {
        Self {
            state: RefCell::new(initial),
            changes: EventBus::new(),
        }
    }

    pub fn filters(&self) -> FilterState {
        self.state.borrow().clone()
    }

    pub fn set_filters(&self, next: FilterState) {
        self.commit(next, ChangeOrigin::Local);
    }

    /// Computes the next state from the current one at dispatch time, so two
    /// updates issued back to back both land.
    pub fn update_filters(&self, updater: impl FnOnce(&FilterState) -> FilterState) {
        let previous = self.filters();
        self.commit(updater(&previous), ChangeOrigin::Local);
    }

    pub fn clear_filters(&self) {
        self.set_filters(FilterState::default());
    }

    pub(crate) fn apply_navigation(&self, next: FilterState) {
        self.commit(next, ChangeOrigin::Navigation);
    }

    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&FilterChange) + 'static,
    {
        self.changes.subscribe(listener)
    }

    fn commit(&self, next: FilterState, origin: ChangeOrigin) {
        self.state.replace(next.clone());
        tracing::trace!("Filter store updated ({:?})", origin);
        self.changes.publish(&FilterChange {
            state: next,
            origin,
        });
    }
}

impl Default for FilterStore {
    fn default() -> Self {
        Self::new(FilterState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recorder(store: &FilterStore) -> (Rc<RefCell<Vec<FilterChange>>>, Subscription) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let subscription = store.on_change(move |change| sink.borrow_mut().push(change.clone()));
        (seen, subscription)
    }

    #[test]
    fn set_filters_notifies_synchronously() {
        let store = FilterStore::default();
        let (seen, _subscription) = recorder(&store);

        store.set_filters(FilterState::new().with_category("fruits"));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].origin, ChangeOrigin::Local);
        assert!(seen[0].state.categories().contains("fruits"));
        assert_eq!(store.filters(), seen[0].state);
    }

    #[test]
    fn back_to_back_updates_are_not_lost() {
        let store = FilterStore::default();

        store.update_filters(|previous| previous.clone().with_category("dairy"));
        store.update_filters(|previous| previous.clone().with_brand("FarmCo"));

        let state = store.filters();
        assert!(state.categories().contains("dairy"));
        assert!(state.brands().contains("FarmCo"));
    }

    #[test]
    fn clear_filters_restores_defaults() {
        let store = FilterStore::new(FilterState::new().with_rating(3));
        let (seen, _subscription) = recorder(&store);

        store.clear_filters();

        assert!(store.filters().is_default());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn unsubscribed_listeners_stop_receiving() {
        let store = FilterStore::default();
        let (seen, subscription) = recorder(&store);

        store.clear_filters();
        subscription.unsubscribe();
        store.clear_filters();

        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn navigation_changes_are_marked() {
        let store = FilterStore::default();
        let (seen, _subscription) = recorder(&store);

        store.apply_navigation(FilterState::new().with_category("bakery"));

        assert_eq!(seen.borrow()[0].origin, ChangeOrigin::Navigation);
    }

    #[test]
    fn listeners_may_write_back_while_notified() {
        let store = Rc::new(FilterStore::default());
        let writer = Rc::clone(&store);
        let _subscription = store.on_change(move |change| {
            if change.state.brands().is_empty() {
                writer.set_filters(change.state.clone().with_brand("Hearth"));
            }
        });

        store.set_filters(FilterState::new().with_category("bakery"));

        let state = store.filters();
        assert!(state.categories().contains("bakery"));
        assert!(state.brands().contains("Hearth"));
    }
}
