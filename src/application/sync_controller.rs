use crate::application::filter_store::{ChangeOrigin, FilterChange, FilterStore};
use crate::domain::entities::{FilterState, SyncSettings};
use crate::domain::ports::{NavigationAdapter, NavigationEvent, WriteTag};
use crate::domain::services::{FilterCodec, QueryString, Subscription};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    /// Inside the guard window that follows a write to the address.
    WritingLocally,
    /// Decoding an observed address into the store.
    ApplyingExternal,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub writes: u64,
    pub failed_writes: u64,
    pub echoes_suppressed: u64,
    pub navigations_applied: u64,
    pub queued_local_changes: u64,
}

#[derive(Debug)]
struct LastWrite {
    query: String,
    tag: WriteTag,
    guard_until: Instant,
}

#[derive(Debug)]
struct SyncState {
    applying_depth: u32,
    last_write: Option<LastWrite>,
    next_tag: WriteTag,
    pending_local: VecDeque<FilterState>,
    stats: SyncStats,
}

/// Keeps the [`FilterStore`] and the address in step without either side
/// re-triggering the other.
///
/// Every local change is encoded and written with a fresh [`WriteTag`]. An
/// observed change is an echo of that write when its query text matches and
/// either the host hands back the same tag or, for hosts without per-entry
/// state, the guard window is still open. Echoes are dropped; everything
/// else is decoded into the store.
///
/// On untagged hosts the window is an approximation: a real navigation to
/// the exact query just written, arriving inside the window, is taken for an
/// echo and ignored. The store already holds that state, so nothing is lost.
pub struct SyncController {
    store: Rc<FilterStore>,
    navigation: Rc<dyn NavigationAdapter>,
    guard_window: Duration,
    state: RefCell<SyncState>,
    subscriptions: RefCell<Vec<Subscription>>,
}

impl SyncController {
    pub fn attach(
        store: Rc<FilterStore>,
        navigation: Rc<dyn NavigationAdapter>,
        settings: &SyncSettings,
    ) -> Rc<Self> {
        let controller = Rc::new(Self {
            store: Rc::clone(&store),
            navigation: Rc::clone(&navigation),
            guard_window: settings.guard_window(),
            state: RefCell::new(SyncState {
                applying_depth: 0,
                last_write: None,
                next_tag: WriteTag::new(1),
                pending_local: VecDeque::new(),
                stats: SyncStats::default(),
            }),
            subscriptions: RefCell::new(Vec::new()),
        });

        let weak = Rc::downgrade(&controller);
        let store_subscription = store.on_change(move |change| {
            if let Some(controller) = weak.upgrade() {
                controller.on_store_change(change);
            }
        });

        let weak = Rc::downgrade(&controller);
        let navigation_subscription =
            navigation.on_external_change(Box::new(move |event: &NavigationEvent| {
                if let Some(controller) = weak.upgrade() {
                    controller.on_navigation(event);
                }
            }));

        controller
            .subscriptions
            .borrow_mut()
            .extend([store_subscription, navigation_subscription]);

        tracing::debug!(
            "Filter sync attached with a {}ms guard window",
            controller.guard_window.as_millis()
        );
        controller
    }

    pub fn phase(&self) -> SyncPhase {
        let state = self.state.borrow();
        if state.applying_depth > 0 {
            SyncPhase::ApplyingExternal
        } else if state
            .last_write
            .as_ref()
            .is_some_and(|write| Instant::now() < write.guard_until)
        {
            SyncPhase::WritingLocally
        } else {
            SyncPhase::Idle
        }
    }

    pub fn stats(&self) -> SyncStats {
        self.state.borrow().stats
    }

    /// The query text of the most recent write, if no navigation has been
    /// applied since.
    pub fn last_written_query(&self) -> Option<String> {
        self.state
            .borrow()
            .last_write
            .as_ref()
            .map(|write| write.query.clone())
    }

    pub fn detach(&self) {
        let subscriptions: Vec<Subscription> = self.subscriptions.borrow_mut().drain(..).collect();
        drop(subscriptions);
        tracing::debug!("Filter sync detached");
    }

    fn on_store_change(&self, change: &FilterChange) {
        if change.origin == ChangeOrigin::Navigation {
            return;
        }

        {
            let mut state = self.state.borrow_mut();
            if state.applying_depth > 0 {
                state.pending_local.push_back(change.state.clone());
                state.stats.queued_local_changes += 1;
                tracing::debug!("Queued local filter change until navigation is applied");
                return;
            }
        }

        self.write_address(&change.state);
    }

    fn write_address(&self, filters: &FilterState) {
        let query = FilterCodec::encode(filters);
        let text = query.to_string();

        // Recorded before writing: some hosts report the change from inside the write.
        let tag = {
            let mut state = self.state.borrow_mut();
            let tag = state.next_tag;
            state.next_tag = tag.next();
            state.last_write = Some(LastWrite {
                query: text.clone(),
                tag,
                guard_until: Instant::now() + self.guard_window,
            });
            tag
        };

        match self.navigation.replace_query(&query, tag) {
            Ok(()) => {
                self.state.borrow_mut().stats.writes += 1;
                tracing::debug!("Wrote filters to address {} as ?{}", tag, text);
            }
            Err(e) => {
                self.state.borrow_mut().stats.failed_writes += 1;
                tracing::warn!("Could not write filters to the address: {}", e);
            }
        }
    }

    fn on_navigation(&self, event: &NavigationEvent) {
        if self.is_echo(event) {
            self.state.borrow_mut().stats.echoes_suppressed += 1;
            tracing::debug!("Ignoring echo of our own write: ?{}", event.query);
            return;
        }

        let filters = FilterCodec::decode(&QueryString::parse(&event.query));
        {
            let mut state = self.state.borrow_mut();
            state.applying_depth += 1;
            // The address now belongs to whoever navigated.
            state.last_write = None;
        }

        tracing::info!(
            "Applying {:?} navigation with {} active filters",
            event.cause,
            filters.active_filter_count()
        );
        self.store.apply_navigation(filters);

        let finished = {
            let mut state = self.state.borrow_mut();
            state.applying_depth -= 1;
            state.stats.navigations_applied += 1;
            state.applying_depth == 0
        };

        if finished {
            self.flush_pending();
        }
    }

    fn is_echo(&self, event: &NavigationEvent) -> bool {
        let state = self.state.borrow();
        let Some(write) = state.last_write.as_ref() else {
            return false;
        };
        if event.query != write.query {
            return false;
        }
        match event.tag {
            Some(tag) => tag == write.tag,
            None => Instant::now() < write.guard_until,
        }
    }

    fn flush_pending(&self) {
        loop {
            let next = self.state.borrow_mut().pending_local.pop_front();
            let Some(filters) = next else {
                break;
            };
            self.write_address(&filters);
        }
    }
}
