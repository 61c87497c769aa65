mod browser_history;
mod navigation_adapter;

pub use browser_history::{BrowserHistory, HistoryEntry};
pub use navigation_adapter::HistoryNavigationAdapter;
