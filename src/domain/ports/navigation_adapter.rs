use crate::domain::services::{QueryString, Subscription};
use std::fmt;
use thiserror::Error;

/// Sequence number attached to a self-initiated address write. Hosts that can
/// store per-entry state keep it beside the entry, outside the public URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WriteTag(u64);

impl WriteTag {
    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WriteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationCause {
    /// Fresh load of an address.
    Load,
    /// Back or forward through history.
    Traverse,
    /// Navigation started elsewhere in the application.
    Link,
    /// The host reporting a replace write back as a change.
    Replace,
}

/// An observed change of the current address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    /// Raw query of the now-current entry, without the leading `?`.
    pub query: String,
    /// Tag stored with the now-current entry, if the host keeps one.
    pub tag: Option<WriteTag>,
    pub cause: NavigationCause,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("query of {len} bytes exceeds the host limit of {limit} bytes")]
    QueryTooLong { len: usize, limit: usize },

    #[error("invalid location: {0}")]
    InvalidLocation(String),

    #[error("navigation host is no longer available")]
    Detached,

    #[error("navigation host rejected the write: {0}")]
    Rejected(String),
}

/// The only surface of the address bar/history the filter engine touches.
pub trait NavigationAdapter {
    fn current_query(&self) -> String;

    /// Rewrites the current entry's query in place: no new history entry, no
    /// reload.
    fn replace_query(&self, query: &QueryString, tag: WriteTag) -> Result<(), NavigationError>;

    /// Reports every change of the current entry. Echoes of `replace_query`
    /// are reported too when the host produces them; telling them apart is
    /// the caller's job.
    fn on_external_change(&self, listener: Box<dyn Fn(&NavigationEvent)>) -> Subscription;
}
