pub mod navigation_adapter;

pub use navigation_adapter::{
    NavigationAdapter, NavigationCause, NavigationError, NavigationEvent, WriteTag,
};
