pub mod event_bus;
pub mod filter_codec;
pub mod query_string;
pub mod validation;

pub use event_bus::{EventBus, Subscription};
pub use filter_codec::FilterCodec;
pub use query_string::QueryString;
pub use validation::FilterValidator;
