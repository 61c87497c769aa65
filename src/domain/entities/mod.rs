pub mod config;
pub mod filter_state;

pub use config::{AppConfig, FacetCatalog, SyncSettings, ThemeMode};
pub use filter_state::{
    AttributeFilters, DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE, FilterState, OrganicFilter, PriceRange,
};
