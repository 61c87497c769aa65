use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub theme: ThemeMode,
    pub listing_path: String,
    /// Origin that shared links point at.
    pub share_origin: String,
    pub sync: SyncSettings,
    pub facets: FacetCatalog,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            listing_path: "/products".to_string(),
            share_origin: "https://storefront.example/".to_string(),
            sync: SyncSettings::default(),
            facets: FacetCatalog::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ThemeMode {
    System,
    Light,
    Dark,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SyncSettings {
    /// How long an untagged echo of our own write is recognised after the write.
    pub guard_window_ms: u64,
    /// Longest query the in-memory history host accepts before rejecting a write.
    pub max_query_len: usize,
    /// Whether the in-memory host reports replace writes back as change events.
    pub echo_writes: bool,
    /// Whether the in-memory host keeps write tags with its entries. Without
    /// them, echoes are only recognised inside the guard window.
    pub entry_state: bool,
}

impl SyncSettings {
    pub fn guard_window(&self) -> Duration {
        Duration::from_millis(self.guard_window_ms)
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            guard_window_ms: 100,
            max_query_len: 2048,
            echo_writes: true,
            entry_state: true,
        }
    }
}

/// Selectable values offered by the filter sidebar.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct FacetCatalog {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub discounts: Vec<String>,
    pub attributes: BTreeMap<String, Vec<String>>,
    pub max_rating: u32,
}

impl Default for FacetCatalog {
    fn default() -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("color".to_string(), owned(&["green", "red", "yellow"]));
        attributes.insert("size".to_string(), owned(&["small", "medium", "large"]));

        Self {
            categories: owned(&["vegetables", "fruits", "dairy", "bakery", "pantry"]),
            brands: owned(&["FarmCo", "GreenLeaf", "Sunrise Dairy", "Hearth"]),
            discounts: owned(&["0-10", "10-50", "50-100"]),
            attributes,
            max_rating: 5,
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"theme":"Dark","sync":{"guard_window_ms":250}}"#)
                .expect("config parses");

        assert_eq!(config.theme, ThemeMode::Dark);
        assert_eq!(config.sync.guard_window(), Duration::from_millis(250));
        assert_eq!(config.sync.max_query_len, 2048);
        assert_eq!(config.listing_path, "/products");
        assert!(config.facets.categories.contains(&"vegetables".to_string()));
    }
}
