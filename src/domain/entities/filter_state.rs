use crate::domain::services::validation::FilterValidator;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const DEFAULT_MIN_PRICE: u64 = 0;
pub const DEFAULT_MAX_PRICE: u64 = 1000;

/// Inclusive price bounds. Always ordered: `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PriceRange {
    min: u64,
    max: u64,
}

impl PriceRange {
    /// Builds a range from two bounds in either order.
    pub fn new(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn min(&self) -> u64 {
        self.min
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_PRICE,
            max: DEFAULT_MAX_PRICE,
        }
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}–{}", self.min, self.max)
    }
}

/// Organic constraint. `Unset` means both organic and non-organic products match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrganicFilter {
    #[default]
    Unset,
    OrganicOnly,
    NonOrganicOnly,
}

impl OrganicFilter {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OrganicFilter::Unset => None,
            OrganicFilter::OrganicOnly => Some(true),
            OrganicFilter::NonOrganicOnly => Some(false),
        }
    }

    pub fn from_bool(value: Option<bool>) -> Self {
        match value {
            None => OrganicFilter::Unset,
            Some(true) => OrganicFilter::OrganicOnly,
            Some(false) => OrganicFilter::NonOrganicOnly,
        }
    }
}

impl fmt::Display for OrganicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrganicFilter::Unset => write!(f, "Any"),
            OrganicFilter::OrganicOnly => write!(f, "Organic"),
            OrganicFilter::NonOrganicOnly => write!(f, "Non-organic"),
        }
    }
}

/// Faceted attribute selections, e.g. `color -> {red, blue}`.
///
/// Names and values are stored trimmed and validated. An attribute never maps
/// to an empty set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AttributeFilters {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl AttributeFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: &str) -> bool {
        let (Ok(name), Ok(value)) = (
            FilterValidator::validate_attribute_name(name),
            FilterValidator::validate_attribute_value(value),
        ) else {
            return false;
        };
        self.entries
            .entry(name.to_string())
            .or_default()
            .insert(value.to_string())
    }

    pub fn remove(&mut self, name: &str, value: &str) -> bool {
        let name = name.trim();
        let Some(values) = self.entries.get_mut(name) else {
            return false;
        };
        let removed = values.remove(value.trim());
        if values.is_empty() {
            self.entries.remove(name);
        }
        removed
    }

    pub fn toggle(&mut self, name: &str, value: &str) {
        if self.contains(name, value) {
            self.remove(name, value);
        } else {
            self.insert(name, value);
        }
    }

    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.entries
            .get(name.trim())
            .is_some_and(|values| values.contains(value.trim()))
    }

    pub fn values(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(name.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.entries.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.entries
    }
}

/// The catalog filter selection behind the product-listing screen.
///
/// Fields are private so that every value reachable through the setters is
/// also representable in a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    price_range: PriceRange,
    categories: BTreeSet<String>,
    brands: BTreeSet<String>,
    attributes: AttributeFilters,
    discounts: BTreeSet<String>,
    rating: Option<u32>,
    in_stock: bool,
    is_bestseller: bool,
    is_featured: bool,
    search_term: Option<String>,
    organic: OrganicFilter,
}

impl FilterState {
    pub fn new() -> Self {
        Self {
            price_range: PriceRange::default(),
            categories: BTreeSet::new(),
            brands: BTreeSet::new(),
            attributes: AttributeFilters::new(),
            discounts: BTreeSet::new(),
            rating: None,
            in_stock: true,
            is_bestseller: false,
            is_featured: false,
            search_term: None,
            organic: OrganicFilter::Unset,
        }
    }

    pub fn price_range(&self) -> PriceRange {
        self.price_range
    }

    pub fn set_price_range(&mut self, range: PriceRange) {
        self.price_range = range;
    }

    pub fn with_price_range(mut self, min: u64, max: u64) -> Self {
        self.price_range = PriceRange::new(min, max);
        self
    }

    pub fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn toggle_category(&mut self, category: &str) {
        toggle_identifier(&mut self.categories, category);
    }

    pub fn with_category(mut self, category: &str) -> Self {
        insert_identifier(&mut self.categories, category);
        self
    }

    pub fn brands(&self) -> &BTreeSet<String> {
        &self.brands
    }

    pub fn toggle_brand(&mut self, brand: &str) {
        toggle_identifier(&mut self.brands, brand);
    }

    pub fn with_brand(mut self, brand: &str) -> Self {
        insert_identifier(&mut self.brands, brand);
        self
    }

    pub fn attributes(&self) -> &AttributeFilters {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeFilters {
        &mut self.attributes
    }

    pub fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name, value);
        self
    }

    pub fn discounts(&self) -> &BTreeSet<String> {
        &self.discounts
    }

    pub fn toggle_discount(&mut self, bucket: &str) {
        toggle_identifier(&mut self.discounts, bucket);
    }

    pub fn with_discount(mut self, bucket: &str) -> Self {
        insert_identifier(&mut self.discounts, bucket);
        self
    }

    pub fn rating(&self) -> Option<u32> {
        self.rating
    }

    pub fn set_rating(&mut self, rating: Option<u32>) {
        self.rating = rating;
    }

    pub fn with_rating(mut self, rating: u32) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn in_stock(&self) -> bool {
        self.in_stock
    }

    pub fn set_in_stock(&mut self, value: bool) {
        self.in_stock = value;
    }

    pub fn is_bestseller(&self) -> bool {
        self.is_bestseller
    }

    pub fn set_bestseller(&mut self, value: bool) {
        self.is_bestseller = value;
    }

    pub fn is_featured(&self) -> bool {
        self.is_featured
    }

    pub fn set_featured(&mut self, value: bool) {
        self.is_featured = value;
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    /// Stores the term trimmed; a blank term clears the search.
    ///
    /// `undefined` and `null` also clear it, since a link carrying them reads
    /// back as no search. Returns `false` when such a term was dropped.
    pub fn set_search_term(&mut self, term: &str) -> bool {
        self.search_term = FilterValidator::meaningful(term).map(str::to_string);
        self.search_term.is_some() || term.trim().is_empty()
    }

    pub fn with_search_term(mut self, term: &str) -> Self {
        self.set_search_term(term);
        self
    }

    pub fn organic(&self) -> OrganicFilter {
        self.organic
    }

    pub fn set_organic(&mut self, organic: OrganicFilter) {
        self.organic = organic;
    }

    pub fn with_organic(mut self, organic: OrganicFilter) -> Self {
        self.organic = organic;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Number of fields that differ from their defaults.
    pub fn active_filter_count(&self) -> usize {
        [
            !self.price_range.is_default(),
            !self.categories.is_empty(),
            !self.brands.is_empty(),
            !self.attributes.is_empty(),
            !self.discounts.is_empty(),
            self.rating.is_some(),
            !self.in_stock,
            self.is_bestseller,
            self.is_featured,
            self.search_term.is_some(),
            self.organic != OrganicFilter::Unset,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifiers travel comma-joined, so a comma can never be part of one.
fn insert_identifier(set: &mut BTreeSet<String>, identifier: &str) -> bool {
    match FilterValidator::meaningful(identifier) {
        Some(identifier) if !identifier.contains(',') => set.insert(identifier.to_string()),
        _ => false,
    }
}

fn toggle_identifier(set: &mut BTreeSet<String>, identifier: &str) {
    let identifier = identifier.trim();
    if !set.remove(identifier) {
        insert_identifier(set, identifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_range_orders_bounds() {
        let range = PriceRange::new(40, 10);
        assert_eq!(range.min(), 10);
        assert_eq!(range.max(), 40);
        assert!(PriceRange::new(0, 1000).is_default());
    }

    #[test]
    fn toggles_add_and_remove_identifiers() {
        let mut state = FilterState::new();
        state.toggle_category("vegetables");
        state.toggle_category(" fruits ");
        assert_eq!(state.categories().len(), 2);
        assert!(state.categories().contains("fruits"));

        state.toggle_category("vegetables");
        assert_eq!(state.categories().len(), 1);

        state.toggle_brand("   ");
        state.toggle_brand("undefined");
        state.toggle_brand("Farm, Inc.");
        assert!(state.brands().is_empty());
    }

    #[test]
    fn attribute_sets_never_stay_empty() {
        let mut attributes = AttributeFilters::new();
        attributes.toggle("color", "red");
        attributes.toggle("color", "blue");
        assert_eq!(attributes.values("color").map(|v| v.len()), Some(2));

        attributes.remove("color", "red");
        attributes.remove("color", "blue");
        assert!(attributes.is_empty());
        assert!(!attributes.insert("", "red"));
    }

    #[test]
    fn search_term_is_trimmed_and_blank_clears() {
        let mut state = FilterState::new().with_search_term("  carrots ");
        assert_eq!(state.search_term(), Some("carrots"));

        assert!(state.set_search_term("   "));
        assert_eq!(state.search_term(), None);
    }

    #[test]
    fn sentinel_search_terms_are_reported_as_dropped() {
        let mut state = FilterState::new().with_search_term("carrots");

        assert!(!state.set_search_term(" null "));
        assert_eq!(state.search_term(), None);
        assert!(!state.set_search_term("undefined"));
        assert!(state.set_search_term("nullable"));
        assert_eq!(state.search_term(), Some("nullable"));
    }

    #[test]
    fn active_filter_count_tracks_non_default_fields() {
        assert_eq!(FilterState::default().active_filter_count(), 0);

        let mut state = FilterState::new()
            .with_category("dairy")
            .with_price_range(10, 40)
            .with_organic(OrganicFilter::NonOrganicOnly);
        state.set_in_stock(false);
        assert_eq!(state.active_filter_count(), 4);
        assert!(!state.is_default());
    }
}
