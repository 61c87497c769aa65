use crate::domain::entities::{
    AttributeFilters, DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE, FilterState, OrganicFilter, PriceRange,
};
use crate::domain::services::query_string::QueryString;
use crate::domain::services::validation::FilterValidator;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::BTreeSet;

/// Query-string keys shared with every link the storefront has ever handed out.
pub mod keys {
    pub const MIN_PRICE: &str = "minPrice";
    pub const MAX_PRICE: &str = "maxPrice";
    pub const CATEGORIES: &str = "categories";
    pub const BRANDS: &str = "brands";
    pub const DISCOUNTS: &str = "discounts";
    pub const ATTRIBUTES: &str = "attributes";
    pub const RATING: &str = "rating";
    pub const IN_STOCK: &str = "inStock";
    pub const IS_BESTSELLER: &str = "isBestseller";
    pub const IS_FEATURED: &str = "isFeatured";
    pub const SEARCH_TERM: &str = "searchTerm";
    pub const ORGANIC: &str = "organic";
}

/// Converts between [`FilterState`] and its query-string form.
///
/// Encoding omits every field sitting at its default, so the default state
/// encodes to an empty query. Decoding is total: anything missing or
/// malformed falls back to the field default.
pub struct FilterCodec;

impl FilterCodec {
    pub fn encode(state: &FilterState) -> QueryString {
        let mut query = QueryString::new();

        let range = state.price_range();
        if range.min() > DEFAULT_MIN_PRICE || range.max() < DEFAULT_MAX_PRICE {
            query.push(keys::MIN_PRICE, range.min().to_string());
            query.push(keys::MAX_PRICE, range.max().to_string());
        }

        push_list(&mut query, keys::CATEGORIES, state.categories());
        push_list(&mut query, keys::BRANDS, state.brands());
        push_list(&mut query, keys::DISCOUNTS, state.discounts());

        if !state.attributes().is_empty() {
            match serde_json::to_string(state.attributes().as_map()) {
                Ok(json) => query.push(keys::ATTRIBUTES, json),
                Err(e) => tracing::warn!("Dropping attributes from query: {}", e),
            }
        }

        if let Some(rating) = state.rating() {
            query.push(keys::RATING, rating.to_string());
        }
        if !state.in_stock() {
            query.push(keys::IN_STOCK, "false");
        }
        if state.is_bestseller() {
            query.push(keys::IS_BESTSELLER, "true");
        }
        if state.is_featured() {
            query.push(keys::IS_FEATURED, "true");
        }
        if let Some(term) = state.search_term() {
            let term = term.trim();
            if !term.is_empty() {
                query.push(keys::SEARCH_TERM, term);
            }
        }
        if let Some(organic) = state.organic().as_bool() {
            query.push(keys::ORGANIC, organic.to_string());
        }

        tracing::trace!("Encoded filters into {} query pairs", query.len());
        query
    }

    pub fn decode(query: &QueryString) -> FilterState {
        let mut state = FilterState::new();

        state.set_price_range(decode_price_range(
            query.get(keys::MIN_PRICE),
            query.get(keys::MAX_PRICE),
        ));

        for category in split_list(query.get(keys::CATEGORIES)) {
            state.toggle_category(category);
        }
        for brand in split_list(query.get(keys::BRANDS)) {
            state.toggle_brand(brand);
        }
        for bucket in split_list(query.get(keys::DISCOUNTS)) {
            state.toggle_discount(bucket);
        }

        if let Some(raw) = query.get(keys::ATTRIBUTES) {
            *state.attributes_mut() = decode_attributes(raw);
        }

        state.set_rating(
            parse_integer(query.get(keys::RATING)).and_then(|rating| u32::try_from(rating).ok()),
        );
        state.set_in_stock(parse_bool(query.get(keys::IN_STOCK)).unwrap_or(true));
        state.set_bestseller(parse_bool(query.get(keys::IS_BESTSELLER)).unwrap_or(false));
        state.set_featured(parse_bool(query.get(keys::IS_FEATURED)).unwrap_or(false));
        state.set_search_term(query.get(keys::SEARCH_TERM).unwrap_or_default());
        state.set_organic(OrganicFilter::from_bool(parse_bool(query.get(keys::ORGANIC))));

        tracing::trace!(
            "Decoded query into {} active filters",
            state.active_filter_count()
        );
        state
    }
}

fn push_list(query: &mut QueryString, key: &str, values: &BTreeSet<String>) {
    let joined = values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    if !joined.is_empty() {
        query.push(key, joined);
    }
}

/// Members are deduplicated by the receiving set; toggling twice would
/// remove, so duplicates are skipped here.
fn split_list(raw: Option<&str>) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    raw.and_then(FilterValidator::meaningful)
        .map(|raw| {
            raw.split(',')
                .filter_map(FilterValidator::meaningful)
                .filter(|item| seen.insert(*item))
                .collect()
        })
        .unwrap_or_default()
}

fn parse_integer(raw: Option<&str>) -> Option<i128> {
    let raw = FilterValidator::meaningful(raw?)?;
    match raw.parse::<i128>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!("Ignoring non-numeric query value {:?}", raw);
            None
        }
    }
}

fn parse_bool(raw: Option<&str>) -> Option<bool> {
    match FilterValidator::meaningful(raw?)?.to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// Negative bounds clamp to zero; a reversed pair is swapped. Bounds past
/// `u64::MAX` saturate.
fn decode_price_range(min: Option<&str>, max: Option<&str>) -> PriceRange {
    let clamp = |value: i128| u64::try_from(value.max(0)).unwrap_or(u64::MAX);
    let min = parse_integer(min).map(clamp).unwrap_or(DEFAULT_MIN_PRICE);
    let max = parse_integer(max).map(clamp).unwrap_or(DEFAULT_MAX_PRICE);
    PriceRange::new(min, max)
}

fn decode_attributes(raw: &str) -> AttributeFilters {
    let mut attributes = AttributeFilters::new();
    let Some(raw) = FilterValidator::meaningful(raw) else {
        return attributes;
    };

    // Older links escaped the JSON once more before handing it to the query serializer.
    let json = if raw.starts_with('%') {
        match percent_decode_str(raw).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw.to_string(),
        }
    } else {
        raw.to_string()
    };

    let parsed = match serde_json::from_str::<Value>(&json) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            tracing::debug!("Ignoring attributes that are not an object: {}", other);
            return attributes;
        }
        Err(e) => {
            tracing::debug!("Ignoring unparseable attributes: {}", e);
            return attributes;
        }
    };

    for (name, values) in parsed {
        if let Err(reason) = FilterValidator::validate_attribute_name(&name) {
            tracing::debug!("{}", reason);
            continue;
        }
        match values {
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(value) => {
                            attributes.insert(&name, &value);
                        }
                        other => tracing::debug!("Ignoring attribute value {} for {}", other, name),
                    }
                }
            }
            Value::String(value) => {
                attributes.insert(&name, &value);
            }
            other => tracing::debug!("Ignoring attribute {} with value {}", name, other),
        }
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decode(raw: &str) -> FilterState {
        FilterCodec::decode(&QueryString::parse(raw))
    }

    fn sorted_keys(query: &QueryString) -> Vec<&str> {
        let mut keys: Vec<&str> = query.keys().collect();
        keys.sort();
        keys
    }

    #[test]
    fn defaults_encode_to_empty_query() {
        let query = FilterCodec::encode(&FilterState::default());
        assert!(query.is_empty());
        assert_eq!(query.to_string(), "");
    }

    #[test]
    fn sentinels_and_garbage_decode_to_defaults() {
        assert_eq!(
            decode("categories=undefined&rating=null&minPrice=abc"),
            FilterState::default()
        );
        assert_eq!(
            decode("brands=%20%20&inStock=maybe&organic=perhaps&searchTerm=%20"),
            FilterState::default()
        );
    }

    #[test]
    fn organic_alone_encodes_single_key() {
        let state = FilterState::new().with_organic(OrganicFilter::OrganicOnly);
        assert_eq!(FilterCodec::encode(&state).to_string(), "organic=true");

        let state = FilterState::new().with_organic(OrganicFilter::NonOrganicOnly);
        assert_eq!(FilterCodec::encode(&state).to_string(), "organic=false");
    }

    #[test]
    fn organic_unset_differs_from_false() {
        assert_eq!(decode("").organic(), OrganicFilter::Unset);
        assert_eq!(decode("organic=false").organic(), OrganicFilter::NonOrganicOnly);
        assert_eq!(decode("organic=true").organic(), OrganicFilter::OrganicOnly);
    }

    #[test]
    fn negative_min_clamps_and_large_max_is_kept() {
        let range = decode("minPrice=-5&maxPrice=99999").price_range();
        assert_eq!(range.min(), 0);
        assert_eq!(range.max(), 99999);
    }

    #[test]
    fn price_bounds_are_written_together() {
        let query = FilterCodec::encode(&FilterState::new().with_price_range(0, 40));
        assert_eq!(query.get(keys::MIN_PRICE), Some("0"));
        assert_eq!(query.get(keys::MAX_PRICE), Some("40"));

        let query = FilterCodec::encode(&FilterState::new().with_price_range(5, 1000));
        assert_eq!(sorted_keys(&query), vec!["maxPrice", "minPrice"]);
    }

    #[test]
    fn price_bounds_span_the_full_unsigned_range() {
        let wide = FilterState::new().with_price_range(10, u64::MAX);
        assert_eq!(FilterCodec::decode(&FilterCodec::encode(&wide)), wide);

        let top = FilterState::new().with_price_range(u64::MAX - 1, u64::MAX);
        assert_eq!(FilterCodec::decode(&FilterCodec::encode(&top)), top);

        let range = decode("minPrice=5&maxPrice=99999999999999999999999").price_range();
        assert_eq!((range.min(), range.max()), (5, u64::MAX));
    }

    #[test]
    fn single_or_reversed_price_bounds_stay_ordered() {
        let range = decode("minPrice=250").price_range();
        assert_eq!((range.min(), range.max()), (250, 1000));

        let range = decode("minPrice=50&maxPrice=10").price_range();
        assert_eq!((range.min(), range.max()), (10, 50));

        let range = decode("minPrice=5000").price_range();
        assert_eq!((range.min(), range.max()), (1000, 5000));
    }

    #[test]
    fn shopping_scenario_produces_expected_query() {
        let state = FilterState::new()
            .with_category("vegetables")
            .with_brand("FarmCo")
            .with_price_range(10, 40);

        let query = FilterCodec::encode(&state);
        assert_eq!(query.get(keys::CATEGORIES), Some("vegetables"));
        assert_eq!(query.get(keys::BRANDS), Some("FarmCo"));
        assert_eq!(query.get(keys::MIN_PRICE), Some("10"));
        assert_eq!(query.get(keys::MAX_PRICE), Some("40"));
        assert_eq!(query.len(), 4);

        let reloaded = decode("categories=vegetables&brands=FarmCo&minPrice=10&maxPrice=40");
        assert_eq!(reloaded, state);
    }

    #[test]
    fn round_trips_every_field() {
        let mut state = FilterState::new()
            .with_price_range(15, 300)
            .with_category("fruits")
            .with_category("dairy")
            .with_brand("Sunrise Dairy")
            .with_discount("10-50")
            .with_discount("50-100")
            .with_attribute("color", "red")
            .with_attribute("color", "blue")
            .with_attribute("size", "large")
            .with_rating(4)
            .with_search_term("greek yogurt & honey")
            .with_organic(OrganicFilter::NonOrganicOnly);
        state.set_in_stock(false);
        state.set_bestseller(true);
        state.set_featured(true);

        let query = FilterCodec::encode(&state);
        let reparsed = QueryString::parse(&query.to_string());
        assert_eq!(FilterCodec::decode(&reparsed), state);
    }

    #[test]
    fn round_trips_rating_zero() {
        let state = FilterState::new().with_rating(0);
        assert_eq!(FilterCodec::encode(&state).to_string(), "rating=0");
        assert_eq!(decode("rating=0"), state);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let state = decode("utm_source=newsletter&page=3&categories=bakery");
        assert_eq!(state, FilterState::new().with_category("bakery"));
    }

    #[test]
    fn lists_drop_blank_and_duplicate_members() {
        let state = decode("categories=fruits,,%20,fruits,null,dairy");
        let categories: Vec<&str> = state.categories().iter().map(String::as_str).collect();
        assert_eq!(categories, vec!["dairy", "fruits"]);
    }

    #[test]
    fn malformed_attributes_degrade_to_empty() {
        assert!(decode("attributes=%7Bnot-json").attributes().is_empty());
        assert!(decode("attributes=%5B%22red%22%5D").attributes().is_empty());
        assert!(decode("attributes=undefined").attributes().is_empty());
    }

    #[test]
    fn attributes_validate_names_and_values() {
        let raw = r#"{"color":["red"," ",7,"null"],"":["x"],"size":"large","weight":{"kg":1}}"#;
        let mut query = QueryString::new();
        query.push(keys::ATTRIBUTES, raw);

        let attributes = FilterCodec::decode(&query).attributes().clone();
        let mut expected = AttributeFilters::new();
        expected.insert("color", "red");
        expected.insert("size", "large");
        assert_eq!(attributes, expected);
    }

    #[test]
    fn double_escaped_attributes_still_decode() {
        let state = decode("attributes=%257B%2522color%2522%253A%255B%2522red%2522%255D%257D");
        assert!(state.attributes().contains("color", "red"));
    }

    #[test]
    fn empty_attribute_map_is_omitted() {
        let mut state = FilterState::new().with_attribute("color", "red");
        state.attributes_mut().remove("color", "red");
        assert!(FilterCodec::encode(&state).is_empty());
    }

    #[test]
    fn negative_rating_is_absent() {
        assert_eq!(decode("rating=-1").rating(), None);
        assert_eq!(decode("rating=%204%20").rating(), Some(4));
    }

    #[test]
    fn default_booleans_are_implicit() {
        let mut state = FilterState::new();
        state.set_in_stock(true);
        state.set_bestseller(false);
        assert!(FilterCodec::encode(&state).is_empty());

        state.set_in_stock(false);
        assert_eq!(FilterCodec::encode(&state).to_string(), "inStock=false");
    }
}
