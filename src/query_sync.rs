//! Two-way mapping between `FilterState` and the listing page's URL query.
//!
//! Nothing here touches navigation history; callers decide whether a new
//! query is pushed or replaced.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::filter::{
    normalize_page, normalize_page_size, normalize_price_range, normalize_text, parse_number,
    DealType, FilterState, SortOrder, MAX_PRICE, MIN_PRICE,
};

pub type QueryMap = BTreeMap<String, String>;

pub const KEY_PAGE: &str = "page";
pub const KEY_LIMIT: &str = "limit";
pub const KEY_CATEGORY: &str = "category";
pub const KEY_BRAND: &str = "brand";
pub const KEY_MIN_PRICE: &str = "minPrice";
pub const KEY_MAX_PRICE: &str = "maxPrice";
pub const KEY_SORT: &str = "sort";
pub const KEY_SEARCH: &str = "search";
pub const KEY_DEAL_TYPE: &str = "dealType";

/// Parses known keys, normalizes them and fills gaps with defaults.
/// Unknown keys and unparsable values are ignored.
pub fn from_query(query: &QueryMap) -> FilterState {
    let defaults = FilterState::default();
    let number = |key: &str| query.get(key).and_then(|v| parse_number(v));

    let (min_price, max_price) = normalize_price_range(
        number(KEY_MIN_PRICE).unwrap_or(MIN_PRICE),
        number(KEY_MAX_PRICE).unwrap_or(MAX_PRICE),
    );

    FilterState {
        page: number(KEY_PAGE).map(normalize_page).unwrap_or(defaults.page),
        page_size: number(KEY_LIMIT)
            .map(normalize_page_size)
            .unwrap_or(defaults.page_size),
        category: normalize_text(query.get(KEY_CATEGORY).map(String::as_str)),
        brand: normalize_text(query.get(KEY_BRAND).map(String::as_str)),
        min_price,
        max_price,
        sort: query
            .get(KEY_SORT)
            .and_then(|v| SortOrder::parse(v))
            .unwrap_or(defaults.sort),
        search: normalize_text(query.get(KEY_SEARCH).map(String::as_str)),
        deal_type: query.get(KEY_DEAL_TYPE).and_then(|v| DealType::parse(v)),
    }
}

/// Emits only the fields that differ from their defaults.
pub fn to_query(state: &FilterState) -> QueryMap {
    let defaults = FilterState::default();
    let mut query = QueryMap::new();

    if state.page != defaults.page {
        query.insert(KEY_PAGE.to_string(), state.page.to_string());
    }
    if state.page_size != defaults.page_size {
        query.insert(KEY_LIMIT.to_string(), state.page_size.to_string());
    }
    if let Some(category) = &state.category {
        query.insert(KEY_CATEGORY.to_string(), category.clone());
    }
    if let Some(brand) = &state.brand {
        query.insert(KEY_BRAND.to_string(), brand.clone());
    }
    if state.min_price != defaults.min_price {
        query.insert(KEY_MIN_PRICE.to_string(), state.min_price.to_string());
    }
    if state.max_price != defaults.max_price {
        query.insert(KEY_MAX_PRICE.to_string(), state.max_price.to_string());
    }
    if state.sort != defaults.sort {
        query.insert(KEY_SORT.to_string(), state.sort.as_str().to_string());
    }
    if let Some(search) = &state.search {
        query.insert(KEY_SEARCH.to_string(), search.clone());
    }
    if let Some(deal_type) = state.deal_type {
        query.insert(KEY_DEAL_TYPE.to_string(), deal_type.as_str().to_string());
    }

    query
}

/// Decodes `a=1&b=two` (with or without a leading `?`). The last occurrence
/// of a repeated key wins.
pub fn parse_query_string(raw: &str) -> QueryMap {
    let raw = raw.strip_prefix('?').unwrap_or(raw);
    form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

pub fn encode_query_string(query: &QueryMap) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(query.iter())
        .finish()
}

/// Address-bar location for a state, e.g. `/products?category=Phones&page=2`.
pub fn location(path: &str, state: &FilterState) -> String {
    let query = encode_query_string(&to_query(state));
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> QueryMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_state_yields_empty_query() {
        assert!(to_query(&FilterState::default()).is_empty());
        assert_eq!(from_query(&QueryMap::new()), FilterState::default());
    }

    #[test]
    fn test_from_query_parses_and_normalizes() {
        let state = from_query(&query(&[
            ("page", "3"),
            ("limit", "24"),
            ("category", "Phones"),
            ("minPrice", "20000"),
            ("maxPrice", "-5"),
            ("sort", "price_asc"),
            ("dealType", "flash-sale"),
            ("utm_source", "newsletter"),
        ]));
        assert_eq!(state.page, 3);
        assert_eq!(state.page_size, 24);
        assert_eq!(state.category.as_deref(), Some("Phones"));
        assert_eq!((state.min_price, state.max_price), (0, 20000));
        assert_eq!(state.sort, SortOrder::PriceLow);
        assert_eq!(state.deal_type, Some(DealType::FlashSale));
    }

    #[test]
    fn test_from_query_ignores_garbage_values() {
        let state = from_query(&query(&[("page", "two"), ("sort", "best"), ("limit", "")]));
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn test_round_trip_through_query_string() {
        let state = FilterState {
            page: 2,
            page_size: 48,
            category: Some("Phones & Tablets".to_string()),
            brand: Some("Samsung".to_string()),
            min_price: 15000,
            max_price: 80000,
            sort: SortOrder::PriceHigh,
            search: Some("galaxy s24+".to_string()),
            deal_type: Some(DealType::LimitedOffer),
        };
        let encoded = encode_query_string(&to_query(&state));
        assert_eq!(from_query(&parse_query_string(&encoded)), state);
    }

    #[test]
    fn test_location_omits_empty_query() {
        assert_eq!(location("/products", &FilterState::default()), "/products");
        let state = FilterState {
            sort: SortOrder::Newest,
            ..FilterState::default()
        };
        assert_eq!(location("/products", &state), "/products?sort=newest");
    }

    #[test]
    fn test_parse_query_string_strips_question_mark() {
        let parsed = parse_query_string("?sort=price-low&maxPrice=15000");
        assert_eq!(parsed.get("maxPrice").map(String::as_str), Some("15000"));
        assert_eq!(from_query(&parsed).max_price, 15000);
    }
}
