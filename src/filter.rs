//! Filter state for the product listing page.
//!
//! `FilterState` is always fully defined. Every setter on [`FilterStore`]
//! normalizes its input instead of rejecting it, and every setter other than
//! `set_page`/`set_page_size` sends the shopper back to page 1.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ProductSummary;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const PAGE_SIZES: [u32; 7] = [12, 24, 48, 96, 200, 500, 1000];
pub const MIN_PRICE: i64 = 0;
pub const MAX_PRICE: i64 = 500_000;
pub const SUGGEST_MIN_CHARS: usize = 2;
pub const SUGGEST_LIMIT: usize = 12;
/// Catalog slice loaded once to back the search box.
pub const SUGGEST_POOL_SIZE: i64 = 200;

// =============================================================================
// ENUMERATIONS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    #[default]
    Random,
    Newest,
    PriceLow,
    PriceHigh,
    Popular,
}

impl SortOrder {
    pub const ALL: [SortOrder; 5] = [
        SortOrder::Random,
        SortOrder::Newest,
        SortOrder::PriceLow,
        SortOrder::PriceHigh,
        SortOrder::Popular,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Newest => "newest",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Popular => "popular",
        }
    }

    /// Lenient parse. Accepts the underscore spellings some sections send
    /// (`price_asc`, `price_desc`). Unknown values yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "newest" => Some(Self::Newest),
            "price-low" | "price_low" | "price_asc" => Some(Self::PriceLow),
            "price-high" | "price_high" | "price_desc" => Some(Self::PriceHigh),
            "popular" => Some(Self::Popular),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DealType {
    DealOfTheDay,
    FlashSale,
    LimitedOffer,
}

impl DealType {
    pub const ALL: [DealType; 3] = [
        DealType::DealOfTheDay,
        DealType::FlashSale,
        DealType::LimitedOffer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DealOfTheDay => "dealOfTheDay",
            Self::FlashSale => "flashSale",
            Self::LimitedOffer => "limitedOffer",
        }
    }

    /// Tag spelling used on product records.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::DealOfTheDay => "deal-of-the-day",
            Self::FlashSale => "flash-sale",
            Self::LimitedOffer => "limited-offer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::DealOfTheDay => "Deal of the Day",
            Self::FlashSale => "Flash Sale",
            Self::LimitedOffer => "Limited Offer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|deal| deal.as_str().eq_ignore_ascii_case(value) || deal.tag() == value)
    }
}

impl fmt::Display for DealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// FILTER STATE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub page: u32,
    pub page_size: u32,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: i64,
    pub max_price: i64,
    pub sort: SortOrder,
    pub search: Option<String>,
    pub deal_type: Option<DealType>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            category: None,
            brand: None,
            min_price: MIN_PRICE,
            max_price: MAX_PRICE,
            sort: SortOrder::Random,
            search: None,
            deal_type: None,
        }
    }
}

impl FilterState {
    /// Re-applies every normalization rule. Idempotent.
    pub fn normalized(self) -> Self {
        let (min_price, max_price) = normalize_price_range(self.min_price, self.max_price);
        Self {
            page: normalize_page(self.page as i64),
            page_size: normalize_page_size(self.page_size as i64),
            category: normalize_text(self.category.as_deref()),
            brand: normalize_text(self.brand.as_deref()),
            min_price,
            max_price,
            sort: self.sort,
            search: normalize_text(self.search.as_deref()),
            deal_type: self.deal_type,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// True when any filter other than pagination differs from its default.
    pub fn has_active_filters(&self) -> bool {
        let defaults = Self::default();
        self.category.is_some()
            || self.brand.is_some()
            || self.search.is_some()
            || self.deal_type.is_some()
            || self.sort != defaults.sort
            || self.min_price != defaults.min_price
            || self.max_price != defaults.max_price
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

pub fn normalize_page(page: i64) -> u32 {
    if page < 1 {
        DEFAULT_PAGE
    } else {
        u32::try_from(page).unwrap_or(u32::MAX)
    }
}

/// Snaps to the smallest allowed size that fits `size`, capped at the largest.
pub fn normalize_page_size(size: i64) -> u32 {
    if size < 1 {
        return DEFAULT_PAGE_SIZE;
    }
    PAGE_SIZES
        .iter()
        .copied()
        .find(|allowed| *allowed as i64 >= size)
        .unwrap_or(PAGE_SIZES[PAGE_SIZES.len() - 1])
}

/// Clamps both bounds into `[MIN_PRICE, MAX_PRICE]` and orders them.
pub fn normalize_price_range(min: i64, max: i64) -> (i64, i64) {
    let min = min.clamp(MIN_PRICE, MAX_PRICE);
    let max = max.clamp(MIN_PRICE, MAX_PRICE);
    if min > max {
        (max, min)
    } else {
        (min, max)
    }
}

pub fn normalize_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Coerces a numeric string. Fractions truncate; anything else is `None`.
pub fn parse_number(value: &str) -> Option<i64> {
    let value = value.trim();
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(|n| n.trunc() as i64)
}

// =============================================================================
// FILTER STORE
// =============================================================================

/// Single mutable holder of the listing page's `FilterState`.
#[derive(Debug, Clone, Default)]
pub struct FilterStore {
    state: FilterState,
}

impl FilterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: FilterState) -> Self {
        Self {
            state: state.normalized(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn set_category(&mut self, value: Option<&str>) -> FilterState {
        self.state.category = normalize_text(value);
        self.reset_page()
    }

    pub fn set_brand(&mut self, value: Option<&str>) -> FilterState {
        self.state.brand = normalize_text(value);
        self.reset_page()
    }

    pub fn set_price_range(&mut self, min: i64, max: i64) -> FilterState {
        let (min, max) = normalize_price_range(min, max);
        self.state.min_price = min;
        self.state.max_price = max;
        self.reset_page()
    }

    pub fn set_sort(&mut self, value: SortOrder) -> FilterState {
        self.state.sort = value;
        self.reset_page()
    }

    pub fn set_search(&mut self, value: Option<&str>) -> FilterState {
        self.state.search = normalize_text(value);
        self.reset_page()
    }

    pub fn set_deal_type(&mut self, value: Option<DealType>) -> FilterState {
        self.state.deal_type = value;
        self.reset_page()
    }

    pub fn set_page(&mut self, page: i64) -> FilterState {
        self.state.page = normalize_page(page);
        self.state.clone()
    }

    pub fn set_page_size(&mut self, size: i64) -> FilterState {
        self.state.page_size = normalize_page_size(size);
        self.state.clone()
    }

    pub fn clear(&mut self) -> FilterState {
        self.state = FilterState::default();
        self.state.clone()
    }

    /// Swaps in a whole state, e.g. one parsed from the address bar.
    pub fn replace(&mut self, state: FilterState) -> FilterState {
        self.state = state.normalized();
        self.state.clone()
    }

    fn reset_page(&mut self) -> FilterState {
        self.state.page = DEFAULT_PAGE;
        self.state.clone()
    }
}

// =============================================================================
// SEARCH SUGGESTIONS
// =============================================================================

/// Type-ahead matches for the search box: case-insensitive substring match on
/// name, brand or category, in catalog order. Terms shorter than
/// `SUGGEST_MIN_CHARS` after trimming suggest nothing.
pub fn suggest<'a>(products: &'a [ProductSummary], term: &str) -> Vec<&'a ProductSummary> {
    let term = term.trim();
    if term.chars().count() < SUGGEST_MIN_CHARS {
        return Vec::new();
    }
    let term = term.to_lowercase();
    let hit = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&term));

    products
        .iter()
        .filter(|p| {
            hit(Some(p.name.as_str())) || hit(p.brand.as_deref()) || hit(p.category.as_deref())
        })
        .take(SUGGEST_LIMIT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_on_page(page: i64) -> FilterStore {
        let mut store = FilterStore::new();
        store.set_page(page);
        store
    }

    #[test]
    fn test_price_range_clamps_negative_and_orders() {
        let mut store = FilterStore::new();
        let state = store.set_price_range(-50, 10);
        assert_eq!((state.min_price, state.max_price), (0, 10));

        let state = store.set_price_range(20_000, 5_000);
        assert_eq!((state.min_price, state.max_price), (5_000, 20_000));

        let state = store.set_price_range(-10, 9_000_000);
        assert_eq!((state.min_price, state.max_price), (MIN_PRICE, MAX_PRICE));
    }

    #[test]
    fn test_filter_setters_reset_page() {
        let setters: Vec<Box<dyn Fn(&mut FilterStore) -> FilterState>> = vec![
            Box::new(|s: &mut FilterStore| s.set_category(Some("Phones"))),
            Box::new(|s: &mut FilterStore| s.set_brand(Some("Samsung"))),
            Box::new(|s: &mut FilterStore| s.set_price_range(100, 200)),
            Box::new(|s: &mut FilterStore| s.set_sort(SortOrder::Newest)),
            Box::new(|s: &mut FilterStore| s.set_search(Some("galaxy"))),
            Box::new(|s: &mut FilterStore| s.set_deal_type(Some(DealType::FlashSale))),
            Box::new(|s: &mut FilterStore| s.clear()),
        ];
        for setter in setters {
            let mut store = store_on_page(4);
            assert_eq!(setter(&mut store).page, 1);
        }
    }

    #[test]
    fn test_pagination_setters_keep_page() {
        let mut store = store_on_page(3);
        assert_eq!(store.set_page_size(48).page, 3);
        assert_eq!(store.set_page(5).page, 5);
    }

    #[test]
    fn test_page_and_page_size_normalization() {
        assert_eq!(normalize_page(0), 1);
        assert_eq!(normalize_page(-7), 1);
        assert_eq!(normalize_page(9), 9);
        assert_eq!(normalize_page_size(0), 12);
        assert_eq!(normalize_page_size(12), 12);
        assert_eq!(normalize_page_size(30), 48);
        assert_eq!(normalize_page_size(5000), 1000);
    }

    #[test]
    fn test_text_filters_trim_to_none() {
        let mut store = FilterStore::new();
        assert_eq!(store.set_category(Some("   ")).category, None);
        assert_eq!(store.set_search(Some("  pixel ")).search.as_deref(), Some("pixel"));
    }

    #[test]
    fn test_sort_and_deal_parsing() {
        assert_eq!(SortOrder::parse("price_asc"), Some(SortOrder::PriceLow));
        assert_eq!(SortOrder::parse("PRICE-HIGH"), Some(SortOrder::PriceHigh));
        assert_eq!(SortOrder::parse("cheapest"), None);
        assert_eq!(DealType::parse("flash-sale"), Some(DealType::FlashSale));
        assert_eq!(DealType::parse("dealOfTheDay"), Some(DealType::DealOfTheDay));
        assert_eq!(DealType::parse("deal"), None);
    }

    #[test]
    fn test_parse_number_coerces() {
        assert_eq!(parse_number(" 1500 "), Some(1500));
        assert_eq!(parse_number("1500.9"), Some(1500));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn test_active_filters() {
        let mut store = FilterStore::new();
        assert!(!store.state().has_active_filters());
        store.set_page(3);
        assert!(!store.state().has_active_filters());
        store.set_sort(SortOrder::Popular);
        assert!(store.state().has_active_filters());
    }

    fn catalog_item(id: usize, name: &str, brand: Option<&str>, category: Option<&str>) -> ProductSummary {
        serde_json::from_value(serde_json::json!({
            "_id": id.to_string(),
            "name": name,
            "brand": brand,
            "category": category,
            "price": 1000,
        }))
        .unwrap()
    }

    #[test]
    fn test_suggest_needs_two_characters() {
        let products = vec![catalog_item(1, "Galaxy A15", Some("Samsung"), Some("Phones"))];
        assert!(suggest(&products, "g").is_empty());
        assert!(suggest(&products, "  g  ").is_empty());
        assert_eq!(suggest(&products, " ga ").len(), 1);
    }

    #[test]
    fn test_suggest_matches_name_brand_and_category() {
        let products = vec![
            catalog_item(1, "Galaxy A15", Some("Samsung"), Some("Phones")),
            catalog_item(2, "Redmi 13", Some("Xiaomi"), Some("Phones")),
            catalog_item(3, "Power Bank", None, Some("Accessories")),
            catalog_item(4, "Buds FE", Some("SAMSUNG"), None),
        ];
        let ids = |term: &str| -> Vec<String> {
            suggest(&products, term).into_iter().map(|p| p.id.clone()).collect()
        };
        assert_eq!(ids("samsung"), vec!["1", "4"]);
        assert_eq!(ids("PHONE"), vec!["1", "2"]);
        assert_eq!(ids("bank"), vec!["3"]);
        assert!(ids("tablet").is_empty());
    }

    #[test]
    fn test_suggest_caps_results() {
        let products: Vec<_> = (0..30)
            .map(|i| catalog_item(i, &format!("Phone case {}", i), None, None))
            .collect();
        let found = suggest(&products, "case");
        assert_eq!(found.len(), SUGGEST_LIMIT);
        assert_eq!(found[0].id, "0");
    }
}
