//! Result Renderer: a pure projection from the current page (or its absence)
//! to grid cells and pagination controls.
//!
//! Cell interactions (wishlist toggles, navigation) belong to the caller;
//! nothing here mutates filter state or the page.

use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

use crate::types::{page_count, CatalogPage, ProductSummary};

pub const DEFAULT_SKELETON_COUNT: usize = 8;
pub const DEFAULT_EAGER_COUNT: usize = 6;
pub const DEFAULT_RATING: f32 = 4.5;
pub const FALLBACK_IMAGE: &str = "/fallback.png";
pub const WHATSAPP_NUMBER: &str = "254711111602";
pub const NO_PRICE: &str = "—";
pub const PAGINATION_BOUNDARY_COUNT: u32 = 1;
pub const PAGINATION_SIBLING_COUNT: u32 = 1;

// =============================================================================
// GRID CONFIGURATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    #[default]
    Compact,
    Full,
}

/// Column count per viewport breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnLayout {
    pub xs: u8,
    pub sm: u8,
    pub md: u8,
    pub lg: u8,
    pub xl: u8,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            xs: 2,
            sm: 2,
            md: 3,
            lg: 4,
            xl: 6,
        }
    }
}

impl ColumnLayout {
    /// Columns for a viewport width in CSS pixels.
    pub fn columns_for_width(&self, width: u32) -> u8 {
        match width {
            0..=599 => self.xs,
            600..=899 => self.sm,
            900..=1199 => self.md,
            1200..=1535 => self.lg,
            _ => self.xl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub skeleton_count: usize,
    pub eager_count: usize,
    pub size: CardSize,
    pub show_whatsapp: bool,
    pub show_view_btn: bool,
    pub columns: ColumnLayout,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            skeleton_count: DEFAULT_SKELETON_COUNT,
            eager_count: DEFAULT_EAGER_COUNT,
            size: CardSize::Compact,
            show_whatsapp: true,
            show_view_btn: true,
            columns: ColumnLayout::default(),
        }
    }
}

// =============================================================================
// CELLS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub display_price: String,
    pub original_price: Option<String>,
    pub discount_percent: Option<u32>,
    pub rating: f32,
    pub image: String,
    pub eager_image: bool,
    pub spec_chips: Vec<String>,
    pub badge: Option<String>,
    pub detail_href: String,
    pub whatsapp_href: Option<String>,
    pub show_view_btn: bool,
    pub size: CardSize,
}

impl ProductCardView {
    pub fn from_product(product: &ProductSummary, index: usize, options: &GridOptions) -> Self {
        let mut spec_chips = Vec::new();
        if let Some(specs) = &product.specs {
            if let Some(storage) = &specs.storage {
                spec_chips.push(format!("Storage: {}", storage));
            }
            if let Some(ram) = &specs.ram {
                spec_chips.push(format!("RAM: {}", ram));
            }
        }

        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            display_price: product
                .effective_price()
                .map(format_price)
                .unwrap_or_else(|| NO_PRICE.to_string()),
            original_price: product
                .discount_price
                .and(product.price)
                .map(format_price),
            discount_percent: product
                .price
                .and_then(|price| discount_percent(price, product.discount_price)),
            rating: product.rating.unwrap_or(DEFAULT_RATING),
            image: primary_image(product),
            eager_image: index < options.eager_count,
            spec_chips,
            badge: product.badge.clone(),
            detail_href: product_href(&product.id),
            whatsapp_href: options.show_whatsapp.then(|| whatsapp_link(product)),
            show_view_btn: options.show_view_btn,
            size: options.size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    Skeleton { size: CardSize },
    Product(ProductCardView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    pub columns: ColumnLayout,
    pub cells: Vec<GridCell>,
}

impl Grid {
    pub fn is_skeleton(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| matches!(c, GridCell::Skeleton { .. }))
    }

    pub fn products(&self) -> impl Iterator<Item = &ProductCardView> {
        self.cells.iter().filter_map(|cell| match cell {
            GridCell::Product(view) => Some(view),
            GridCell::Skeleton { .. } => None,
        })
    }
}

/// Skeletons only while loading with nothing to show yet; otherwise one cell
/// per product in server order. An empty page renders zero cells.
pub fn render_grid(page: Option<&CatalogPage>, is_loading: bool, options: &GridOptions) -> Grid {
    let cells: Vec<GridCell> = match page {
        None if is_loading => (0..options.skeleton_count)
            .map(|_| GridCell::Skeleton { size: options.size })
            .collect(),
        None => Vec::new(),
        Some(page) => page
            .products
            .iter()
            .enumerate()
            .map(|(idx, product)| GridCell::Product(ProductCardView::from_product(product, idx, options)))
            .collect(),
    };

    Grid {
        columns: options.columns,
        cells,
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum PageControl {
    Page(u32),
    Gap,
}

impl fmt::Display for PageControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(n) => write!(f, "{}", n),
            Self::Gap => f.write_str("…"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: u32,
    pub page_count: u32,
}

impl Pagination {
    pub fn new(total: u64, page_size: u32, current: u32) -> Self {
        Self {
            current,
            page_count: page_count(total, page_size),
        }
    }

    pub fn is_valid(&self, page: u32) -> bool {
        page >= 1 && page <= self.page_count
    }

    /// Controls in the usual windowed layout: boundary pages at both ends,
    /// siblings around the current page, gaps in between. Never more than
    /// `2 * (boundary + sibling) + 3` entries regardless of `page_count`.
    pub fn controls(&self) -> Vec<PageControl> {
        let count = i64::from(self.page_count);
        if count <= 1 {
            return Vec::new();
        }
        let page = i64::from(self.current.clamp(1, self.page_count));
        let boundary = i64::from(PAGINATION_BOUNDARY_COUNT);
        let siblings = i64::from(PAGINATION_SIBLING_COUNT);

        let start_pages_end = boundary.min(count);
        let end_pages_start = (count - boundary + 1).max(boundary + 1);
        let siblings_start = (page - siblings)
            .min(count - boundary - siblings * 2 - 1)
            .max(boundary + 2);
        let siblings_end = (page + siblings)
            .max(boundary + siblings * 2 + 2)
            .min(if end_pages_start <= count {
                end_pages_start - 2
            } else {
                count - 1
            });

        let mut controls = Vec::new();
        push_pages(&mut controls, 1, start_pages_end);
        if siblings_start > boundary + 2 {
            controls.push(PageControl::Gap);
        } else if boundary + 1 < count - boundary {
            controls.push(PageControl::Page((boundary + 1) as u32));
        }
        push_pages(&mut controls, siblings_start, siblings_end);
        if siblings_end < count - boundary - 1 {
            controls.push(PageControl::Gap);
        } else if count - boundary > boundary {
            controls.push(PageControl::Page((count - boundary) as u32));
        }
        push_pages(&mut controls, end_pages_start, count);
        controls
    }

    pub fn previous(&self) -> Option<u32> {
        let prev = self.current.checked_sub(1)?;
        self.is_valid(prev).then_some(prev)
    }

    pub fn next(&self) -> Option<u32> {
        let next = self.current.checked_add(1)?;
        self.is_valid(next).then_some(next)
    }
}

fn push_pages(controls: &mut Vec<PageControl>, from: i64, to: i64) {
    for n in from..=to {
        controls.push(PageControl::Page(n as u32));
    }
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Whole shillings with thousands separators, e.g. `KES 12,500`.
pub fn format_price(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("KES -{}", grouped)
    } else {
        format!("KES {}", grouped)
    }
}

pub fn discount_percent(price: f64, discount_price: Option<f64>) -> Option<u32> {
    let discount = discount_price?;
    if price <= 0.0 || discount <= 0.0 || discount >= price {
        return None;
    }
    let percent = (100.0 - (discount / price) * 100.0).round();
    (percent > 0.0).then_some(percent as u32)
}

pub fn primary_image(product: &ProductSummary) -> String {
    product
        .thumbnail
        .as_deref()
        .filter(|t| !t.is_empty())
        .or_else(|| product.images.first().map(String::as_str))
        .unwrap_or(FALLBACK_IMAGE)
        .to_string()
}

/// Detail page path with the id escaped as one path segment.
pub fn product_href(id: &str) -> String {
    format!("/products/{}", urlencoding::encode(id))
}

pub fn whatsapp_link(product: &ProductSummary) -> String {
    let price = match product.effective_price() {
        Some(amount) => format!("KES {}", amount.round() as i64),
        None => NO_PRICE.to_string(),
    };
    let model = product
        .model
        .as_deref()
        .map(|m| format!(", {}", m))
        .unwrap_or_default();
    let message = format!(
        "Hello, am interested in buying ({}{}, {})",
        product.name, model, price
    );
    let text: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("https://wa.me/{}?text={}", WHATSAPP_NUMBER, text)
}
