use serde::{Deserialize, Serialize};

// =============================================================================
// CATALOG ITEMS
// =============================================================================

/// Read-only projection of a catalog item, as rendered in one grid cell.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase", try_from = "ProductSummaryRecord")]
pub struct ProductSummary {
    pub id: String,
    pub name: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub model: Option<String>,
    pub price: Option<f64>,
    pub discount_price: Option<f64>,
    pub rating: Option<f32>,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub specs: Option<ProductSpecs>,
    pub badge: Option<String>,
    pub deal_type: Option<String>,
    pub tags: Vec<String>,
}

impl ProductSummary {
    /// Price the shopper pays: the discount price when set, else the list price.
    pub fn effective_price(&self) -> Option<f64> {
        self.discount_price.or(self.price)
    }
}

/// Backend shape of a product. Documents may carry `_id`, `id` or both.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductSummaryRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    price: Option<f64>,
    #[serde(default)]
    discount_price: Option<f64>,
    #[serde(default)]
    rating: Option<f32>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    specs: Option<ProductSpecs>,
    #[serde(default)]
    badge: Option<String>,
    #[serde(default)]
    deal_type: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
}

impl TryFrom<ProductSummaryRecord> for ProductSummary {
    type Error = String;

    fn try_from(record: ProductSummaryRecord) -> Result<Self, Self::Error> {
        let id = resolve_id(record.object_id, record.id)
            .ok_or_else(|| format!("product {:?} has neither _id nor id", record.name))?;
        Ok(Self {
            id,
            name: record.name,
            brand: record.brand,
            category: record.category,
            model: record.model,
            price: record.price,
            discount_price: record.discount_price,
            rating: record.rating,
            thumbnail: record.thumbnail,
            images: record.images,
            specs: record.specs,
            badge: record.badge,
            deal_type: record.deal_type,
            tags: record.tags,
        })
    }
}

/// `_id` wins over `id`; blank values count as missing.
fn resolve_id(object_id: Option<String>, id: Option<String>) -> Option<String> {
    object_id
        .filter(|v| !v.is_empty())
        .or(id.filter(|v| !v.is_empty()))
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ProductSpecs {
    #[serde(default)]
    pub storage: Option<String>,
    #[serde(default)]
    pub ram: Option<String>,
}

/// Full product record from `GET /products/:id`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub summary: ProductSummary,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub in_stock: Option<bool>,
    #[serde(default)]
    pub stock_quantity: Option<u32>,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl ProductDetail {
    /// Missing `inStock` reads as unavailable.
    pub fn is_in_stock(&self) -> bool {
        self.in_stock.unwrap_or(false)
    }

    pub fn availability(&self) -> &'static str {
        if self.is_in_stock() {
            "In stock"
        } else {
            "Out of stock"
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(from = "CategoryRecord")]
pub struct Category {
    pub id: Option<String>,
    pub name: String,
    pub slug: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    image: Option<String>,
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: resolve_id(record.object_id, record.id),
            name: record.name,
            slug: record.slug,
            image: record.image,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(from = "BrandRecord")]
pub struct Brand {
    pub id: Option<String>,
    pub name: String,
    pub logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BrandRecord {
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    name: String,
    #[serde(default)]
    logo: Option<String>,
}

impl From<BrandRecord> for Brand {
    fn from(record: BrandRecord) -> Self {
        Self {
            id: resolve_id(record.object_id, record.id),
            name: record.name,
            logo: record.logo,
        }
    }
}

// =============================================================================
// CATALOG PAGE
// =============================================================================

/// One page of listing results. Each successful fetch replaces the previous
/// page wholesale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogPage {
    pub products: Vec<ProductSummary>,
    pub total: u64,
}

impl CatalogPage {
    pub fn new(products: Vec<ProductSummary>, total: u64) -> Self {
        Self { products, total }
    }

    pub fn empty() -> Self {
        Self {
            products: Vec::new(),
            total: 0,
        }
    }

    /// `ceil(total / page_size)`.
    pub fn page_count(&self, page_size: u32) -> u32 {
        page_count(self.total, page_size)
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(page_size as u64);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

// =============================================================================
// RESPONSE ENVELOPES
// =============================================================================

/// `/products` answers `{products, count}`, `{products, total}` or a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductsEnvelope {
    Wrapped {
        products: Vec<ProductSummary>,
        #[serde(default)]
        count: Option<u64>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<ProductSummary>),
}

impl From<ProductsEnvelope> for CatalogPage {
    fn from(envelope: ProductsEnvelope) -> Self {
        match envelope {
            ProductsEnvelope::Wrapped {
                products,
                count,
                total,
            } => {
                let total = count.or(total).unwrap_or(products.len() as u64);
                CatalogPage::new(products, total)
            }
            ProductsEnvelope::Bare(products) => {
                let total = products.len() as u64;
                CatalogPage::new(products, total)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProductEnvelope {
    Wrapped { product: ProductDetail },
    Bare(ProductDetail),
}

impl ProductEnvelope {
    pub fn into_inner(self) -> ProductDetail {
        match self {
            Self::Wrapped { product } => product,
            Self::Bare(product) => product,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CategoriesEnvelope {
    Wrapped { categories: Vec<Category> },
    Bare(Vec<Category>),
}

impl CategoriesEnvelope {
    pub fn into_inner(self) -> Vec<Category> {
        match self {
            Self::Wrapped { categories } => categories,
            Self::Bare(categories) => categories,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BrandsEnvelope {
    Wrapped { brands: Vec<Brand> },
    Bare(Vec<Brand>),
}

impl BrandsEnvelope {
    pub fn into_inner(self) -> Vec<Brand> {
        match self {
            Self::Wrapped { brands } => brands,
            Self::Bare(brands) => brands,
        }
    }
}
