use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::CatalogConfig;
use crate::error::{ConfigError, FetchError};
use crate::fetcher::CatalogFetcher;
use crate::filter::FilterState;
use crate::query_sync::{
    KEY_BRAND, KEY_CATEGORY, KEY_DEAL_TYPE, KEY_LIMIT, KEY_MAX_PRICE, KEY_MIN_PRICE, KEY_PAGE,
    KEY_SEARCH, KEY_SORT,
};
use crate::types::{
    Brand, BrandsEnvelope, CatalogPage, CategoriesEnvelope, Category, ProductDetail,
    ProductEnvelope, ProductSummary, ProductsEnvelope,
};

pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Thin client for the storefront backend.
#[derive(Debug, Clone)]
pub struct CatalogApi {
    http: Client,
    config: CatalogConfig,
}

impl CatalogApi {
    pub fn new(config: CatalogConfig) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    // =========================================================================
    // PRODUCTS
    // =========================================================================

    /// `GET /products` for one listing page.
    pub async fn get_products(&self, state: &FilterState) -> Result<CatalogPage, FetchError> {
        let params = listing_params(state);
        let envelope: ProductsEnvelope = self.get_json("/products", &params).await?;
        Ok(envelope.into())
    }

    pub async fn get_product(&self, id: &str) -> Result<ProductDetail, FetchError> {
        let path = format!("/products/{}", urlencoding::encode(id));
        let envelope: ProductEnvelope = self.get_json(&path, &[]).await?;
        Ok(envelope.into_inner())
    }

    /// Products sharing `product`'s category, excluding the product itself.
    pub async fn get_related_products(
        &self,
        product: &ProductSummary,
    ) -> Result<Vec<ProductSummary>, FetchError> {
        let Some(category) = product.category.as_deref() else {
            return Ok(Vec::new());
        };

        let params = [
            (KEY_CATEGORY, category.to_string()),
            (KEY_LIMIT, (RELATED_PRODUCTS_LIMIT + 1).to_string()),
        ];
        let envelope: ProductsEnvelope = self.get_json("/products", &params).await?;
        let page: CatalogPage = envelope.into();

        Ok(page
            .products
            .into_iter()
            .filter(|p| p.id != product.id)
            .take(RELATED_PRODUCTS_LIMIT)
            .collect())
    }

    // =========================================================================
    // TAXONOMY
    // =========================================================================

    pub async fn get_categories(&self) -> Result<Vec<Category>, FetchError> {
        let envelope: CategoriesEnvelope = self.get_json("/categories", &[]).await?;
        Ok(envelope.into_inner())
    }

    pub async fn get_brands(&self) -> Result<Vec<Brand>, FetchError> {
        let envelope: BrandsEnvelope = self.get_json("/brands", &[]).await?;
        Ok(envelope.into_inner())
    }

    // =========================================================================
    // TRANSPORT
    // =========================================================================

    async fn get_json<T>(&self, path: &str, params: &[(&str, String)]) -> Result<T, FetchError>
    where
        T: DeserializeOwned,
    {
        let url = self.config.endpoint(path);
        debug!("GET {} {:?}", url, params);

        let mut request = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(params);
        if let Some(token) = &self.config.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            FetchError::from(e)
        })?;

        let body = read_success_body(response).await.map_err(|e| {
            warn!("Request to {} failed: {}", url, e);
            e
        })?;

        serde_json::from_str(&body).map_err(|e| {
            warn!("Malformed response from {}: {}", url, e);
            FetchError::from(e)
        })
    }
}

async fn read_success_body(response: Response) -> Result<String, FetchError> {
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::http(
            status.as_u16(),
            format!("Request failed {}", status),
        ));
    }
    response.text().await.map_err(FetchError::from)
}

#[async_trait]
impl CatalogFetcher for CatalogApi {
    async fn fetch(&self, state: &FilterState) -> Result<CatalogPage, FetchError> {
        self.get_products(state).await
    }
}

/// Outbound listing parameters. Pagination, price bounds and sort are always
/// sent so equal states produce byte-equal requests.
pub fn listing_params(state: &FilterState) -> Vec<(&'static str, String)> {
    let mut params = vec![
        (KEY_PAGE, state.page.to_string()),
        (KEY_LIMIT, state.page_size.to_string()),
    ];
    if let Some(category) = &state.category {
        params.push((KEY_CATEGORY, category.clone()));
    }
    if let Some(brand) = &state.brand {
        params.push((KEY_BRAND, brand.clone()));
    }
    params.push((KEY_MIN_PRICE, state.min_price.to_string()));
    params.push((KEY_MAX_PRICE, state.max_price.to_string()));
    if let Some(search) = &state.search {
        params.push((KEY_SEARCH, search.clone()));
    }
    params.push((KEY_SORT, state.sort.as_str().to_string()));
    if let Some(deal_type) = state.deal_type {
        params.push((KEY_DEAL_TYPE, deal_type.as_str().to_string()));
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{DealType, SortOrder};

    #[test]
    fn test_default_listing_params_are_stable() {
        let params = listing_params(&FilterState::default());
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["page", "limit", "minPrice", "maxPrice", "sort"]);
        assert_eq!(params[4].1, "random");
    }

    #[test]
    fn test_listing_params_include_set_filters() {
        let state = FilterState {
            category: Some("Phones".to_string()),
            brand: Some("Tecno".to_string()),
            search: Some("spark".to_string()),
            sort: SortOrder::PriceLow,
            deal_type: Some(DealType::DealOfTheDay),
            ..FilterState::default()
        };
        let params = listing_params(&state);
        assert!(params.contains(&("category", "Phones".to_string())));
        assert!(params.contains(&("brand", "Tecno".to_string())));
        assert!(params.contains(&("search", "spark".to_string())));
        assert!(params.contains(&("sort", "price-low".to_string())));
        assert!(params.contains(&("dealType", "dealOfTheDay".to_string())));
    }
}
