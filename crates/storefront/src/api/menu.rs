//! Menu catalog endpoints, with read-through caching.
//!
//! The catalog changes rarely, so responses are cached for 5 minutes via
//! `moka` (unfiltered queries only, mirroring how the cart endpoints are
//! deliberately never cached).

use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};

use super::types::{Category, Product, ProductFilter, Topping};
use super::{ApiClient, ApiError};

const MENU_CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes
const MENU_CACHE_CAPACITY: u64 = 100;

/// Cached menu responses, keyed by endpoint + filter.
#[derive(Clone)]
pub(crate) enum CacheValue {
    Categories(Vec<Category>),
    Products(Vec<Product>),
    Toppings(Vec<Topping>),
}

pub(crate) struct MenuCache {
    cache: Cache<String, CacheValue>,
}

impl MenuCache {
    pub(crate) fn new() -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(MENU_CACHE_CAPACITY)
                .time_to_live(MENU_CACHE_TTL)
                .build(),
        }
    }
}

impl ApiClient {
    /// Get the menu categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let cache = &self.menu_cache().cache;
        if let Some(CacheValue::Categories(categories)) = cache.get("categories").await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get_json("/menu/categories").await?;
        cache
            .insert(
                "categories".to_string(),
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// Get catalog products, optionally filtered by category and type.
    ///
    /// Only unfiltered queries are cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn products(&self, filter: Option<&ProductFilter>) -> Result<Vec<Product>, ApiError> {
        let cache = &self.menu_cache().cache;
        let unfiltered = filter.is_none_or(|f| f.category_id.is_none() && f.kind.is_none());

        if unfiltered
            && let Some(CacheValue::Products(products)) = cache.get("products").await
        {
            debug!("cache hit for products");
            return Ok(products);
        }

        let path = match filter {
            Some(filter) => {
                let mut query = url::form_urlencoded::Serializer::new(String::new());
                if let Some(category_id) = filter.category_id {
                    query.append_pair("category_id", &category_id.to_string());
                }
                if let Some(kind) = &filter.kind {
                    query.append_pair("type", kind);
                }
                let encoded = query.finish();
                if encoded.is_empty() {
                    "/menu/products".to_string()
                } else {
                    format!("/menu/products?{encoded}")
                }
            }
            None => "/menu/products".to_string(),
        };

        let products: Vec<Product> = self.get_json(&path).await?;
        if unfiltered {
            cache
                .insert(
                    "products".to_string(),
                    CacheValue::Products(products.clone()),
                )
                .await;
        }
        Ok(products)
    }

    /// Get customizer toppings, optionally filtered by group.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn toppings(&self, kind: Option<&str>) -> Result<Vec<Topping>, ApiError> {
        let cache = &self.menu_cache().cache;
        let cache_key = format!("toppings:{}", kind.unwrap_or(""));
        if let Some(CacheValue::Toppings(toppings)) = cache.get(&cache_key).await {
            debug!("cache hit for toppings");
            return Ok(toppings);
        }

        let path = match kind {
            Some(kind) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("type", kind)
                    .finish();
                format!("/menu/toppings?{encoded}")
            }
            None => "/menu/toppings".to_string(),
        };

        let toppings: Vec<Topping> = self.get_json(&path).await?;
        cache
            .insert(cache_key, CacheValue::Toppings(toppings.clone()))
            .await;
        Ok(toppings)
    }

    /// Get the specialty pizzas.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn specialty(&self) -> Result<Vec<Product>, ApiError> {
        let cache = &self.menu_cache().cache;
        if let Some(CacheValue::Products(products)) = cache.get("specialty").await {
            debug!("cache hit for specialty");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_json("/menu/specialty").await?;
        cache
            .insert(
                "specialty".to_string(),
                CacheValue::Products(products.clone()),
            )
            .await;
        Ok(products)
    }

    /// Drop all cached menu data.
    pub async fn invalidate_menu_cache(&self) {
        let cache = &self.menu_cache().cache;
        cache.invalidate_all();
        cache.run_pending_tasks().await;
    }
}
