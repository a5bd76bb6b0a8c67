//! Store location endpoints.

use tracing::instrument;

use super::types::Location;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// List all store locations.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn locations(&self) -> Result<Vec<Location>, ApiError> {
        self.get_json("/locations").await
    }

    /// Search locations by text, optionally within a radius in miles.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_locations(
        &self,
        query: &str,
        radius_miles: Option<f64>,
    ) -> Result<Vec<Location>, ApiError> {
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        params.append_pair("q", query);
        if let Some(radius) = radius_miles
            && radius > 0.0
        {
            params.append_pair("radius", &radius.to_string());
        }
        self.get_json(&format!("/locations/search?{}", params.finish()))
            .await
    }
}
