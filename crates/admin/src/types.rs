//! Wire types for the admin surface of the ordering backend.

use serde::{Deserialize, Serialize};

use stonefire_core::{AdminRole, OrderStatus, StoreId};

/// `POST /admin/login` request body.
///
/// `store` lets a first login attach the admin to a store by description
/// when ids are not known yet.
#[derive(Debug, Serialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreDescriptor>,
}

/// `POST /admin/signup` request body: creates the store and its first
/// admin in one step.
#[derive(Debug, Serialize)]
pub struct AdminSignupRequest {
    pub store_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub admin_name: String,
    pub email: String,
    pub password: String,
}

/// A store described by name and address fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Successful admin login or signup response.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminAuthResponse {
    /// Some deployments say `token`, others `access_token`.
    #[serde(alias = "token")]
    pub access_token: String,
    #[serde(default)]
    pub admin_name: Option<String>,
    #[serde(default)]
    pub store_id: Option<StoreId>,
    #[serde(default)]
    pub role: Option<AdminRole>,
}

/// `GET /admin/me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub store: Option<StoreInfo>,
}

/// The admin's store, from `GET /admin/store` or nested in the profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreInfo {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// `PATCH /admin/orders/{id}` request body.
#[derive(Debug, Serialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// `PATCH /admin/store` request body.
#[derive(Debug, Serialize)]
pub struct StoreStatusRequest {
    pub is_active: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_accepts_both_token_keys() {
        let with_access: AdminAuthResponse =
            serde_json::from_value(serde_json::json!({"access_token": "a", "store_id": 3}))
                .unwrap();
        assert_eq!(with_access.access_token, "a");

        let with_token: AdminAuthResponse =
            serde_json::from_value(serde_json::json!({"token": "b"})).unwrap();
        assert_eq!(with_token.access_token, "b");
        assert!(with_token.store_id.is_none());
    }

    #[test]
    fn test_status_update_serializes_screaming_snake() {
        let body = StatusUpdateRequest {
            status: OrderStatus::OutForDelivery,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap()["status"],
            "OUT_FOR_DELIVERY"
        );
    }
}
