//! DoorDash Drive client.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use tracing::debug;
use url::Url;

use concierge_core::{DeliveryId, ErrandStage};

use super::{canned_errand, DeliveryError, DeliveryProvider, DeliveryRequest};
use crate::errand::Errand;

/// Default DoorDash Drive API.
pub const DEFAULT_API_URL: &str = "https://openapi.doordash.com/drive/v2";

/// Lifetime of each signed request token.
const TOKEN_TTL_SECS: i64 = 300;

/// ETA shown for a new delivery when DoorDash does not estimate one.
const DEFAULT_ETA_MINUTES: i64 = 35;

type HmacSha256 = Hmac<Sha256>;

/// DoorDash Drive configuration.
#[derive(Debug, Clone)]
pub struct DoorDashConfig {
    /// Base URL of the Drive API.
    pub api_url: String,

    /// Developer id (`iss` claim).
    pub developer_id: Option<String>,

    /// Key id (`kid` claim).
    pub key_id: Option<String>,

    /// Base64 signing secret.
    pub signing_secret: Option<String>,

    /// Request timeout.
    pub timeout: Duration,
}

impl DoorDashConfig {
    /// True iff all three credentials are present.
    pub fn is_configured(&self) -> bool {
        [&self.developer_id, &self.key_id, &self.signing_secret]
            .iter()
            .all(|value| value.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

impl Default for DoorDashConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            developer_id: None,
            key_id: None,
            signing_secret: None,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Map a raw Drive `delivery_status` onto an errand stage.
pub fn map_doordash_status(status: Option<&str>) -> ErrandStage {
    match status.unwrap_or_default() {
        "created" | "confirmed" => ErrandStage::Assigned,
        "enroute_to_pickup" | "arrived_at_pickup" => ErrandStage::PickingUp,
        "picked_up" | "enroute_to_dropoff" | "arrived_at_dropoff" => ErrandStage::EnRoute,
        "delivered" => ErrandStage::Delivered,
        _ => ErrandStage::Assigned,
    }
}

/// Delivery payload returned by Drive. Every field is optional in practice.
#[derive(Debug, Default, Deserialize)]
struct DriveDelivery {
    external_delivery_id: Option<String>,
    pickup_address: Option<String>,
    dropoff_address: Option<String>,
    dasher_name: Option<String>,
    delivery_status: Option<String>,
    estimated_pickup_time: Option<String>,
    items: Option<Vec<Option<DriveItem>>>,
}

#[derive(Debug, Deserialize)]
struct DriveItem {
    name: Option<String>,
}

impl DriveDelivery {
    /// Name of the first item, if Drive reported one.
    fn first_item(&mut self) -> Option<String> {
        self.items
            .take()?
            .into_iter()
            .next()
            .flatten()
            .and_then(|item| item.name)
            .filter(|name| !name.trim().is_empty())
    }
}

/// Minutes from `now` until `estimate`, rounded.
fn minutes_until(estimate: Option<&str>, now: DateTime<Utc>) -> Option<i64> {
    let estimate = DateTime::parse_from_rfc3339(estimate?).ok()?;
    let seconds = (estimate.with_timezone(&Utc) - now).num_seconds();
    Some((seconds as f64 / 60.0).round() as i64)
}

/// DoorDash Drive client authenticated with short-lived JWTs.
pub struct DoorDashClient {
    inner: reqwest::Client,
    base_url: Url,
    developer_id: String,
    key_id: String,
    signing_secret: Vec<u8>,
}

impl DoorDashClient {
    /// Build a client, or `None` when the credentials are incomplete.
    pub fn from_config(config: &DoorDashConfig) -> Result<Option<Self>, DeliveryError> {
        let (Some(developer_id), Some(key_id), Some(secret)) = (
            config.developer_id.as_deref(),
            config.key_id.as_deref(),
            config.signing_secret.as_deref(),
        ) else {
            return Ok(None);
        };
        if !config.is_configured() {
            return Ok(None);
        }

        let signing_secret = STANDARD
            .decode(secret.trim())
            .map_err(|e| DeliveryError::Credentials(e.to_string()))?;
        let base_url = Url::parse(config.api_url.trim_end_matches('/'))
            .map_err(|e| DeliveryError::Url(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(DeliveryError::Url(config.api_url.clone()));
        }

        Ok(Some(Self {
            inner: reqwest::Client::builder().timeout(config.timeout).build()?,
            base_url,
            developer_id: developer_id.trim().to_string(),
            key_id: key_id.trim().to_string(),
            signing_secret,
        }))
    }

    /// Signed `DD-JWT-V1` token valid for five minutes from `now`.
    fn token(&self, now: DateTime<Utc>) -> Result<String, DeliveryError> {
        let header = json!({ "alg": "HS256", "typ": "JWT", "dd-ver": "DD-JWT-V1" });
        let claims = json!({
            "aud": "doordash",
            "iss": self.developer_id,
            "kid": self.key_id,
            "iat": now.timestamp(),
            "exp": now.timestamp() + TOKEN_TTL_SECS,
        });

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header.to_string()),
            URL_SAFE_NO_PAD.encode(claims.to_string())
        );

        let mut mac = HmacSha256::new_from_slice(&self.signing_secret)
            .map_err(|e| DeliveryError::Credentials(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{signing_input}.{signature}"))
    }

    fn deliveries_url(&self, id: Option<&DeliveryId>) -> Result<Url, DeliveryError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| DeliveryError::Url(self.base_url.to_string()))?;
            segments.pop_if_empty().push("deliveries");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> Result<RequestBuilder, DeliveryError> {
        Ok(self
            .inner
            .request(method, url)
            .bearer_auth(self.token(Utc::now())?))
    }

    async fn send(&self, builder: RequestBuilder) -> Result<DriveDelivery, DeliveryError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeliveryProvider for DoorDashClient {
    fn is_live(&self) -> bool {
        true
    }

    async fn create_delivery(&self, request: &DeliveryRequest) -> Result<Errand, DeliveryError> {
        let external_id = format!("concierge-{}", Utc::now().timestamp_millis());
        let body = json!({
            "external_delivery_id": external_id,
            "pickup_address": request.pickup_address,
            "pickup_phone_number": "+12125551234",
            "dropoff_address": request.dropoff_address,
            "dropoff_phone_number": "+12125555678",
            "order_value": 0,
            "items": [{ "name": request.items, "quantity": 1, "external_id": "item-1" }],
        });

        let url = self.deliveries_url(None)?;
        debug!(url = %url, external_id = %external_id, "Creating DoorDash delivery");
        let delivery = self
            .send(self.request(Method::POST, url)?.json(&body))
            .await?;

        Ok(Errand {
            id: DeliveryId::new(delivery.external_delivery_id.unwrap_or(external_id)),
            pickup_address: delivery
                .pickup_address
                .unwrap_or_else(|| request.pickup_address.clone()),
            dropoff_address: delivery
                .dropoff_address
                .unwrap_or_else(|| request.dropoff_address.clone()),
            items: request.items.clone(),
            dasher_name: delivery.dasher_name,
            status: map_doordash_status(delivery.delivery_status.as_deref()),
            eta_minutes: minutes_until(delivery.estimated_pickup_time.as_deref(), Utc::now())
                .unwrap_or(DEFAULT_ETA_MINUTES),
            tracking: None,
        })
    }

    async fn delivery_status(&self, id: &DeliveryId) -> Result<Errand, DeliveryError> {
        let url = self.deliveries_url(Some(id))?;
        debug!(url = %url, "Fetching DoorDash delivery");
        let mut delivery = self.send(self.request(Method::GET, url)?).await?;

        let fallback = canned_errand(id.clone());
        let first_item = delivery.first_item();
        Ok(Errand {
            id: delivery
                .external_delivery_id
                .map(DeliveryId::new)
                .unwrap_or(fallback.id),
            pickup_address: delivery.pickup_address.unwrap_or(fallback.pickup_address),
            dropoff_address: delivery.dropoff_address.unwrap_or(fallback.dropoff_address),
            items: first_item.unwrap_or(fallback.items),
            dasher_name: delivery.dasher_name,
            status: map_doordash_status(delivery.delivery_status.as_deref()),
            eta_minutes: minutes_until(delivery.estimated_pickup_time.as_deref(), Utc::now())
                .unwrap_or(fallback.eta_minutes),
            tracking: None,
        })
    }
}
