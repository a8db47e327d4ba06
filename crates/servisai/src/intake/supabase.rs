use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use tracing::debug;

use super::draft::LeadPayload;
use super::gateway::{GatewayError, LeadGateway};
use crate::config::LeadStoreConfig;

const LEADS_TABLE_PATH: &str = "/rest/v1/leads";

/// Inserts leads into the hosted `leads` table through its REST endpoint.
#[derive(Clone)]
pub struct SupabaseGateway {
    http: Client,
    endpoint: String,
    headers: HeaderMap,
}

impl std::fmt::Debug for SupabaseGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseGateway")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl SupabaseGateway {
    /// Every request is bounded by `config.request_timeout`; an expired
    /// request surfaces as `GatewayError::Transport`.
    pub fn new(config: &LeadStoreConfig) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| GatewayError::Unavailable(format!("http client: {err}")))?;
        Self::with_client(http, config)
    }

    pub fn with_client(http: Client, config: &LeadStoreConfig) -> Result<Self, GatewayError> {
        let key = HeaderValue::from_str(&config.anon_key)
            .map_err(|err| GatewayError::Unavailable(format!("invalid anon key: {err}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.anon_key))
            .map_err(|err| GatewayError::Unavailable(format!("invalid anon key: {err}")))?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("prefer", HeaderValue::from_static("return=minimal"));

        Ok(Self {
            http,
            endpoint: format!("{}{LEADS_TABLE_PATH}", config.url.trim_end_matches('/')),
            headers,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl LeadGateway for SupabaseGateway {
    async fn insert_lead(&self, lead: &LeadPayload) -> Result<(), GatewayError> {
        let response = self
            .http
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&[lead])
            .send()
            .await
            .map_err(|err| GatewayError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(category = %lead.category, "lead row inserted");
            return Ok(());
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|err| format!("unreadable response body: {err}"));
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
