//! reqwest-backed implementation of the HTTP probe capability

use async_trait::async_trait;
use cloudaudit_core::{HttpProbe, HttpResponse, ProbeError};
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

const USER_AGENT: &str = concat!("cloudaudit/", env!("CARGO_PKG_VERSION"));

/// HTTP probe over reqwest
///
/// Redirects are NOT followed: the hosting checks inspect 3xx responses
/// (redirect enforcement, loop detection) and need to see them raw.
pub struct ReqwestProbe {
    client: Client,
}

impl ReqwestProbe {
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(false)
            .build()
            .map_err(|e| ProbeError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpProbe for ReqwestProbe {
    async fn get(&self, url: &str) -> Result<HttpResponse, ProbeError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                ProbeError::Connection(e.to_string())
            } else {
                ProbeError::Other(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();

        let mut headers = HashMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.to_string(), v.to_string());
            }
        }

        let body = response.text().await.unwrap_or_default();

        Ok(HttpResponse {
            status,
            headers,
            body,
            final_url,
        })
    }
}
