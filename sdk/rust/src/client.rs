use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Where the client puts its key on outgoing requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPlacement {
    /// No key at all.
    None,
    /// `x-functions-key` header.
    Header(String),
    /// `?code=` query parameter.
    Query(String),
    /// Both, with different values. The host must prefer the header.
    Both { header: String, query: String },
}

/// Body returned by a function route.
#[derive(Debug, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub function: Option<String>,
    pub path: String,
    pub level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HostStatus {
    pub version: String,
    pub state: String,
    pub routes: usize,
    pub open_routes: usize,
}

pub struct HostClient {
    client: Client,
    host_url: String,
}

impl HostClient {
    pub fn new(host_url: &str) -> Self {
        Self {
            client: Client::builder().no_proxy().build().unwrap_or_default(),
            host_url: host_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send a GET to `path` with the key placed as requested.
    pub async fn get(&self, path: &str, key: &KeyPlacement) -> Result<Response, reqwest::Error> {
        let mut request = self.client.get(format!("{}{}", self.host_url, path));
        match key {
            KeyPlacement::None => {}
            KeyPlacement::Header(k) => request = request.header("x-functions-key", k),
            KeyPlacement::Query(k) => request = request.query(&[("code", k)]),
            KeyPlacement::Both { header, query } => {
                request = request
                    .header("x-functions-key", header)
                    .query(&[("code", query)]);
            }
        }
        request.send().await
    }

    /// Invoke a function route. Returns `Ok(None)` when the host answers 401.
    pub async fn invoke(
        &self,
        path: &str,
        key: &KeyPlacement,
    ) -> Result<Option<InvocationResponse>, Box<dyn std::error::Error>> {
        let resp = self.get(path, key).await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Host returned error status {}: {}", status, text).into());
        }
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Fetch host status with the master key.
    pub async fn status(&self, master_key: &str) -> Result<HostStatus, Box<dyn std::error::Error>> {
        let resp = self
            .get("/admin/host/status", &KeyPlacement::Header(master_key.to_string()))
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(format!("Host returned error status {}: {}", status, text).into());
        }
        Ok(serde_json::from_str(&text)?)
    }
}
