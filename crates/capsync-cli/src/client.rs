use async_trait::async_trait;
use capsync_core::{CreatedPolicy, RemoteLister, RemotePolicy, RemoteWriter, TransportError};
use serde::Deserialize;
use serde_json::Value;

const POLICIES_PATH: &str = "identity/conditionalAccess/policies";

/// Minimal Microsoft Graph client for the conditional access policy collection.
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

/// One page of a Graph collection response.
#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    value: Vec<RemotePolicy>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

impl GraphClient {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token,
        }
    }

    fn policies_url(&self) -> String {
        format!("{}/{}", self.base_url, POLICIES_PATH)
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.header("Accept", "application/json")
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<String, TransportError> {
        let resp = req
            .send()
            .await
            .map_err(|e| TransportError::connect(e.to_string()))?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), graph_error_message(&body)));
        }
        Ok(body)
    }
}

/// Graph reports failures as `{"error":{"code":..,"message":..}}`; anything
/// else is passed on verbatim.
fn graph_error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<Value>(body)
        && let Some(error) = json.get("error")
    {
        let code = error.get("code").and_then(|v| v.as_str());
        let message = error.get("message").and_then(|v| v.as_str());
        match (code, message) {
            (Some(code), Some(message)) => return format!("{code}: {message}"),
            (None, Some(message)) => return message.to_string(),
            (Some(code), None) => return code.to_string(),
            (None, None) => {}
        }
    }
    body.to_string()
}

#[async_trait]
impl RemoteLister for GraphClient {
    async fn list_all_policies(&self) -> Result<Vec<RemotePolicy>, TransportError> {
        let mut policies = Vec::new();
        let mut url = self.policies_url();
        loop {
            let body = self.send(self.request(reqwest::Method::GET, &url)).await?;
            let page: Page = serde_json::from_str(&body)
                .map_err(|e| TransportError::decode(format!("policy listing: {e}")))?;
            tracing::debug!(count = page.value.len(), "Fetched policy page");
            policies.extend(page.value);
            match page.next_link {
                Some(next) => url = next,
                None => break,
            }
        }
        Ok(policies)
    }
}

#[async_trait]
impl RemoteWriter for GraphClient {
    async fn create_policy(&self, body: &str) -> Result<CreatedPolicy, TransportError> {
        let req = self
            .request(reqwest::Method::POST, &self.policies_url())
            .header("Content-Type", "application/json")
            .body(body.to_string());
        let resp = self.send(req).await?;
        serde_json::from_str(&resp)
            .map_err(|e| TransportError::decode(format!("create response: {e}")))
    }

    async fn update_policy(&self, id: &str, body: &str) -> Result<(), TransportError> {
        let url = format!("{}/{}", self.policies_url(), id);
        let req = self
            .request(reqwest::Method::PATCH, &url)
            .header("Content-Type", "application/json")
            .body(body.to_string());
        self.send(req).await?;
        Ok(())
    }
}
