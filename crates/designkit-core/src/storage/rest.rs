//! REST gateway talking to the designs API.

use super::{BoxFuture, DesignDraft, DesignGateway, DesignRecord, GatewayError, GatewayResult};
use reqwest::{Method, RequestBuilder};
use serde_json::{Value, json};

const DESIGNS_PATH: &str = "/api/designs";

/// Gateway backed by the HTTP designs API (`/api/designs`).
#[derive(Debug, Clone)]
pub struct RestGateway {
    http: reqwest::Client,
    base_url: String,
}

impl RestGateway {
    /// Create a gateway for the API served at `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a gateway using a preconfigured client.
    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        let url = format!("{}{}{}", self.base_url, DESIGNS_PATH, path);
        self.http.request(method, url).bearer_auth(token)
    }

    async fn send(&self, request: RequestBuilder) -> GatewayResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let error = remote_error(status.as_u16(), &body);
            log::error!("Designs API request failed: {}", error);
            return Err(error);
        }
        Ok(body)
    }
}

/// Turn a non-2xx response body into a gateway error, preferring the
/// `message` (or `error`) field of a JSON body.
fn remote_error(status: u16, body: &str) -> GatewayError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| format!("Request failed with status {}", status));
    if status == 404 {
        return GatewayError::NotFound(message);
    }
    GatewayError::Remote { status, message }
}

fn require_token(token: &str) -> GatewayResult<()> {
    if token.is_empty() {
        return Err(GatewayError::MissingToken);
    }
    Ok(())
}

impl DesignGateway for RestGateway {
    fn list(&self, token: &str) -> BoxFuture<'_, GatewayResult<Vec<DesignRecord>>> {
        let token = token.to_string();
        Box::pin(async move {
            require_token(&token)?;
            let body = self.send(self.request(Method::GET, "", &token)).await?;
            Ok(serde_json::from_str(&body)?)
        })
    }

    fn create(&self, token: &str, draft: &DesignDraft) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let token = token.to_string();
        let draft = draft.clone();
        Box::pin(async move {
            require_token(&token)?;
            let request = self.request(Method::POST, "", &token).json(&draft);
            let body = self.send(request).await?;
            let record: DesignRecord = serde_json::from_str(&body)?;
            log::info!("Created design {} ({})", record.id, record.title);
            Ok(record)
        })
    }

    fn update(
        &self,
        token: &str,
        id: &str,
        draft: &DesignDraft,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let token = token.to_string();
        let path = format!("/{}", id);
        let draft = draft.clone();
        Box::pin(async move {
            require_token(&token)?;
            let request = self.request(Method::PUT, &path, &token).json(&draft);
            let body = self.send(request).await?;
            let record: DesignRecord = serde_json::from_str(&body)?;
            log::info!("Updated design {}", record.id);
            Ok(record)
        })
    }

    fn add_collaborator(
        &self,
        token: &str,
        id: &str,
        email: &str,
    ) -> BoxFuture<'_, GatewayResult<DesignRecord>> {
        let token = token.to_string();
        let path = format!("/{}/collaborators", id);
        let body = json!({ "email": email });
        Box::pin(async move {
            require_token(&token)?;
            let request = self.request(Method::POST, &path, &token).json(&body);
            let body = self.send(request).await?;
            Ok(serde_json::from_str(&body)?)
        })
    }
}
