use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecureActionRequest {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptResponse {
    pub encrypted_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptResponse {
    pub decrypted_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedUrlResponse {
    pub signed_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlValidationResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub file_path: Option<String>,
}

pub struct GatewayClient {
    client: Client,
    gateway_url: String,
    token: Option<String>,
}

impl GatewayClient {
    pub fn new(gateway_url: &str) -> Self {
        Self {
            client: Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attach a bearer token used for all protected routes.
    pub fn with_token(gateway_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            token: Some(token.to_string()),
        }
    }

    /// Check gateway liveness.
    pub async fn health(&self) -> Result<Value, Box<dyn std::error::Error>> {
        let resp = self
            .client
            .get(format!("{}/health", self.gateway_url))
            .send()
            .await?;
        parse_json(resp).await
    }

    /// Encrypt a plaintext string, returning hex-encoded ciphertext.
    pub async fn encrypt(&self, data: &str) -> Result<String, Box<dyn std::error::Error>> {
        let body = self
            .send_action(SecureActionRequest {
                action: "encrypt".to_string(),
                data: Some(data.to_string()),
                file_path: None,
                expiry_minutes: None,
            })
            .await?;
        let parsed: EncryptResponse = serde_json::from_str(&body)?;
        Ok(parsed.encrypted_data)
    }

    /// Decrypt hex-encoded ciphertext back to the original plaintext.
    pub async fn decrypt(&self, data: &str) -> Result<String, Box<dyn std::error::Error>> {
        let body = self
            .send_action(SecureActionRequest {
                action: "decrypt".to_string(),
                data: Some(data.to_string()),
                file_path: None,
                expiry_minutes: None,
            })
            .await?;
        let parsed: DecryptResponse = serde_json::from_str(&body)?;
        Ok(parsed.decrypted_data)
    }

    /// Issue a signed URL granting time-limited access to a stored file.
    pub async fn sign_url(
        &self,
        file_path: &str,
        expiry_minutes: i64,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let body = self
            .send_action(SecureActionRequest {
                action: "signUrl".to_string(),
                data: None,
                file_path: Some(file_path.to_string()),
                expiry_minutes: Some(expiry_minutes),
            })
            .await?;
        let parsed: SignedUrlResponse = serde_json::from_str(&body)?;
        Ok(parsed.signed_url)
    }

    /// Validate a signed URL token without fetching the file.
    pub async fn validate_url(
        &self,
        token: &str,
    ) -> Result<UrlValidationResponse, Box<dyn std::error::Error>> {
        let body = self
            .send_action(SecureActionRequest {
                action: "validateUrl".to_string(),
                data: Some(token.to_string()),
                file_path: None,
                expiry_minutes: None,
            })
            .await?;
        let parsed: UrlValidationResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }

    /// Record a custom audit event.
    pub async fn record_audit(
        &self,
        action: &str,
        metadata: Value,
    ) -> Result<Value, Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .post(format!("{}/audit-log", self.gateway_url))
            .json(&serde_json::json!({ "action": action, "metadata": metadata }));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        parse_json(req.send().await?).await
    }

    /// Fetch a file through a previously issued signed URL token.
    ///
    /// Returns the raw response so callers can inspect headers and
    /// stream the body.
    pub async fn get_file(&self, token: &str) -> Result<Response, reqwest::Error> {
        let mut req = self.client.get(format!(
            "{}/secure-file-access?token={}",
            self.gateway_url, token
        ));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req.send().await
    }

    async fn send_action(
        &self,
        request: SecureActionRequest,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut req = self
            .client
            .post(format!("{}/secure-encrypt", self.gateway_url))
            .json(&request);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            return Err(format!("Gateway returned error status {}: {}", status, text).into());
        }

        Ok(text)
    }
}

async fn parse_json(resp: Response) -> Result<Value, Box<dyn std::error::Error>> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(format!("Gateway returned error status {}: {}", status, text).into());
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(e.into()),
    }
}
