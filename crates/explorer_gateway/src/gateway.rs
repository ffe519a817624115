use std::time::Duration;

use serde_json::Value;

use crate::credentials::CredentialContext;
use crate::fault::Fault;

/// Header carrying the anti-forgery token on every outbound call.
pub const TOKEN_HEADER: &str = "X-CSRF-Token";

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMethod {
    Get,
    Post,
}

/// Single chokepoint for outbound remote-procedure calls.
///
/// Every call attaches the resolved anti-forgery token, routes through the
/// platform's `/api/method/{op}` convention and normalizes the outcome:
/// non-2xx, transport failures and `exc`-tagged payloads all surface as a
/// typed [`Fault`], never as an unwound error.
#[derive(Debug, Clone)]
pub struct RemoteApiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
    credentials: CredentialContext,
}

impl RemoteApiGateway {
    pub fn new(config: GatewayConfig, credentials: CredentialContext) -> Result<Self, Fault> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| Fault::Transport(err.to_string()))?;
        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    pub fn credentials(&self) -> &CredentialContext {
        &self.credentials
    }

    fn method_url(&self, op: &str) -> String {
        format!(
            "{}/api/method/{op}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Issues one call and returns the payload with the platform's
    /// `message` envelope already unwrapped.
    pub async fn call(
        &self,
        op: &str,
        method: CallMethod,
        fields: &[(&str, String)],
    ) -> Result<Value, Fault> {
        let url = self.method_url(op);
        let request = match method {
            CallMethod::Get => self.client.get(&url).query(fields),
            CallMethod::Post => self.client.post(&url).form(fields),
        };

        let response = request
            .header(TOKEN_HEADER, self.credentials.resolve_token())
            .send()
            .await
            .map_err(|err| Fault::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Fault::Http {
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| Fault::Transport(err.to_string()))?;
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|err| Fault::Application(format!("invalid payload: {err}")))?;

        if let Some(exc) = payload.get("exc") {
            let text = exc.as_str().map(ToOwned::to_owned).unwrap_or_else(|| exc.to_string());
            return Err(Fault::Application(text));
        }

        Ok(payload.get("message").cloned().unwrap_or(payload))
    }
}
