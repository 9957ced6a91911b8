use super::{CloudBackend, RemoteStore};
use async_trait::async_trait;
use aurora_common::{
    AuroraError, CloudflareKvCredentials, Result, VercelKvCredentials, endpoints, timeouts,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

fn transport_error(err: reqwest::Error) -> AuroraError {
    AuroraError::sync(err.to_string())
}

#[derive(Debug, Clone)]
enum Target {
    Cloudflare { values_url: String, token: String },
    Vercel { url: String, token: String },
}

/// RemoteStore over the Cloudflare Workers KV or Vercel KV REST APIs
#[derive(Debug, Clone)]
pub struct HttpKvStore {
    client: Client,
    target: Target,
}

#[derive(Debug, Deserialize)]
struct CloudflareWriteResponse {
    #[serde(default)]
    success: bool,
}

#[derive(Debug, Deserialize)]
struct VercelResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl HttpKvStore {
    fn build_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeouts::DEFAULT_HTTP_TIMEOUT))
            .build()
            .map_err(transport_error)
    }

    /// Store for the configured backend, `None` when sync is disabled
    pub fn from_backend(backend: &CloudBackend) -> Result<Option<Self>> {
        match backend {
            CloudBackend::Cloudflare(creds) => Self::cloudflare(creds).map(Some),
            CloudBackend::Vercel(creds) => Self::vercel(creds).map(Some),
            CloudBackend::Disabled => Ok(None),
        }
    }

    pub fn cloudflare(creds: &CloudflareKvCredentials) -> Result<Self> {
        Self::cloudflare_with_base(creds, endpoints::CLOUDFLARE_API_BASE)
    }

    /// Cloudflare store against a different API root
    pub fn cloudflare_with_base(creds: &CloudflareKvCredentials, api_base: &str) -> Result<Self> {
        let values_url = format!(
            "{}/accounts/{}/storage/kv/namespaces/{}/values",
            api_base.trim_end_matches('/'),
            creds.account_id,
            creds.namespace_id
        );
        Ok(Self {
            client: Self::build_client()?,
            target: Target::Cloudflare {
                values_url,
                token: creds.api_token.clone(),
            },
        })
    }

    pub fn vercel(creds: &VercelKvCredentials) -> Result<Self> {
        let base = creds.url.trim();
        let base = base.strip_suffix('/').unwrap_or(base);
        Ok(Self {
            client: Self::build_client()?,
            target: Target::Vercel {
                url: format!("{}/", base),
                token: creds.token.clone(),
            },
        })
    }

    async fn vercel_command(&self, url: &str, token: &str, command: Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .body(command.to_string())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AuroraError::sync(format!(
                "Vercel KV Error ({}): {}",
                status.as_u16(),
                text
            )));
        }

        let body: VercelResponse = response.json().await.map_err(transport_error)?;
        if let Some(error) = body.error {
            return Err(AuroraError::sync(format!("Vercel KV Command Error: {}", error)));
        }
        Ok(body.result)
    }
}

#[async_trait]
impl RemoteStore for HttpKvStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        match &self.target {
            Target::Cloudflare { values_url, token } => {
                let response = self
                    .client
                    .get(format!("{}/{}", values_url, key))
                    .bearer_auth(token)
                    .send()
                    .await
                    .map_err(transport_error)?;

                let status = response.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(AuroraError::sync(format!(
                        "Cloudflare GET Error ({}): {}",
                        status.as_u16(),
                        text
                    )));
                }
                let value: Value = response.json().await.map_err(transport_error)?;
                Ok(Some(value))
            }
            Target::Vercel { url, token } => {
                let result = self.vercel_command(url, token, json!(["GET", key])).await?;
                Ok(match result {
                    Value::Null => None,
                    Value::String(s) if s.is_empty() => None,
                    // Values are stored as JSON text; anything unparsable comes back verbatim
                    Value::String(s) => Some(serde_json::from_str(&s).unwrap_or(Value::String(s))),
                    other => Some(other),
                })
            }
        }
    }

    async fn set(&self, key: &str, value: &Value) -> Result<()> {
        match &self.target {
            Target::Cloudflare { values_url, token } => {
                let response = self
                    .client
                    .put(format!("{}/{}", values_url, key))
                    .bearer_auth(token)
                    .json(value)
                    .send()
                    .await
                    .map_err(transport_error)?;

                let status = response.status();
                if !status.is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(AuroraError::sync(format!(
                        "Cloudflare SET Error ({}): {}",
                        status.as_u16(),
                        text
                    )));
                }
                let body: CloudflareWriteResponse =
                    response.json().await.map_err(transport_error)?;
                if !body.success {
                    return Err(AuroraError::sync(format!("Cloudflare SET rejected for {}", key)));
                }
                Ok(())
            }
            Target::Vercel { url, token } => {
                self.vercel_command(url, token, json!(["SET", key, value.to_string()]))
                    .await?;
                Ok(())
            }
        }
    }

    fn name(&self) -> &str {
        match self.target {
            Target::Cloudflare { .. } => "cloudflare",
            Target::Vercel { .. } => "vercel",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cf_creds() -> CloudflareKvCredentials {
        CloudflareKvCredentials {
            account_id: "acct".to_string(),
            namespace_id: "ns".to_string(),
            api_token: "cf-token".to_string(),
        }
    }

    const CF_VALUE_PATH: &str = "/accounts/acct/storage/kv/namespaces/ns/values/aurora_data_v1";

    #[tokio::test]
    async fn test_cloudflare_get_and_missing_key() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CF_VALUE_PATH))
            .and(header("authorization", "Bearer cf-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "dev-1"}])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/accounts/acct/storage/kv/namespaces/ns/values/aurora_engines_v1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("key not found"))
            .mount(&server)
            .await;

        let store = HttpKvStore::cloudflare_with_base(&cf_creds(), &server.uri())?;
        assert_eq!(
            store.get("aurora_data_v1").await?,
            Some(json!([{"id": "dev-1"}]))
        );
        assert_eq!(store.get("aurora_engines_v1").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_cloudflare_errors() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(CF_VALUE_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CF_VALUE_PATH))
            .and(body_json(json!([])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
            .mount(&server)
            .await;

        let store = HttpKvStore::cloudflare_with_base(&cf_creds(), &server.uri())?;
        let err = store.get("aurora_data_v1").await.unwrap_err();
        assert_eq!(err.message(), "Cloudflare GET Error (403): forbidden");
        assert!(store.set("aurora_data_v1", &json!([])).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_vercel_commands() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("authorization", "Bearer v-token"))
            .and(body_json(json!(["GET", "aurora_settings_v1"])))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": "{\"appName\":\"Cloud\"}"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(json!(["GET", "aurora_data_v1"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": null})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(json!(["SET", "aurora_engines_v1", "[1,2]"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "OK"})))
            .expect(1)
            .mount(&server)
            .await;

        let store = HttpKvStore::vercel(&VercelKvCredentials {
            url: format!("{}/", server.uri()),
            token: "v-token".to_string(),
        })?;

        assert_eq!(
            store.get("aurora_settings_v1").await?,
            Some(json!({"appName": "Cloud"}))
        );
        assert_eq!(store.get("aurora_data_v1").await?, None);
        store.set("aurora_engines_v1", &json!([1, 2])).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_vercel_command_error() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "WRONGTYPE"})))
            .mount(&server)
            .await;

        let store = HttpKvStore::vercel(&VercelKvCredentials {
            url: server.uri(),
            token: "v-token".to_string(),
        })?;
        let err = store.get("aurora_data_v1").await.unwrap_err();
        assert_eq!(err.message(), "Vercel KV Command Error: WRONGTYPE");
        Ok(())
    }
}
