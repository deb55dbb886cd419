use crate::api::schema::{
    CommandReply, DashboardSnapshot, ProxyUpload, ResultsBatch, SaveRequest, SearchRequest,
};
use crate::error::{Error, Result};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Typed access to the control panel backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("{} cannot be used as a base URL", base_url)));
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn states(&self) -> Result<Vec<String>> {
        let url = self.endpoint(&["states"])?;
        log::debug!("GET {}", url);
        let res = self.client.get(url).send().await?;
        Self::decode_success(res, "states").await
    }

    pub async fn cities(&self, state: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&["cities", state])?;
        log::debug!("GET {}", url);
        let res = self.client.get(url).send().await?;
        Self::decode_success(res, "cities").await
    }

    pub async fn load_proxies(&self, proxies: &str) -> Result<CommandReply> {
        let body = ProxyUpload {
            proxies: proxies.to_string(),
        };
        self.command("load_proxies", Some(&body)).await
    }

    pub async fn test_proxies(&self) -> Result<CommandReply> {
        self.command::<()>("test_proxies", None).await
    }

    pub async fn start_search(&self, request: &SearchRequest) -> Result<CommandReply> {
        self.command("start_search", Some(request)).await
    }

    pub async fn pause_search(&self) -> Result<CommandReply> {
        self.command::<()>("pause_search", None).await
    }

    pub async fn stop_search(&self) -> Result<CommandReply> {
        self.command::<()>("stop_search", None).await
    }

    /// Requests the server-side CSV export. Returns the raw file body.
    pub async fn save_results(&self, fields: &[String]) -> Result<Vec<u8>> {
        let url = self.endpoint(&["save_results"])?;
        let body = SaveRequest {
            fields: fields.to_vec(),
        };
        log::debug!("POST {} ({} fields)", url, fields.len());
        let res = self.client.post(url).json(&body).send().await?;

        let status = res.status();
        if !status.is_success() {
            let bytes = res.bytes().await?;
            return Err(match serde_json::from_slice::<CommandReply>(&bytes) {
                Ok(CommandReply {
                    error: Some(err), ..
                }) => Error::Server(err),
                _ => Error::Status {
                    endpoint: "save_results".into(),
                    status,
                },
            });
        }

        Ok(res.bytes().await?.to_vec())
    }

    pub async fn get_results(&self) -> Result<ResultsBatch> {
        let url = self.endpoint(&["get_results"])?;
        let res = self.client.get(url).send().await?;
        Self::decode_success(res, "get_results").await
    }

    pub async fn dashboard(&self) -> Result<DashboardSnapshot> {
        let url = self.endpoint(&["dashboard"])?;
        let res = self.client.get(url).send().await?;
        Self::decode_success(res, "dashboard").await
    }

    async fn command<B: Serialize + ?Sized>(
        &self,
        name: &str,
        body: Option<&B>,
    ) -> Result<CommandReply> {
        let url = self.endpoint(&[name])?;
        log::debug!("POST {}", url);

        let mut req = self.client.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let res = req.send().await?;
        let status = res.status();
        let bytes = res.bytes().await?;

        // Business errors may arrive with a 4xx/5xx status and a JSON body.
        // Any other failed status is not a reply, whatever the body says.
        match serde_json::from_slice::<CommandReply>(&bytes) {
            Ok(reply) if status.is_success() || reply.error.is_some() => Ok(reply),
            Err(e) if status.is_success() => Err(e.into()),
            _ => Err(Error::Status {
                endpoint: name.to_string(),
                status,
            }),
        }
    }

    async fn decode_success<T: DeserializeOwned>(res: Response, endpoint: &str) -> Result<T> {
        let status = res.status();
        if !status.is_success() {
            return Err(Error::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }
        let bytes = res.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
