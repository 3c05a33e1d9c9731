use crate::config::ApiConfig;
use crate::powerdns::types::*;
use crate::powerdns::{PdnsError, ZoneApi};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use tracing::debug;

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: String, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.api_root(), &config.api_key, &config.server_id)
    }

    fn auth_header(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    /// `{base}/servers/{server_id}/{segments...}`, each segment percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<Url, PdnsError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| PdnsError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| PdnsError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["servers", self.server_id.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, op: &'static str, req: RequestBuilder) -> Result<Response, PdnsError> {
        let res = self.auth_header(req).send().await?;
        let status = res.status();
        debug!(op, %status, "PowerDNS responded");
        if status == StatusCode::NOT_FOUND {
            return Err(PdnsError::NotFound(op));
        }
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(PdnsError::Status { op, status, body });
        }
        Ok(res)
    }
}

#[async_trait]
impl ZoneApi for PowerDnsClient {
    async fn list_zones(&self, zone: &str) -> Result<Vec<PdnsZoneSummary>, PdnsError> {
        let req = self.http.get(self.url(&["zones"])?).query(&[("zone", zone)]);
        let res = self.send("list_zones", req).await?;
        Ok(res.json::<Vec<PdnsZoneSummary>>().await?)
    }

    async fn list_zone(&self, zone_id: &str) -> Result<PdnsZone, PdnsError> {
        let url = self.url(&["zones", zone_id])?;
        let res = self.send("list_zone", self.http.get(url)).await?;
        Ok(res.json::<PdnsZone>().await?)
    }

    async fn create_zone(&self, z: &PdnsZoneCreate) -> Result<PdnsZoneSummary, PdnsError> {
        let req = self
            .http
            .post(self.url(&["zones"])?)
            .query(&[("rrsets", "false")])
            .json(z);
        let res = self.send("create_zone", req).await?;
        Ok(res.json::<PdnsZoneSummary>().await?)
    }

    async fn put_zone(&self, zone_id: &str, patch: &PdnsZonePatch) -> Result<(), PdnsError> {
        let url = self.url(&["zones", zone_id])?;
        self.send("put_zone", self.http.put(url).json(patch)).await?;
        Ok(())
    }

    async fn delete_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        let url = self.url(&["zones", zone_id])?;
        self.send("delete_zone", self.http.delete(url)).await?;
        Ok(())
    }

    async fn notify_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        let url = self.url(&["zones", zone_id, "notify"])?;
        self.send("notify_zone", self.http.put(url)).await?;
        Ok(())
    }

    async fn axfr_retrieve_zone(&self, zone_id: &str) -> Result<(), PdnsError> {
        let url = self.url(&["zones", zone_id, "axfr-retrieve"])?;
        self.send("axfr_retrieve_zone", self.http.put(url)).await?;
        Ok(())
    }

    async fn list_metadata(&self, zone_id: &str) -> Result<Vec<PdnsMetadata>, PdnsError> {
        let url = self.url(&["zones", zone_id, "metadata"])?;
        let res = self.send("list_metadata", self.http.get(url)).await?;
        Ok(res.json::<Vec<PdnsMetadata>>().await?)
    }

    async fn modify_metadata(
        &self,
        zone_id: &str,
        kind: &str,
        metadata: &[String],
    ) -> Result<(), PdnsError> {
        #[derive(Serialize)]
        struct MetadataBody<'a> {
            kind: &'a str,
            metadata: &'a [String],
        }

        let url = self.url(&["zones", zone_id, "metadata", kind])?;
        let body = MetadataBody { kind, metadata };
        self.send("modify_metadata", self.http.put(url).json(&body))
            .await?;
        Ok(())
    }

    async fn delete_metadata(&self, zone_id: &str, kind: &str) -> Result<(), PdnsError> {
        let url = self.url(&["zones", zone_id, "metadata", kind])?;
        self.send("delete_metadata", self.http.delete(url)).await?;
        Ok(())
    }
}
