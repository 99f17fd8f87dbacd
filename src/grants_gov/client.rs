use crate::config::GrantsGovConfig;
use crate::error::GrantDeskError;
use crate::utils::logging::with_pretty_json_debug;
use grantdesk_schema::{Search2Request, Search2Response};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use super::mapping::{AutofillGrant, SearchResults};
use super::{API_KEY_HEADER, UPSTREAM_BODY_PREVIEW_CHARS};

/// Client for the Grants.gov `search2` endpoint.
///
/// One outbound call per operation: no retry, no backoff. Each mode carries
/// its own whole-request timeout.
#[derive(Clone)]
pub struct GrantsGovClient {
    client: reqwest::Client,
    search_url: Url,
    cfg: Arc<GrantsGovConfig>,
}

impl GrantsGovClient {
    pub fn new(cfg: &GrantsGovConfig) -> Result<Self, GrantDeskError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .connect_timeout(cfg.connect_timeout());

        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            search_url: cfg.search_url(),
            cfg: Arc::new(cfg.clone()),
        })
    }

    /// Keyword search over posted opportunities, authenticated with the stored key.
    pub async fn search(
        &self,
        api_key: &str,
        keyword: &str,
        agency: Option<&str>,
        rows: u32,
    ) -> Result<SearchResults, GrantDeskError> {
        let body = Search2Request::keyword(keyword, agency, rows);
        let resp = self
            .post_search2(&body, Some(api_key), self.cfg.search_timeout())
            .await?;
        let hits = resp.into_hits();
        Ok(SearchResults::from_hits(&hits, &self.cfg))
    }

    /// Exact lookup by opportunity number; first hit only.
    ///
    /// Sent without the API key, unlike keyword search.
    pub async fn lookup(&self, opportunity_number: &str) -> Result<AutofillGrant, GrantDeskError> {
        let body = Search2Request::opportunity_number(opportunity_number);
        let resp = self
            .post_search2(&body, None, self.cfg.lookup_timeout())
            .await?;

        resp.into_hits()
            .first()
            .map(|hit| AutofillGrant::from_hit(hit, opportunity_number))
            .ok_or_else(|| {
                GrantDeskError::NotFound(format!(
                    "opportunity {opportunity_number} on Grants.gov"
                ))
            })
    }

    async fn post_search2(
        &self,
        body: &Search2Request,
        api_key: Option<&str>,
        timeout: Duration,
    ) -> Result<Search2Response, GrantDeskError> {
        let mut req = self
            .client
            .post(self.search_url.clone())
            .timeout(timeout)
            .json(body);
        if let Some(key) = api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let start = Instant::now();
        let resp = req.send().await?;
        let status = resp.status();
        info!(
            status = status.as_u16(),
            authenticated = api_key.is_some(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "[GrantsGov] POST search2"
        );

        if !status.is_success() {
            let raw_body = match resp.text().await {
                Ok(text) => format!("{:.len$}", text, len = UPSTREAM_BODY_PREVIEW_CHARS),
                Err(e) => format!("<failed to read body: {e}>"),
            };
            return Err(GrantDeskError::UpstreamStatus {
                status,
                body: raw_body,
            });
        }

        let bytes = resp.bytes().await?;
        let parsed: Search2Response = serde_json::from_slice(&bytes)
            .map_err(|e| GrantDeskError::UpstreamPayload(e.to_string()))?;

        with_pretty_json_debug(&parsed, |pretty| {
            debug!(body = %pretty, "[GrantsGov] search2 response");
        });

        if parsed.is_error() {
            return Err(GrantDeskError::UpstreamRejected {
                code: parsed.errorcode.unwrap_or_default(),
                message: parsed.msg.unwrap_or_default(),
            });
        }
        Ok(parsed)
    }
}
