use std::time::Duration;

use almanac_core::AlmanacError;
use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::de::DeserializeOwned;
use url::Url;

use crate::FinnhubConnector;

/// Finnhub REST root.
pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1/";

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, AlmanacError> {
    let mut s = raw.trim().to_string();
    if !s.ends_with('/') {
        s.push('/');
    }
    Url::parse(&s).map_err(|e| AlmanacError::InvalidArg(format!("invalid base url {raw}: {e}")))
}

pub(crate) fn default_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

fn retry_after_ms(resp: &reqwest::Response) -> Option<u64> {
    resp.headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1_000))
}

impl FinnhubConnector {
    /// GET `path` with `query` plus the API token and decode the JSON body.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AlmanacError> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| AlmanacError::InvalidArg(format!("invalid path {path}: {e}")))?;
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("token", &self.api_key);

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AlmanacError::connector(Self::KEY.as_str(), e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AlmanacError::RateLimited {
                provider: Self::KEY.as_str().to_string(),
                retry_after_ms: retry_after_ms(&resp),
            });
        }
        if !status.is_success() {
            return Err(AlmanacError::connector(
                Self::KEY.as_str(),
                format!("GET {path}: HTTP {status}"),
            ));
        }
        resp.json::<T>()
            .await
            .map_err(|e| AlmanacError::Data(format!("finnhub {path}: {e}")))
    }
}
