use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::Document;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; h10a_scraper)";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub url: String,
    /// Proxy URL prefixes; the percent-encoded target is appended to each.
    pub proxies: Vec<String>,
    /// Try the target without a proxy before any prefix.
    pub direct_first: bool,
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

/// What a successful fetch handed back.
#[derive(Debug)]
pub enum Payload {
    Html(String),
    /// The responder already did the extraction.
    Document(Box<Document>),
}

#[derive(Debug)]
pub struct Fetched {
    pub payload: Payload,
    /// Proxy prefix that worked, `None` for a direct fetch.
    pub via: Option<String>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error("HTTP {status} from {url}")]
    Status { status: StatusCode, url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unparsable JSON from {url}: {source}")]
    InvalidJson {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("no fetch candidates: direct fetch disabled and no proxies configured")]
    NoCandidates,
    #[error("all candidates failed (tried {}): {last}", .tried.join(", "))]
    Exhausted {
        tried: Vec<String>,
        #[source]
        last: Box<FetchError>,
    },
}

/// Ordered, de-duplicated proxy prefixes. `""` stands for a direct fetch.
pub fn candidates(settings: &FetchSettings, preferred: Option<&str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let direct = settings.direct_first.then_some("");
    let listed = settings.proxies.iter().map(String::as_str);
    for p in direct.into_iter().chain(preferred).chain(listed) {
        let p = p.trim();
        if p.is_empty() && !settings.direct_first {
            continue;
        }
        if !out.iter().any(|o| o == p) {
            out.push(p.to_string());
        }
    }
    out
}

pub fn target_url(url: &str, proxy: &str) -> String {
    if proxy.is_empty() {
        return url.to_string();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(url.as_bytes()).collect();
    format!("{}{}", proxy, encoded)
}

/// Fetch the page through each candidate in turn until one succeeds.
///
/// `preferred` is the proxy that worked last time; recording the winner for
/// next time is left to the caller.
pub async fn fetch(settings: &FetchSettings, preferred: Option<&str>) -> Result<Fetched, FetchError> {
    let client = reqwest::Client::builder()
        .timeout(settings.timeout)
        .user_agent(USER_AGENT)
        .build()?;

    let mut tried = Vec::new();
    let mut last = None;

    for proxy in candidates(settings, preferred) {
        let target = target_url(&settings.url, &proxy);
        let label = if proxy.is_empty() { "direct".to_string() } else { proxy.clone() };
        tried.push(label.clone());

        match fetch_with_retry(&client, &target, settings).await {
            Ok(payload) => {
                info!("Fetched {} via {}", settings.url, label);
                return Ok(Fetched {
                    payload,
                    via: (!proxy.is_empty()).then_some(proxy),
                });
            }
            Err(e) => {
                warn!("Fetch via {} failed: {}", label, e);
                last = Some(e);
            }
        }
    }

    match last {
        Some(e) => Err(FetchError::Exhausted {
            tried,
            last: Box::new(e),
        }),
        None => Err(FetchError::NoCandidates),
    }
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    target: &str,
    settings: &FetchSettings,
) -> Result<Payload, FetchError> {
    let mut attempt = 0;
    loop {
        match fetch_one(client, target).await {
            Err(FetchError::Status { status, .. })
                if is_retryable(status) && attempt < settings.max_retries =>
            {
                let backoff = settings.backoff * 2u32.pow(attempt);
                warn!(
                    "HTTP {} from {} (attempt {}/{}), backing off {:.1}s",
                    status,
                    target,
                    attempt + 1,
                    settings.max_retries,
                    backoff.as_secs_f64()
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

async fn fetch_one(client: &reqwest::Client, target: &str) -> Result<Payload, FetchError> {
    let response = client
        .get(target)
        .send()
        .await
        .map_err(|source| FetchError::Transport {
            url: target.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: target.to_string(),
        });
    }

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));

    let body = response.text().await.map_err(|source| FetchError::Transport {
        url: target.to_string(),
        source,
    })?;

    if is_json {
        let doc = serde_json::from_str(&body).map_err(|source| FetchError::InvalidJson {
            url: target.to_string(),
            source,
        })?;
        return Ok(Payload::Document(Box::new(doc)));
    }
    Ok(Payload::Html(body))
}
