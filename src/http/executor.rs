use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder, Url};
use tokio::time::Instant;
use tracing::debug;

use crate::args::HttpMethod;
use crate::error::{AppError, AppResult, HttpError};
use crate::metrics::{OutcomeStatus, RequestOutcome};
use crate::payload::Payload;

/// Sends one request and reports how it went. Implementations never fail:
/// transport problems are encoded in the returned outcome.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn send(&self, method: HttpMethod, payload: Payload) -> RequestOutcome;
}

pub struct HttpExecutor {
    client: Client,
    url: Url,
    timeout: Duration,
}

struct Exchange {
    status: u16,
    bytes_received: u64,
}

struct TransportFailure {
    source: reqwest::Error,
    request_sent: bool,
    bytes_received: u64,
}

impl HttpExecutor {
    /// # Errors
    ///
    /// Returns an error when `url` does not parse.
    pub fn new(client: Client, url: &str, timeout: Duration) -> AppResult<Self> {
        let url = Url::parse(url).map_err(|err| {
            AppError::http(HttpError::InvalidUrl {
                url: url.to_owned(),
                source: err,
            })
        })?;
        Ok(Self {
            client,
            url,
            timeout,
        })
    }

    fn timeout_outcome(&self) -> RequestOutcome {
        RequestOutcome::new(OutcomeStatus::Timeout, duration_ms(self.timeout), 0, 0)
    }
}

#[async_trait]
impl RequestExecutor for HttpExecutor {
    async fn send(&self, method: HttpMethod, payload: Payload) -> RequestOutcome {
        let bytes_sent = payload.len();
        let mut request = self.client.request(method.into(), self.url.clone());
        if let Some(content_type) = payload.content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        if !payload.is_empty() {
            request = request.body(payload.body);
        }

        let start = Instant::now();
        match tokio::time::timeout(self.timeout, exchange(request)).await {
            Ok(Ok(exchange)) => RequestOutcome::new(
                OutcomeStatus::Code(exchange.status),
                duration_ms(start.elapsed()),
                bytes_sent,
                exchange.bytes_received,
            ),
            Ok(Err(failure)) if failure.source.is_timeout() => {
                debug!("Request timed out: {}", failure.source);
                self.timeout_outcome()
            }
            Ok(Err(failure)) => {
                debug!("Request failed: {}", failure.source);
                let sent = if failure.request_sent { bytes_sent } else { 0 };
                RequestOutcome::new(
                    OutcomeStatus::Error,
                    duration_ms(start.elapsed()),
                    sent,
                    failure.bytes_received,
                )
            }
            Err(_elapsed) => {
                debug!("Request exceeded {}ms timeout", self.timeout.as_millis());
                self.timeout_outcome()
            }
        }
    }
}

async fn exchange(request: RequestBuilder) -> Result<Exchange, TransportFailure> {
    let response = request.send().await.map_err(|err| TransportFailure {
        source: err,
        request_sent: false,
        bytes_received: 0,
    })?;
    let status = response.status().as_u16();

    let mut stream = response.bytes_stream();
    let mut bytes_received: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk.map_err(|err| TransportFailure {
            source: err,
            request_sent: true,
            bytes_received,
        })?;
        bytes_received =
            bytes_received.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }

    Ok(Exchange {
        status,
        bytes_received,
    })
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}
