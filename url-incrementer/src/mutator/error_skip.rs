//! Skipping URLs that answer with an error status.
//!
//! After each step the new URL is checked with a `HEAD` request. While the
//! status is in the instance's [`ErrorCodeSet`] and budget remains, the action
//! is applied again. The loop ends on a non-error status, on a transport
//! failure, or when the budget runs out.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use super::Mutation;
use crate::errors::{MutationError, ProbeError};
use crate::events::{event_types, EventSink};
use crate::instance::{Action, Instance};
use crate::navigate;

/// Redirect statuses a custom code list may name.
const REDIRECT_CODES: [u16; 5] = [301, 302, 303, 307, 308];

/// A class of statuses treated as errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// 404 Not Found.
    #[serde(rename = "404")]
    NotFound,
    /// Any 3xx status or a redirected response.
    #[serde(rename = "3XX")]
    Redirection,
    /// Any 4xx status.
    #[serde(rename = "4XX")]
    ClientError,
    /// Any 5xx status.
    #[serde(rename = "5XX")]
    ServerError,
    /// The exact statuses in [`ErrorCodeSet::custom`].
    #[serde(rename = "CUS")]
    Custom,
}

/// The statuses that make a URL skippable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCodeSet {
    /// Enabled status classes.
    #[serde(default)]
    pub codes: BTreeSet<ErrorCode>,
    /// Exact statuses, used when [`ErrorCode::Custom`] is enabled.
    #[serde(default)]
    pub custom: BTreeSet<u16>,
}

impl Default for ErrorCodeSet {
    fn default() -> Self {
        Self::new([ErrorCode::NotFound, ErrorCode::Redirection])
    }
}

impl ErrorCodeSet {
    /// Creates a set from status classes.
    #[must_use]
    pub fn new(codes: impl IntoIterator<Item = ErrorCode>) -> Self {
        Self {
            codes: codes.into_iter().collect(),
            custom: BTreeSet::new(),
        }
    }

    /// Adds exact statuses.
    #[must_use]
    pub fn with_custom(mut self, statuses: impl IntoIterator<Item = u16>) -> Self {
        self.custom.extend(statuses);
        self
    }

    /// Whether a response counts as an error.
    ///
    /// Followed redirects report the final status, so `redirected` stands in
    /// for the 3xx the client never saw.
    #[must_use]
    pub fn matches(&self, status: u16, redirected: bool) -> bool {
        let has = |code| self.codes.contains(&code);
        (has(ErrorCode::NotFound) && status == 404)
            || (has(ErrorCode::Redirection) && ((300..=399).contains(&status) || redirected))
            || (has(ErrorCode::ClientError) && (400..=499).contains(&status))
            || (has(ErrorCode::ServerError) && (500..=599).contains(&status))
            || (has(ErrorCode::Custom)
                && (self.custom.contains(&status)
                    || (redirected && REDIRECT_CODES.iter().any(|c| self.custom.contains(c)))))
    }
}

/// Status of a `HEAD` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResponse {
    /// Final status code.
    pub status: u16,
    /// Whether redirects were followed.
    pub redirected: bool,
}

impl ProbeResponse {
    /// A response that was not redirected.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self {
            status,
            redirected: false,
        }
    }
}

/// Issues existence checks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HeadProbe: Send + Sync {
    /// Sends a `HEAD` request to `url`.
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError>;
}

/// A URL passed over because of its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUrl {
    /// The skipped URL.
    pub url: String,
    /// Its status.
    pub status: u16,
    /// Whether it redirected.
    pub redirected: bool,
}

/// How the loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipOutcome {
    /// The final URL answered with a non-error status.
    Settled {
        /// The status.
        status: u16,
    },
    /// The final URL could not be checked.
    TransportFailed(ProbeError),
    /// The budget ran out while skipping; the final URL is unchecked.
    Exhausted,
    /// No budget was given; nothing was checked.
    Unchecked,
}

/// Result of an action with error skipping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSkipReport {
    /// The URL the instance ended on.
    pub final_url: String,
    /// The last mutation applied.
    pub mutation: Mutation,
    /// URLs passed over, in order.
    pub skipped: Vec<SkippedUrl>,
    /// How the loop ended.
    pub outcome: SkipOutcome,
}

/// Applies `action`, then keeps re-applying it while the new URL answers
/// with an error status and `budget` remains.
///
/// Each action goes through [`navigate::perform`], so precomputed lists are
/// stepped the same way as a plain action. A mutation failure is returned as
/// an error; the instance keeps the last URL that was reached.
pub async fn apply_with_error_skip(
    action: Action,
    instance: &mut Instance,
    budget: u32,
    probe: &dyn HeadProbe,
    sink: &dyn EventSink,
) -> Result<ErrorSkipReport, MutationError> {
    let mut remaining = budget;
    let mut skipped = Vec::new();

    let (mutation, outcome) = loop {
        let mutation = navigate::perform(action, instance)?;

        if remaining == 0 {
            if skipped.is_empty() {
                break (mutation, SkipOutcome::Unchecked);
            }
            info!(url = %mutation.url, skipped = skipped.len(), "Error skip budget exhausted");
            sink.emit(
                event_types::ERROR_SKIP_EXHAUSTED,
                Some(serde_json::json!({
                    "url": mutation.url,
                    "skipped": skipped.len(),
                })),
            )
            .await;
            break (mutation, SkipOutcome::Exhausted);
        }

        match probe.head(&mutation.url).await {
            Ok(response) if instance.error_codes.matches(response.status, response.redirected) => {
                debug!(
                    url = %mutation.url,
                    status = response.status,
                    redirected = response.redirected,
                    remaining,
                    "Skipping URL"
                );
                sink.emit(
                    event_types::ERROR_SKIP_SKIPPED,
                    Some(serde_json::json!({
                        "url": mutation.url,
                        "status": response.status,
                        "redirected": response.redirected,
                    })),
                )
                .await;
                skipped.push(SkippedUrl {
                    url: mutation.url,
                    status: response.status,
                    redirected: response.redirected,
                });
                remaining -= 1;
            }
            Ok(response) => {
                sink.emit(
                    event_types::ERROR_SKIP_SETTLED,
                    Some(serde_json::json!({
                        "url": mutation.url,
                        "status": response.status,
                    })),
                )
                .await;
                break (
                    mutation,
                    SkipOutcome::Settled {
                        status: response.status,
                    },
                );
            }
            Err(error) => {
                warn!(url = %mutation.url, %error, "Error skip check failed");
                sink.emit(
                    event_types::ERROR_SKIP_TRANSPORT_ERROR,
                    Some(serde_json::json!({
                        "url": mutation.url,
                        "error": error.to_dict(),
                    })),
                )
                .await;
                break (mutation, SkipOutcome::TransportFailed(error));
            }
        }
    };

    Ok(ErrorSkipReport {
        final_url: instance.url.clone(),
        mutation,
        skipped,
        outcome,
    })
}

/// Configuration for [`ReqwestProbe`].
#[cfg(feature = "http-probe")]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_probe_timeout")]
    pub timeout_seconds: f64,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

#[cfg(feature = "http-probe")]
fn default_probe_timeout() -> f64 {
    10.0
}

#[cfg(feature = "http-probe")]
fn default_max_redirects() -> usize {
    10
}

#[cfg(feature = "http-probe")]
impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_probe_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

#[cfg(feature = "http-probe")]
impl ProbeConfig {
    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// Gets timeout as Duration. Fails unless the timeout is finite and
    /// positive.
    pub fn timeout(&self) -> Result<std::time::Duration, ProbeError> {
        let invalid = || {
            ProbeError::InvalidConfig(format!(
                "timeout_seconds must be positive and finite, got {}",
                self.timeout_seconds
            ))
        };
        if self.timeout_seconds <= 0.0 {
            return Err(invalid());
        }
        std::time::Duration::try_from_secs_f64(self.timeout_seconds).map_err(|_| invalid())
    }
}

/// [`HeadProbe`] backed by `reqwest`.
#[cfg(feature = "http-probe")]
#[derive(Debug, Clone)]
pub struct ReqwestProbe {
    client: reqwest::Client,
}

#[cfg(feature = "http-probe")]
impl ReqwestProbe {
    /// Creates a probe.
    pub fn new(config: &ProbeConfig) -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout()?)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ProbeError::InvalidConfig(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(feature = "http-probe")]
#[async_trait]
impl HeadProbe for ReqwestProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let response = self.client.head(url).send().await.map_err(|e| {
            if e.is_timeout() {
                ProbeError::Timeout(url.to_string())
            } else {
                ProbeError::transport(url, e.to_string())
            }
        })?;

        let requested = url::Url::parse(url).ok();
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            redirected: requested.as_ref() != Some(response.url()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CollectingEventSink;
    use crate::transform::TransformParams;
    use pretty_assertions::assert_eq;

    fn instance() -> Instance {
        Instance::with_selection("http://x.com/1", "1", 13, TransformParams::new(1))
    }

    #[test]
    fn test_error_code_classes() {
        let set = ErrorCodeSet::default();
        assert!(set.matches(404, false));
        assert!(set.matches(301, false));
        assert!(set.matches(200, true));
        assert!(!set.matches(200, false));
        assert!(!set.matches(500, false));

        let set = ErrorCodeSet::new([ErrorCode::ClientError, ErrorCode::ServerError]);
        assert!(set.matches(410, false));
        assert!(set.matches(503, false));
        assert!(!set.matches(302, true));
    }

    #[test]
    fn test_custom_codes() {
        let set = ErrorCodeSet::new([ErrorCode::Custom]).with_custom([204, 302]);
        assert!(set.matches(204, false));
        assert!(set.matches(200, true));
        assert!(!set.matches(404, false));

        let disabled = ErrorCodeSet::new([]).with_custom([204]);
        assert!(!disabled.matches(204, false));
    }

    #[test]
    fn test_error_code_serde() {
        let json = serde_json::to_value(ErrorCode::Redirection).unwrap();
        assert_eq!(json, serde_json::json!("3XX"));
    }

    #[tokio::test]
    async fn test_skips_until_settled() {
        let mut probe = MockHeadProbe::new();
        probe
            .expect_head()
            .withf(|url: &str| url == "http://x.com/2")
            .times(1)
            .returning(|_| Ok(ProbeResponse::status(404)));
        probe
            .expect_head()
            .withf(|url: &str| url == "http://x.com/3")
            .times(1)
            .returning(|_| Ok(ProbeResponse::status(200)));
        let sink = CollectingEventSink::new();
        let mut instance = instance();

        let report = apply_with_error_skip(Action::increment(), &mut instance, 5, &probe, &sink)
            .await
            .unwrap();

        assert_eq!(report.final_url, "http://x.com/3");
        assert_eq!(report.outcome, SkipOutcome::Settled { status: 200 });
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].url, "http://x.com/2");
        assert_eq!(sink.events_of_type("error_skip.skipped").len(), 1);
        assert_eq!(sink.events_of_type("error_skip.settled").len(), 1);
    }

    #[tokio::test]
    async fn test_budget_exhaustion() {
        let mut probe = MockHeadProbe::new();
        probe
            .expect_head()
            .times(2)
            .returning(|_| Ok(ProbeResponse::status(404)));
        let sink = CollectingEventSink::new();
        let mut instance = instance();

        let report = apply_with_error_skip(Action::increment(), &mut instance, 2, &probe, &sink)
            .await
            .unwrap();

        assert_eq!(report.outcome, SkipOutcome::Exhausted);
        assert_eq!(report.final_url, "http://x.com/4");
        assert_eq!(instance.url, "http://x.com/4");
        assert_eq!(sink.events_of_type("error_skip.exhausted").len(), 1);
    }

    #[tokio::test]
    async fn test_zero_budget_is_unchecked() {
        let mut probe = MockHeadProbe::new();
        probe.expect_head().never();
        let sink = CollectingEventSink::new();
        let mut instance = instance();

        let report = apply_with_error_skip(Action::increment(), &mut instance, 0, &probe, &sink)
            .await
            .unwrap();

        assert_eq!(report.outcome, SkipOutcome::Unchecked);
        assert_eq!(report.final_url, "http://x.com/2");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_is_distinct() {
        let mut probe = MockHeadProbe::new();
        probe
            .expect_head()
            .returning(|url| Err(ProbeError::transport(url, "connection refused")));
        let sink = CollectingEventSink::new();
        let mut instance = instance();

        let report = apply_with_error_skip(Action::increment(), &mut instance, 3, &probe, &sink)
            .await
            .unwrap();

        assert!(matches!(report.outcome, SkipOutcome::TransportFailed(_)));
        assert_eq!(report.final_url, "http://x.com/2");
        assert!(report.skipped.is_empty());
        assert_eq!(sink.events_of_type("error_skip.transport_error").len(), 1);
    }

    #[tokio::test]
    async fn test_mutation_failure_propagates() {
        let probe = MockHeadProbe::new();
        let sink = CollectingEventSink::new();
        let mut instance = Instance::default();

        let result =
            apply_with_error_skip(Action::increment(), &mut instance, 1, &probe, &sink).await;
        assert_eq!(result.unwrap_err(), MutationError::NoSelection);
    }

    #[cfg(feature = "http-probe")]
    #[test]
    fn test_timeout_bounds() {
        let config = ProbeConfig::default().with_timeout(2.5);
        assert_eq!(config.timeout().unwrap(), std::time::Duration::from_millis(2500));

        for seconds in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e30] {
            let config = ProbeConfig::default().with_timeout(seconds);
            assert!(
                matches!(config.timeout(), Err(ProbeError::InvalidConfig(_))),
                "timeout {seconds} should be rejected"
            );
        }
    }

    #[cfg(feature = "http-probe")]
    #[test]
    fn test_negative_timeout_from_json_rejected() {
        let config: ProbeConfig = serde_json::from_str(r#"{"timeout_seconds": -1.0}"#).unwrap();
        assert_eq!(config.max_redirects, 10);
        assert!(matches!(
            ReqwestProbe::new(&config),
            Err(ProbeError::InvalidConfig(_))
        ));
    }

    /// Serves `/old` and `/1` as redirects to `/new`, `/missing` as 404, and
    /// everything else as 200.
    #[cfg(feature = "http-probe")]
    async fn spawn_local_server() -> std::net::SocketAddr {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let mut read = 0;
                    while !buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        match stream.read(&mut buf[read..]).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => read += n,
                        }
                    }
                    let request = String::from_utf8_lossy(&buf[..read]).to_string();
                    let path = request.split_whitespace().nth(1).unwrap_or("/");
                    let head = match path {
                        "/old" | "/1" => "HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\n",
                        "/missing" => "HTTP/1.1 404 Not Found\r\n",
                        _ => "HTTP/1.1 200 OK\r\n",
                    };
                    let response = format!("{head}Content-Length: 0\r\nConnection: close\r\n\r\n");
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        addr
    }

    #[cfg(feature = "http-probe")]
    #[tokio::test]
    async fn test_reqwest_client_reports_redirects() {
        let addr = spawn_local_server().await;
        let probe = ReqwestProbe::new(&ProbeConfig::default().with_timeout(5.0)).unwrap();

        let moved = probe.head(&format!("http://{addr}/old")).await.unwrap();
        assert_eq!(moved.status, 200);
        assert!(moved.redirected);

        let direct = probe.head(&format!("http://{addr}/new")).await.unwrap();
        assert_eq!(direct.status, 200);
        assert!(!direct.redirected);

        let missing = probe.head(&format!("http://{addr}/missing")).await.unwrap();
        assert_eq!(missing.status, 404);
        assert!(!missing.redirected);
    }

    #[cfg(feature = "http-probe")]
    #[tokio::test]
    async fn test_redirected_page_is_skipped_over_http() {
        let addr = spawn_local_server().await;
        let probe = ReqwestProbe::new(&ProbeConfig::default()).unwrap();
        let sink = CollectingEventSink::new();
        let url = format!("http://{addr}/0");
        let start = url.len() - 1;
        let mut instance = Instance::with_selection(url, "0", start, TransformParams::new(1));

        let report = apply_with_error_skip(Action::increment(), &mut instance, 2, &probe, &sink)
            .await
            .unwrap();

        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].redirected);
        assert_eq!(report.skipped[0].url, format!("http://{addr}/1"));
        assert_eq!(report.outcome, SkipOutcome::Settled { status: 200 });
        assert_eq!(report.final_url, format!("http://{addr}/2"));
    }
}
