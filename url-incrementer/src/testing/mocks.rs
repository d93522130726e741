//! Probe doubles.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::errors::ProbeError;
use crate::mutator::{HeadProbe, ProbeResponse};

/// One recorded probe call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeCall {
    /// The probed URL.
    pub url: String,
    /// What the probe answered.
    pub result: Result<ProbeResponse, ProbeError>,
}

/// A probe answering from a per-URL script.
///
/// URLs without a scripted answer get the fallback, `200` unless changed.
#[derive(Debug)]
pub struct ScriptedProbe {
    responses: HashMap<String, Result<ProbeResponse, ProbeError>>,
    fallback: ProbeResponse,
    calls: Mutex<Vec<ProbeCall>>,
}

impl Default for ScriptedProbe {
    fn default() -> Self {
        Self {
            responses: HashMap::new(),
            fallback: ProbeResponse::status(200),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedProbe {
    /// Creates a probe answering `200` everywhere.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `url` with `status`.
    #[must_use]
    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses
            .insert(url.into(), Ok(ProbeResponse::status(status)));
        self
    }

    /// Answers `url` with a redirected response.
    #[must_use]
    pub fn with_redirect(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(
            url.into(),
            Ok(ProbeResponse {
                status,
                redirected: true,
            }),
        );
        self
    }

    /// Fails `url` with a transport error.
    #[must_use]
    pub fn with_transport_error(mut self, url: impl Into<String>, reason: &str) -> Self {
        let url = url.into();
        let error = ProbeError::transport(url.clone(), reason);
        self.responses.insert(url, Err(error));
        self
    }

    /// Changes the answer for unscripted URLs.
    #[must_use]
    pub fn with_fallback(mut self, status: u16) -> Self {
        self.fallback = ProbeResponse::status(status);
        self
    }

    /// Returns every call made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls.lock().clone()
    }

    /// Returns the probed URLs in call order.
    #[must_use]
    pub fn probed_urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|c| c.url.clone()).collect()
    }

    /// Returns the number of calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HeadProbe for ScriptedProbe {
    async fn head(&self, url: &str) -> Result<ProbeResponse, ProbeError> {
        let result = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or(Ok(self.fallback));
        self.calls.lock().push(ProbeCall {
            url: url.to_string(),
            result: result.clone(),
        });
        result
    }
}
