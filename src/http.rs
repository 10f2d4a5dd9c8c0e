//! HTTP client for the remote analysis service.
//!
//! One `POST /analyze` per analysis, bounded by the configured timeout
//! (120 s by default). Failures are reported, never retried.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::error::{FarmAnalysisError, Result};
use crate::result::AnalysisResult;
use crate::session::{Completion, FarmSession};
use crate::wire::AnalysisRequest;
use crate::ClientConfig;

/// Shown when the service gives no reason of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Analysis failed. Please try again.";

/// Response of the service's health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub earth_engine: Option<String>,
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    error: Option<String>,
}

/// Client for the analysis service.
pub struct AnalysisClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl AnalysisClient {
    /// Create a client from configuration.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // Trailing slash so endpoint joins append rather than replace the last segment
        let mut base = config.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base).map_err(|e| FarmAnalysisError::ConfigError {
            message: format!("Invalid base URL '{}': {}", config.base_url, e),
        })?;
        let timeout = Duration::from_millis(config.timeout_ms);

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FarmAnalysisError::ConfigError {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| FarmAnalysisError::ConfigError {
                message: format!("Invalid endpoint '{}': {}", path, e),
            })
    }

    /// Submit a boundary for analysis.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let url = self.endpoint("analyze")?;
        let start = Instant::now();

        info!(
            "[AnalysisClient] POST {} ({} ring positions)",
            url,
            request.outer_ring().len()
        );

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        debug!(
            "[AnalysisClient] {} after {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            body.len()
        );

        parse_analysis_response(status, &body)
    }

    /// Check that the service is up.
    pub async fn health_check(&self) -> Result<ServiceHealth> {
        let url = self.endpoint("")?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(FarmAnalysisError::AnalysisRequestFailed {
                message: failure_message(&body),
                status_code: Some(status.as_u16()),
            });
        }

        serde_json::from_str(&body).map_err(|e| FarmAnalysisError::AnalysisRequestFailed {
            message: format!("Invalid health response: {}", e),
            status_code: Some(status.as_u16()),
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> FarmAnalysisError {
        let message = if err.is_timeout() {
            format!(
                "Analysis timed out after {}s",
                self.timeout.as_secs_f64().round()
            )
        } else {
            format!("Could not reach analysis service: {}", err)
        };
        warn!("[AnalysisClient] {}", message);
        FarmAnalysisError::AnalysisRequestFailed {
            message,
            status_code: err.status().map(|s| s.as_u16()),
        }
    }
}

/// Turn a status and body into a result or a user-facing failure.
fn parse_analysis_response(status: StatusCode, body: &str) -> Result<AnalysisResult> {
    if !status.is_success() {
        return Err(FarmAnalysisError::AnalysisRequestFailed {
            message: failure_message(body),
            status_code: Some(status.as_u16()),
        });
    }

    let result =
        AnalysisResult::from_json(body).map_err(|e| FarmAnalysisError::AnalysisRequestFailed {
            message: format!("Invalid response from analysis service: {}", e),
            status_code: Some(status.as_u16()),
        })?;

    if result.analysis_complete == Some(false) {
        return Err(FarmAnalysisError::AnalysisRequestFailed {
            message: result
                .error
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string()),
            status_code: Some(status.as_u16()),
        });
    }

    Ok(result)
}

/// Server-supplied message when present, else the generic one.
fn failure_message(body: &str) -> String {
    serde_json::from_str::<ServiceErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

/// Run one analysis for the session's committed boundary.
///
/// The session lock is released while the request is in flight.
pub async fn run_analysis(
    session: &Mutex<FarmSession>,
    client: &AnalysisClient,
) -> Result<Completion> {
    let pending = {
        let mut guard = session.lock().unwrap_or_else(|e| e.into_inner());
        guard.begin_analysis()?
    };

    let outcome = client.analyze(&pending.request).await;

    let mut guard = session.lock().unwrap_or_else(|e| e.into_inner());
    Ok(guard.complete_analysis(pending.id, outcome))
}

/// Synchronous wrapper for FFI - runs the async request on a tokio runtime
#[cfg(feature = "ffi")]
pub fn analyze_sync(config: &ClientConfig, request: &AnalysisRequest) -> Result<AnalysisResult> {
    use tokio::runtime::Runtime;

    let rt = Runtime::new().map_err(|e| FarmAnalysisError::ConfigError {
        message: format!("Runtime error: {}", e),
    })?;
    let client = AnalysisClient::new(config)?;
    rt.block_on(client.analyze(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;

    fn request() -> AnalysisRequest {
        AnalysisRequest::from_vertices(&[
            GeoPoint::new(18.52, 73.85),
            GeoPoint::new(18.53, 73.86),
            GeoPoint::new(18.51, 73.87),
        ])
    }

    #[test]
    fn test_failure_message_uses_server_error() {
        assert_eq!(
            failure_message(r#"{"error": "Missing geometry in request body"}"#),
            "Missing geometry in request body"
        );
        assert_eq!(failure_message(r#"{"error": "  "}"#), GENERIC_FAILURE_MESSAGE);
        assert_eq!(failure_message("<html>Bad Gateway</html>"), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_parse_non_success_status() {
        let err = parse_analysis_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "User memory limit exceeded", "analysis_complete": false}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            FarmAnalysisError::AnalysisRequestFailed {
                message: "User memory limit exceeded".to_string(),
                status_code: Some(500),
            }
        );
    }

    #[test]
    fn test_parse_incomplete_success() {
        let err = parse_analysis_response(StatusCode::OK, r#"{"analysis_complete": false}"#)
            .unwrap_err();
        assert!(err.to_string().contains(GENERIC_FAILURE_MESSAGE));
    }

    #[test]
    fn test_parse_success() {
        let result =
            parse_analysis_response(StatusCode::OK, r#"{"ndvi": 0.52, "analysis_complete": true}"#)
                .unwrap();
        assert_eq!(result.ndvi, Some(0.52));

        let garbled = parse_analysis_response(StatusCode::OK, "not json");
        assert!(matches!(
            garbled,
            Err(FarmAnalysisError::AnalysisRequestFailed {
                status_code: Some(200),
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            AnalysisClient::new(&config),
            Err(FarmAnalysisError::ConfigError { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_service_fails_without_retry() {
        let config = ClientConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 5_000,
        };
        let client = AnalysisClient::new(&config).unwrap();
        let err = client.analyze(&request()).await.unwrap_err();
        assert!(matches!(
            err,
            FarmAnalysisError::AnalysisRequestFailed {
                status_code: None,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_analysis_records_failure() {
        let session = Mutex::new(FarmSession::new());
        session
            .lock()
            .unwrap()
            .selector_mut()
            .complete_polygon(vec![
                GeoPoint::new(18.52, 73.85),
                GeoPoint::new(18.53, 73.86),
                GeoPoint::new(18.51, 73.87),
            ]);

        let client = AnalysisClient::new(&ClientConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            timeout_ms: 5_000,
        })
        .unwrap();

        let completion = run_analysis(&session, &client).await.unwrap();
        assert_eq!(completion, Completion::Failed);

        let guard = session.lock().unwrap();
        assert!(!guard.is_analysis_in_flight());
        assert!(guard.last_error().is_some());
    }
}
