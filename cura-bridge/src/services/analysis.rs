//! Analysis service client
//!
//! Submits file bytes to the analysis service's process endpoint as a
//! multipart upload and decodes the classification. The service signals
//! "filtered out" with an empty/falsy JSON body; that is reported as an
//! absent result, not an error.

use crate::types::{AnalysisError, AnalysisResult, Analyzer};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Analysis service client
pub struct AnalysisClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl AnalysisClient {
    /// Create a new client for the given process endpoint
    ///
    /// `timeout` bounds the whole request including the file upload.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl Analyzer for AnalysisClient {
    async fn analyze(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<AnalysisResult>, AnalysisError> {
        debug!(file_name, size = bytes.len(), "Submitting file for analysis");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api(status.as_u16(), body));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Decode(e.to_string()))?;

        if is_empty_result(&value) {
            return Ok(None);
        }

        let result: AnalysisResult =
            serde_json::from_value(value).map_err(|e| AnalysisError::Decode(e.to_string()))?;
        Ok(Some(result))
    }
}

/// An empty/falsy JSON body means the service filtered the file out
fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = AnalysisClient::new("http://localhost:8000/process", Duration::from_secs(120));
        assert!(client.is_ok());
    }

    #[test]
    fn test_empty_results() {
        assert!(is_empty_result(&serde_json::json!(null)));
        assert!(is_empty_result(&serde_json::json!(false)));
        assert!(is_empty_result(&serde_json::json!({})));
        assert!(is_empty_result(&serde_json::json!([])));
        assert!(is_empty_result(&serde_json::json!("")));
        assert!(is_empty_result(&serde_json::json!(0)));
    }

    #[test]
    fn test_non_empty_results() {
        assert!(!is_empty_result(&serde_json::json!({"tags": []})));
        assert!(!is_empty_result(&serde_json::json!(true)));
        assert!(!is_empty_result(&serde_json::json!("x")));
        assert!(!is_empty_result(&serde_json::json!(1)));
    }

    #[test]
    fn test_result_decoding_from_value() {
        let value = serde_json::json!({
            "tags": ["landscape"],
            "aesthetic": 8.5,
            "analysis": {"visual_style": "s1", "summary": "hello"}
        });
        assert!(!is_empty_result(&value));

        let result: AnalysisResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.tags, vec!["landscape"]);
        assert_eq!(result.aesthetic, 8.5);
        let analysis = result.analysis.unwrap();
        assert_eq!(analysis.visual_style.as_deref(), Some("s1"));
        assert_eq!(analysis.summary.as_deref(), Some("hello"));
    }
}
