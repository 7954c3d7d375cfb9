use crate::error::ProbeError;
use crate::shape::ShapeSummary;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    Json,
    Text,
}

impl DataFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataFormat::Json => "json",
            DataFormat::Text => "text",
        }
    }
}

/// Outcome of a single probe request.
///
/// `error` is only set for transport failures and non-200 statuses; a body
/// that fails to decode as JSON is recorded in `json_error` instead, so a
/// successful probe never carries an `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_format: Option<DataFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded_json: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_shape: Option<ShapeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ProbeResult {
    pub fn new(url: String) -> Self {
        Self {
            url,
            success: false,
            status_code: None,
            headers: None,
            content_type: None,
            raw_body: None,
            data_format: None,
            decoded_json: None,
            json_shape: None,
            json_error: None,
            error: None,
            elapsed_ms: 0,
        }
    }

    pub fn with_error(url: String, error: &ProbeError) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(url)
        }
    }

    /// True when the body was expected to be JSON but did not decode.
    pub fn json_failed(&self) -> bool {
        self.json_error.is_some()
    }
}
