use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    FetchCall,
    AjaxCall,
    ScriptTag,
    ImageSource,
    JsUrlLiteral,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::FetchCall => "fetch_call",
            ReferenceKind::AjaxCall => "ajax_call",
            ReferenceKind::ScriptTag => "script_tag",
            ReferenceKind::ImageSource => "image_source",
            ReferenceKind::JsUrlLiteral => "js_url_literal",
        }
    }

    /// Calls that actively pull data from an endpoint
    pub fn is_api_call(&self) -> bool {
        matches!(self, ReferenceKind::FetchCall | ReferenceKind::AjaxCall)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReference {
    pub kind: ReferenceKind,
    pub url: String,
    pub method: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostStat {
    pub host: String,
    pub occurrence_count: usize,
    pub kinds: BTreeSet<ReferenceKind>,
    pub purposes: BTreeSet<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologySignals {
    pub chart_libraries: BTreeSet<String>,
    pub frontend_frameworks: BTreeSet<String>,
    pub storage_methods: BTreeSet<String>,
    pub data_processing: BTreeSet<String>,
}

impl TechnologySignals {
    pub fn is_empty(&self) -> bool {
        self.chart_libraries.is_empty()
            && self.frontend_frameworks.is_empty()
            && self.storage_methods.is_empty()
            && self.data_processing.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowSignals {
    pub api_to_local_storage: bool,
    pub real_time_updates: bool,
    pub data_export_import: bool,
    pub chart_integration: bool,
}

/// How often a known data-processing idiom shows up in the scanned text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingPattern {
    pub name: String,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionCounts {
    pub api_endpoints: usize,
    pub external_resources: usize,
    pub data_sources: usize,
    pub unique_hosts: usize,
}
