// Per-host statistics and technology / data-flow signals

use crate::classify::describe_host;
use crate::model::{
    DataFlowSignals, ExtractedReference, ExtractionCounts, HostStat, ProcessingPattern,
    ReferenceKind, TechnologySignals,
};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TechCategory {
    ChartLibrary,
    FrontendFramework,
    StorageMethod,
    DataProcessing,
}

/// (category, lower-case token, label)
pub const TECHNOLOGY_TOKENS: &[(TechCategory, &str, &str)] = &[
    (TechCategory::ChartLibrary, "echarts", "ECharts"),
    (TechCategory::ChartLibrary, "chart.js", "Chart.js"),
    (TechCategory::ChartLibrary, "new chart(", "Chart.js"),
    (TechCategory::ChartLibrary, "highcharts", "Highcharts"),
    (TechCategory::FrontendFramework, "jquery", "jQuery"),
    (TechCategory::FrontendFramework, "bootstrap", "Bootstrap"),
    (TechCategory::FrontendFramework, "vue.min.js", "Vue"),
    (TechCategory::FrontendFramework, "new vue(", "Vue"),
    (TechCategory::FrontendFramework, "react-dom", "React"),
    (TechCategory::FrontendFramework, "angular.min.js", "AngularJS"),
    (TechCategory::StorageMethod, "localstorage", "LocalStorage"),
    (TechCategory::StorageMethod, "sessionstorage", "SessionStorage"),
    (TechCategory::StorageMethod, "indexeddb", "IndexedDB"),
    (TechCategory::DataProcessing, "json.parse", "JSON transformation"),
    (TechCategory::DataProcessing, "json.stringify", "JSON transformation"),
    (TechCategory::DataProcessing, "fetch(", "Fetch API"),
    (TechCategory::DataProcessing, "xmlhttprequest", "XMLHttpRequest"),
];

pub const LIVE_DATA_PROVIDERS: &[&str] = &["longhuvip.com"];
pub const CHART_DATA_PROVIDERS: &[&str] = &["sinajs.cn"];
const CHART_INIT_TOKENS: &[&str] = &["echarts.init", "new chart("];
const EXPORT_IMPORT_TOKENS: &[&str] = &["exportdata", "importdata"];
const STORAGE_WRITE_TOKEN: &str = "localstorage.setitem";

static PROCESSING_PATTERNS: LazyLock<Vec<(&'static str, Regex, &'static str)>> =
    LazyLock::new(|| {
        [
            ("process_api_data", r"(?i)processApiData\s*\(", "API data processing"),
            ("response_json", r"(?i)\.json\(\)\s*\.then", "HTTP response parsing"),
            (
                "local_storage",
                r"(?i)localStorage\.(?:setItem|getItem)",
                "local storage access",
            ),
            ("json_transform", r"(?i)JSON\.(?:parse|stringify)", "JSON transformation"),
        ]
        .into_iter()
        .map(|(name, pattern, label)| {
            let regex = Regex::new(pattern)
                .unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", pattern, e));
            (name, regex, label)
        })
        .collect()
    });

/// Host of a reference URL, lower-cased. `None` when the URL has no host.
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .filter(|h| !h.is_empty())
}

/// Group references by host. References without a host are skipped.
pub fn aggregate(references: &[ExtractedReference]) -> BTreeMap<String, HostStat> {
    let mut stats: BTreeMap<String, HostStat> = BTreeMap::new();

    for reference in references {
        let Some(host) = host_of(&reference.url) else {
            debug!("No host in {}, skipping", reference.url);
            continue;
        };

        let stat = stats.entry(host.clone()).or_insert_with(|| HostStat {
            description: describe_host(&host).to_string(),
            host,
            occurrence_count: 0,
            kinds: BTreeSet::new(),
            purposes: BTreeSet::new(),
        });
        stat.occurrence_count += 1;
        stat.kinds.insert(reference.kind);
        stat.purposes.insert(reference.purpose.clone());
    }

    stats
}

pub fn scan_technology(text: &str) -> TechnologySignals {
    let lower = text.to_lowercase();
    let mut signals = TechnologySignals::default();

    for (category, token, label) in TECHNOLOGY_TOKENS {
        if !lower.contains(*token) {
            continue;
        }
        let set = match category {
            TechCategory::ChartLibrary => &mut signals.chart_libraries,
            TechCategory::FrontendFramework => &mut signals.frontend_frameworks,
            TechCategory::StorageMethod => &mut signals.storage_methods,
            TechCategory::DataProcessing => &mut signals.data_processing,
        };
        set.insert(label.to_string());
    }

    signals
}

pub fn scan_data_flow(text: &str, references: &[ExtractedReference]) -> DataFlowSignals {
    let lower = text.to_lowercase();
    let hosts: Vec<String> = references.iter().filter_map(|r| host_of(&r.url)).collect();
    let mut signals = DataFlowSignals::default();

    signals.api_to_local_storage |=
        lower.contains(STORAGE_WRITE_TOKEN) && references.iter().any(|r| r.kind.is_api_call());

    signals.real_time_updates |= any_host_contains(&hosts, LIVE_DATA_PROVIDERS);

    signals.data_export_import |= EXPORT_IMPORT_TOKENS.iter().any(|t| lower.contains(*t));
    signals.data_export_import |= references.iter().any(|r| {
        let url = r.url.to_lowercase();
        url.contains("export") || url.contains("import")
    });

    signals.chart_integration |= any_host_contains(&hosts, CHART_DATA_PROVIDERS);
    signals.chart_integration |= CHART_INIT_TOKENS.iter().any(|t| lower.contains(*t));

    signals
}

fn any_host_contains(hosts: &[String], providers: &[&str]) -> bool {
    hosts
        .iter()
        .any(|h| providers.iter().any(|p| h.contains(*p)))
}

/// Occurrence counts of known data-processing idioms; absent idioms are omitted.
pub fn scan_processing(text: &str) -> Vec<ProcessingPattern> {
    PROCESSING_PATTERNS
        .iter()
        .filter_map(|(name, regex, label)| {
            let count = regex.find_iter(text).count();
            (count > 0).then(|| ProcessingPattern {
                name: name.to_string(),
                label: label.to_string(),
                count,
            })
        })
        .collect()
}

pub fn count(
    references: &[ExtractedReference],
    host_stats: &BTreeMap<String, HostStat>,
) -> ExtractionCounts {
    let mut counts = ExtractionCounts {
        unique_hosts: host_stats.len(),
        ..ExtractionCounts::default()
    };

    for reference in references {
        match reference.kind {
            ReferenceKind::FetchCall | ReferenceKind::AjaxCall => counts.api_endpoints += 1,
            ReferenceKind::ScriptTag => counts.external_resources += 1,
            ReferenceKind::ImageSource | ReferenceKind::JsUrlLiteral => counts.data_sources += 1,
        }
    }

    counts
}
