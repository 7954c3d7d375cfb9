// Tests for host aggregation and page signals

use sleuth_core::aggregate::{
    aggregate, count, host_of, scan_data_flow, scan_processing, scan_technology,
};
use sleuth_core::extract::extract;
use sleuth_core::model::{ExtractedReference, ReferenceKind};
use std::collections::BTreeMap;

const PAGE: &str = r#"
<html>
<head>
  <script src="https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js"></script>
</head>
<body>
  <img src="https://image.sinajs.cn/newchart/daily/n/sh600000.gif">
  <script>
    fetch('https://apphis.longhuvip.com/w1/api/index.php?a=GetDayZhangTing')
      .then(r => r.json())
      .then(d => localStorage.setItem('limit', JSON.stringify(d)));
    fetch('https://apphis.longhuvip.com/w1/api/index.php?a=GetYTFP_BKHX');
    var chart = echarts.init(document.getElementById('c'));
  </script>
</body>
</html>
"#;

fn reference(kind: ReferenceKind, url: &str) -> ExtractedReference {
    ExtractedReference {
        kind,
        url: url.to_string(),
        method: "GET".to_string(),
        purpose: "unknown API".to_string(),
        headers: BTreeMap::new(),
        resource_type: None,
    }
}

#[test]
fn test_host_of() {
    assert_eq!(host_of("https://API.Example.com/x").as_deref(), Some("api.example.com"));
    assert_eq!(host_of("data:text/plain,hello"), None);
    assert_eq!(host_of("not a url"), None);
}

#[test]
fn test_aggregate_counts_sum_to_hosted_references() {
    let refs = extract(PAGE);
    let stats = aggregate(&refs);

    let hosted = refs.iter().filter(|r| host_of(&r.url).is_some()).count();
    let total: usize = stats.values().map(|s| s.occurrence_count).sum();
    assert_eq!(total, hosted);

    let longhu = &stats["apphis.longhuvip.com"];
    assert_eq!(longhu.occurrence_count, 2);
    assert!(longhu.kinds.contains(&ReferenceKind::FetchCall));
    assert!(longhu.purposes.contains("daily limit-up data"));
    assert!(longhu.purposes.contains("sector quote data"));
    assert_eq!(longhu.description, "dragon-tiger list data provider");
}

#[test]
fn test_aggregate_skips_references_without_host() {
    let refs = vec![
        reference(ReferenceKind::JsUrlLiteral, "data:text/plain,hello"),
        reference(ReferenceKind::FetchCall, "https://a.com/1"),
        reference(ReferenceKind::ScriptTag, "https://a.com/2.js"),
    ];
    let stats = aggregate(&refs);

    assert_eq!(stats.len(), 1);
    let stat = &stats["a.com"];
    assert_eq!(stat.occurrence_count, 2);
    assert_eq!(stat.kinds.len(), 2);
    assert_eq!(stat.purposes.len(), 1);
}

#[test]
fn test_aggregate_empty() {
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn test_scan_technology() {
    let signals = scan_technology(PAGE);

    assert!(signals.chart_libraries.contains("ECharts"));
    assert!(signals.storage_methods.contains("LocalStorage"));
    assert!(signals.data_processing.contains("JSON transformation"));
    assert!(signals.data_processing.contains("Fetch API"));
    assert!(signals.frontend_frameworks.is_empty());

    assert!(scan_technology("").is_empty());
}

#[test]
fn test_scan_data_flow() {
    let refs = extract(PAGE);
    let flow = scan_data_flow(PAGE, &refs);

    assert!(flow.api_to_local_storage);
    assert!(flow.real_time_updates);
    assert!(flow.chart_integration);
    assert!(!flow.data_export_import);
}

#[test]
fn test_real_time_updates_needs_a_reference_host() {
    let text = "// data comes from longhuvip.com";
    let flow = scan_data_flow(text, &[]);
    assert!(!flow.real_time_updates);

    let refs = vec![reference(ReferenceKind::AjaxCall, "https://x.longhuvip.com/a")];
    assert!(scan_data_flow("", &refs).real_time_updates);
}

#[test]
fn test_storage_write_without_api_call() {
    let text = "localStorage.setItem('k', 'v')";
    let refs = vec![reference(ReferenceKind::ScriptTag, "https://a.com/app.js")];
    assert!(!scan_data_flow(text, &refs).api_to_local_storage);
}

#[test]
fn test_export_import_from_reference_url() {
    let refs = vec![reference(ReferenceKind::FetchCall, "https://a.com/export/csv")];
    assert!(scan_data_flow("", &refs).data_export_import);
    assert!(scan_data_flow("function exportData() {}", &[]).data_export_import);
}

#[test]
fn test_scan_processing_counts() {
    let text = "JSON.parse(a); JSON.parse(b); processApiData(x);";
    let patterns = scan_processing(text);

    assert_eq!(patterns.len(), 2);
    let json = patterns.iter().find(|p| p.name == "json_transform").unwrap();
    assert_eq!(json.count, 2);
    let api = patterns.iter().find(|p| p.name == "process_api_data").unwrap();
    assert_eq!(api.count, 1);
}

#[test]
fn test_count() {
    let refs = extract(PAGE);
    let stats = aggregate(&refs);
    let counts = count(&refs, &stats);

    assert_eq!(counts.api_endpoints, 2);
    assert_eq!(counts.external_resources, 1);
    assert_eq!(counts.data_sources, 1);
    assert_eq!(counts.unique_hosts, 3);
}
