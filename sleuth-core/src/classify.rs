// Heuristic purpose classification over URL substrings
//
// Every table is evaluated top to bottom against the lower-cased URL and the
// first matching rule wins, so more specific rules must come first.

use crate::patterns::IMAGE_EXTENSIONS;

/// Matches when the URL contains `host` and, if given, `path`.
/// An empty `host` matches any URL.
pub struct PurposeRule {
    pub host: &'static str,
    pub path: Option<&'static str>,
    pub label: &'static str,
}

const fn rule(host: &'static str, path: Option<&'static str>, label: &'static str) -> PurposeRule {
    PurposeRule { host, path, label }
}

impl PurposeRule {
    fn matches(&self, url_lower: &str) -> bool {
        url_lower.contains(self.host) && self.path.is_none_or(|p| url_lower.contains(p))
    }
}

pub const UNKNOWN_API: &str = "unknown API";
pub const UNKNOWN_IMAGE: &str = "unknown image purpose";
pub const EXTERNAL_SCRIPT: &str = "external script";
pub const THIRD_PARTY: &str = "third-party service";

pub const PURPOSE_RULES: &[PurposeRule] = &[
    rule("longhuvip", Some("getytfp_bkhx"), "sector quote data"),
    rule("longhuvip", Some("getdayzhangting"), "daily limit-up data"),
    rule("longhuvip", None, "dragon-tiger list data API"),
    rule("szse.cn", None, "SZSE trading calendar data"),
    rule("", Some("kpl.php"), "historical data query API"),
    rule("sinajs.cn", None, "Sina Finance chart data"),
    rule("", Some("/graphql"), "GraphQL API"),
    rule("", Some("/api/"), "REST API endpoint"),
];

pub const IMAGE_RULES: &[PurposeRule] = &[
    rule("sinajs.cn", Some("newchart/daily"), "daily candlestick chart"),
    rule("sinajs.cn", None, "Sina Finance chart"),
    rule("", Some(".jpg"), "static image"),
    rule("", Some(".png"), "static image"),
    rule("", Some(".gif"), "static image"),
];

pub const SCRIPT_RULES: &[PurposeRule] = &[
    rule("", Some("echarts"), "ECharts chart library"),
    rule("", Some("chart.js"), "Chart.js chart library"),
    rule("", Some("highcharts"), "Highcharts chart library"),
    rule("", Some("jquery"), "jQuery library"),
    rule("", Some("bootstrap"), "Bootstrap library"),
    rule("jsdelivr.net", None, "CDN JavaScript library"),
    rule("cdn.", None, "CDN JavaScript library"),
];

pub const HOST_RULES: &[PurposeRule] = &[
    rule("longhuvip.com", None, "dragon-tiger list data provider"),
    rule("szse.cn", None, "Shenzhen Stock Exchange"),
    rule("sinajs.cn", None, "Sina Finance data service"),
    rule("jsdelivr.net", None, "CDN provider"),
    rule("cdnjs", None, "CDN provider"),
];

fn first_match(rules: &[PurposeRule], url: &str, default: &'static str) -> &'static str {
    let lower = url.to_lowercase();
    rules
        .iter()
        .find(|r| r.matches(&lower))
        .map(|r| r.label)
        .unwrap_or(default)
}

/// Purpose of a data endpoint, `"unknown API"` when nothing matches.
pub fn classify(url: &str) -> &'static str {
    first_match(PURPOSE_RULES, url, UNKNOWN_API)
}

pub fn classify_image(url: &str) -> &'static str {
    first_match(IMAGE_RULES, url, UNKNOWN_IMAGE)
}

/// Library or CDN behind a script tag. Scripts served by a known data
/// provider fall back to the endpoint purpose.
pub fn classify_script(url: &str) -> &'static str {
    match first_match(SCRIPT_RULES, url, UNKNOWN_API) {
        UNKNOWN_API => match classify(url) {
            UNKNOWN_API => EXTERNAL_SCRIPT,
            purpose => purpose,
        },
        library => library,
    }
}

pub fn describe_host(host: &str) -> &'static str {
    first_match(HOST_RULES, host, THIRD_PARTY)
}

/// Resource type keyed on the extension of the URL path.
pub fn classify_resource_type(url: &str) -> &'static str {
    let lower = url.to_lowercase();
    let path = lower
        .split(['?', '#'])
        .next()
        .unwrap_or_default();

    if path.ends_with(".js") || path.ends_with(".mjs") {
        "javascript"
    } else if path.ends_with(".css") {
        "stylesheet"
    } else if IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext)) {
        "image"
    } else {
        "unknown"
    }
}
