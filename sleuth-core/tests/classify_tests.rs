// Tests for purpose and resource classification

use sleuth_core::classify::{
    EXTERNAL_SCRIPT, THIRD_PARTY, UNKNOWN_API, UNKNOWN_IMAGE, classify, classify_image,
    classify_resource_type, classify_script, describe_host,
};

#[test]
fn test_classify_specific_rules_win() {
    assert_eq!(
        classify("https://apphis.longhuvip.com/w1/api/index.php?a=GetYTFP_BKHX"),
        "sector quote data"
    );
    assert_eq!(
        classify("https://apphis.longhuvip.com/w1/api/index.php?a=GetDayZhangTing"),
        "daily limit-up data"
    );
    assert_eq!(
        classify("https://apphis.longhuvip.com/w1/api/index.php?a=Other"),
        "dragon-tiger list data API"
    );
}

#[test]
fn test_classify_generic_rules() {
    assert_eq!(classify("https://www.szse.cn/api/report/calendar"), "SZSE trading calendar data");
    assert_eq!(classify("https://example.com/graphql"), "GraphQL API");
    assert_eq!(classify("https://example.com/api/users"), "REST API endpoint");
    assert_eq!(classify("https://example.com/index.html"), UNKNOWN_API);
}

#[test]
fn test_classify_is_case_insensitive() {
    assert_eq!(classify("HTTPS://EXAMPLE.COM/GRAPHQL"), "GraphQL API");
    assert_eq!(classify("https://Data.SinaJS.cn/x"), "Sina Finance chart data");
}

#[test]
fn test_classify_is_pure() {
    let url = "https://example.com/api/x";
    assert_eq!(classify(url), classify(url));
}

#[test]
fn test_resource_type_by_extension() {
    assert_eq!(classify_resource_type("https://a.com/app.js?v=3"), "javascript");
    assert_eq!(classify_resource_type("https://a.com/mod.mjs"), "javascript");
    assert_eq!(classify_resource_type("https://a.com/site.CSS"), "stylesheet");
    assert_eq!(classify_resource_type("https://a.com/logo.png#top"), "image");
    assert_eq!(classify_resource_type("https://a.com/api/data"), "unknown");
}

#[test]
fn test_classify_image() {
    assert_eq!(
        classify_image("http://image.sinajs.cn/newchart/daily/n/sh600000.gif"),
        "daily candlestick chart"
    );
    assert_eq!(classify_image("http://image.sinajs.cn/newchart/min/n/sh600000.gif"), "Sina Finance chart");
    assert_eq!(classify_image("https://a.com/photo.jpg"), "static image");
    assert_eq!(classify_image("https://a.com/render"), UNKNOWN_IMAGE);
}

#[test]
fn test_classify_script() {
    assert_eq!(classify_script("https://a.com/lib/jquery-3.7.min.js"), "jQuery library");
    assert_eq!(classify_script("https://cdn.jsdelivr.net/npm/lodash"), "CDN JavaScript library");
    assert_eq!(classify_script("https://a.com/api/loader.js"), "REST API endpoint");
    assert_eq!(classify_script("https://a.com/app.js"), EXTERNAL_SCRIPT);
}

#[test]
fn test_describe_host() {
    assert_eq!(describe_host("apphis.longhuvip.com"), "dragon-tiger list data provider");
    assert_eq!(describe_host("www.szse.cn"), "Shenzhen Stock Exchange");
    assert_eq!(describe_host("api.example.com"), THIRD_PARTY);
}
