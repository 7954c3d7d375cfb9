// Applies the pattern library to a text blob

use crate::classify::{classify, classify_image, classify_resource_type, classify_script};
use crate::model::{ExtractedReference, ReferenceKind};
use crate::patterns::{
    FETCH_HEADERS, FETCH_METHOD, HEADER_PAIR, PATTERNS, QUOTED_URL, is_static_asset,
};
use std::collections::{BTreeMap, HashSet};
use std::ops::Range;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    /// Keep only the first reference for each distinct URL.
    pub dedupe_urls: bool,
    /// A span reported by one family hides overlapping matches of later
    /// families. Overlapping fetch matches are collapsed either way.
    pub claim_spans: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            dedupe_urls: false,
            claim_spans: true,
        }
    }
}

pub fn extract(text: &str) -> Vec<ExtractedReference> {
    extract_with(text, &ExtractOptions::default())
}

/// Run every pattern family over `text` in priority order.
///
/// With `claim_spans` set, a span of text is reported by the first family
/// that claims it and later families skip overlapping matches. The same URL
/// written at two places is still reported twice unless `dedupe_urls` is set.
pub fn extract_with(text: &str, options: &ExtractOptions) -> Vec<ExtractedReference> {
    let quoted: Vec<Range<usize>> = QUOTED_URL
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.range())
        .collect();
    let mut claimed: Vec<(Range<usize>, ReferenceKind)> = Vec::new();
    let mut references = Vec::new();

    for pattern in PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(text) {
            let Some(url_match) = caps.get(pattern.url_group) else {
                continue;
            };

            let mut span = url_match.range();
            if pattern.bare_host {
                match resolve_bare_host(text, span.clone(), &quoted) {
                    Some(resolved) => span = resolved,
                    None => {
                        debug!("[{}] {} is part of another URL", pattern.name, url_match.as_str());
                        continue;
                    }
                }
            }

            let blocked = claimed.iter().any(|(c, kind)| {
                c.start < span.end
                    && span.start < c.end
                    && (options.claim_spans
                        || (*kind == ReferenceKind::FetchCall
                            && pattern.kind == ReferenceKind::FetchCall))
            });
            if blocked {
                debug!("[{}] {} already claimed", pattern.name, &text[span.clone()]);
                continue;
            }

            let url = normalize_url(&text[span.clone()]);
            if pattern.skip_assets && is_static_asset(&url) {
                debug!("[{}] skipping static asset {}", pattern.name, url);
                continue;
            }
            claimed.push((span, pattern.kind));

            let mut method = pattern
                .method_group
                .and_then(|g| caps.get(g))
                .map(|m| m.as_str().to_uppercase())
                .unwrap_or_else(|| "GET".to_string());

            let mut headers = BTreeMap::new();
            if let Some(opts) = pattern.options_group.and_then(|g| caps.get(g)) {
                if let Some(m) = fetch_method(opts.as_str()) {
                    method = m;
                }
                headers = fetch_headers(opts.as_str());
            }

            info!("Found {} {} {}", pattern.kind.as_str(), method, url);
            references.push(build_reference(pattern.kind, url, method, headers));
        }
    }

    if options.dedupe_urls {
        let before = references.len();
        let mut seen = HashSet::new();
        references.retain(|r| seen.insert(r.url.clone()));
        debug!("URL dedupe dropped {} references", before - references.len());
    }

    references
}

/// Widen a chart-host match to the full URL it is the host of.
///
/// Inside a quoted URL the match must sit right after the scheme, otherwise
/// it is only a mention in another URL's path or query and `None` is
/// returned. Outside quotes a directly preceding scheme is pulled in.
fn resolve_bare_host(
    text: &str,
    span: Range<usize>,
    quoted: &[Range<usize>],
) -> Option<Range<usize>> {
    let preceded_by = |prefix: &str| {
        span.start >= prefix.len()
            && text
                .get(span.start - prefix.len()..span.start)
                .is_some_and(|p| p.eq_ignore_ascii_case(prefix))
    };

    if let Some(outer) = quoted
        .iter()
        .find(|q| q.start <= span.start && span.end <= q.end)
    {
        let lead = &text[outer.start..span.start];
        let at_host = lead.is_empty()
            || ["//", "http://", "https://"]
                .iter()
                .any(|scheme| lead.eq_ignore_ascii_case(scheme));
        return at_host.then(|| outer.clone());
    }

    match ["https://", "http://", "//"].into_iter().find(|s| preceded_by(s)) {
        Some(scheme) => Some(span.start - scheme.len()..span.end),
        None => Some(span),
    }
}

fn build_reference(
    kind: ReferenceKind,
    url: String,
    method: String,
    headers: BTreeMap<String, String>,
) -> ExtractedReference {
    let (purpose, resource_type) = match kind {
        ReferenceKind::ScriptTag => (
            classify_script(&url),
            Some(resource_type_or(&url, "javascript")),
        ),
        ReferenceKind::ImageSource => (classify_image(&url), Some(resource_type_or(&url, "image"))),
        _ => (classify(&url), None),
    };

    ExtractedReference {
        kind,
        url,
        method,
        purpose: purpose.to_string(),
        headers,
        resource_type,
    }
}

fn resource_type_or(url: &str, fallback: &str) -> String {
    match classify_resource_type(url) {
        "unknown" => fallback.to_string(),
        known => known.to_string(),
    }
}

fn fetch_method(options: &str) -> Option<String> {
    FETCH_METHOD
        .captures(options)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_uppercase())
}

fn fetch_headers(options: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    if let Some(block) = FETCH_HEADERS.captures(options).and_then(|c| c.get(1)) {
        for pair in HEADER_PAIR.captures_iter(block.as_str()) {
            headers.insert(pair[1].to_string(), pair[2].to_string());
        }
    }
    headers
}

/// Complete a matched URL to an absolute, scheme-qualified form.
///
/// `//host/x` and `host/x` both become `http://host/x`.
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(rest) = raw.strip_prefix("//") {
        format!("http://{}", rest)
    } else if has_scheme(raw) {
        raw.to_string()
    } else {
        format!("http://{}", raw)
    }
}

fn has_scheme(url: &str) -> bool {
    match url.find("://") {
        Some(idx) if idx > 0 => {
            let scheme = &url[..idx];
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}
