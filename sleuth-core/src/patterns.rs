// Text-matching rules for network references, in extraction priority order

use crate::model::ReferenceKind;
use regex::Regex;
use std::sync::LazyLock;

/// One extraction rule.
///
/// `url_group` names the capture holding the URL. `method_group`, when set,
/// holds the HTTP method (or a `.get`/`.post` call name); `options_group`
/// holds a fetch options object to mine for method and headers.
/// `bare_host` rules match a chart host anywhere in the text and are
/// resolved against the quoted URL around them, if any.
pub struct Pattern {
    pub name: &'static str,
    pub kind: ReferenceKind,
    pub regex: Regex,
    pub url_group: usize,
    pub method_group: Option<usize>,
    pub options_group: Option<usize>,
    pub skip_assets: bool,
    pub bare_host: bool,
}

impl Pattern {
    fn new(name: &'static str, kind: ReferenceKind, pattern: &str) -> Self {
        Self {
            name,
            kind,
            regex: compile(pattern),
            url_group: 1,
            method_group: None,
            options_group: None,
            skip_assets: false,
            bare_host: false,
        }
    }

    fn url_group(mut self, group: usize) -> Self {
        self.url_group = group;
        self
    }

    fn method_group(mut self, group: usize) -> Self {
        self.method_group = Some(group);
        self
    }

    fn options_group(mut self, group: usize) -> Self {
        self.options_group = Some(group);
        self
    }

    fn skip_assets(mut self) -> Self {
        self.skip_assets = true;
        self
    }

    fn bare_host(mut self) -> Self {
        self.bare_host = true;
        self
    }
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {}: {}", pattern, e))
}

/// Substrings that mark a generic URL literal as a static asset rather than
/// a data endpoint.
pub const ASSET_DENYLIST: &[&str] = &["font", "css", "bootstrap", "jquery"];

pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp"];

pub static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    vec![
        // fetch('https://host/x') optionally followed by an options object
        // with one level of nesting (for `headers: {...}`)
        Pattern::new(
            "fetch_literal",
            ReferenceKind::FetchCall,
            r#"(?i)\bfetch\(\s*['"]((?:https?:)?//[^'"\s]+)['"](?:\s*,\s*(\{(?:[^{}]|\{[^{}]*\})*\}))?"#,
        )
        .options_group(2),
        // fetch(`https://host/${id}`)
        Pattern::new(
            "fetch_template",
            ReferenceKind::FetchCall,
            r#"(?i)\bfetch\(\s*`((?:https?:)?//[^`\s]+)`"#,
        ),
        // await fetch ('...'), await window.fetch('...')
        Pattern::new(
            "fetch_awaited",
            ReferenceKind::FetchCall,
            r#"(?i)\bawait\s+(?:[\w$]+\.)?fetch\s*\(\s*['"]((?:https?:)?//[^'"\s]+)['"]"#,
        ),
        Pattern::new(
            "xhr_open",
            ReferenceKind::AjaxCall,
            r#"(?i)\.open\(\s*['"](GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)['"]\s*,\s*['"]((?:https?:)?//[^'"\s]+)['"]"#,
        )
        .method_group(1)
        .url_group(2),
        Pattern::new(
            "ajax_get_post",
            ReferenceKind::AjaxCall,
            r#"(?i)\.(get|post)\(\s*['"]((?:https?:)?//[^'"\s]+)['"]"#,
        )
        .method_group(1)
        .url_group(2),
        Pattern::new(
            "script_src",
            ReferenceKind::ScriptTag,
            r#"(?i)<script\b[^>]*?\bsrc\s*=\s*['"]((?:https?:)?//[^'"\s]+)['"]"#,
        ),
        Pattern::new(
            "image_src",
            ReferenceKind::ImageSource,
            r#"(?i)\bsrc\s*=\s*['"]((?:https?:)?//[^'"\s]+\.(?:jpe?g|png|gif|svg|webp)(?:\?[^'"\s]*)?)['"]"#,
        ),
        Pattern::new(
            "chart_daily_gif",
            ReferenceKind::ImageSource,
            r#"(?i)(http://image\.sinajs\.cn/newchart/daily/[^'"\s]*\.gif)"#,
        )
        .bare_host(),
        Pattern::new(
            "chart_host",
            ReferenceKind::ImageSource,
            r#"(?i)(image\.sinajs\.cn[^'"\s]*)"#,
        )
        .bare_host(),
        Pattern::new(
            "backend_script_literal",
            ReferenceKind::JsUrlLiteral,
            r#"(?i)['"](https?://[^'"\s]+\.(?:php|aspx?|jsp|py|rb)(?:\?[^'"\s]*)?)['"]"#,
        )
        .skip_assets(),
        Pattern::new(
            "url_literal",
            ReferenceKind::JsUrlLiteral,
            r#"(?i)['"](https?://[a-z0-9.-]+(?::\d+)?/[^'"\s]*)['"]"#,
        )
        .skip_assets(),
    ]
});

/// Any quoted absolute or protocol-relative URL; group 1 is the URL.
pub static QUOTED_URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)['"]((?:https?:)?//[^'"\s]+)['"]"#));

/// Options-object rules used to refine a fetch call.
pub static FETCH_METHOD: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)\bmethod\s*:\s*['"](\w+)['"]"#));

pub static FETCH_HEADERS: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?i)\bheaders\s*:\s*\{([^{}]*)\}"#));

pub static HEADER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"['"]?([\w-]+)['"]?\s*:\s*['"]([^'"]*)['"]"#));

pub fn is_static_asset(url: &str) -> bool {
    let lower = url.to_lowercase();
    ASSET_DENYLIST.iter().any(|skip| lower.contains(skip))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(PATTERNS.len(), 11);
        LazyLock::force(&FETCH_METHOD);
        LazyLock::force(&FETCH_HEADERS);
        LazyLock::force(&HEADER_PAIR);
        LazyLock::force(&QUOTED_URL);
    }

    #[test]
    fn test_priority_order() {
        let kinds: Vec<ReferenceKind> = PATTERNS.iter().map(|p| p.kind).collect();
        let first_script = kinds.iter().position(|k| *k == ReferenceKind::ScriptTag);
        let last_ajax = kinds.iter().rposition(|k| *k == ReferenceKind::AjaxCall);
        assert!(last_ajax < first_script);
        assert_eq!(kinds.first(), Some(&ReferenceKind::FetchCall));
        assert_eq!(kinds.last(), Some(&ReferenceKind::JsUrlLiteral));
    }

    #[test]
    fn test_bare_host_rules() {
        let bare: Vec<&str> = PATTERNS.iter().filter(|p| p.bare_host).map(|p| p.name).collect();
        assert_eq!(bare, vec!["chart_daily_gif", "chart_host"]);
    }

    #[test]
    fn test_is_static_asset() {
        assert!(is_static_asset("https://fonts.googleapis.com/x"));
        assert!(is_static_asset("https://cdn.x.com/app.CSS"));
        assert!(is_static_asset("https://code.jquery.com/a"));
        assert!(!is_static_asset("https://api.example.com/data"));
    }
}
