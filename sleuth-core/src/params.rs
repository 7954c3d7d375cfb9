// Query parameter breakdown for a probed URL

use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterNote {
    pub name: String,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlBreakdown {
    pub base_url: String,
    pub parameters: Vec<ParameterNote>,
}

pub const UNKNOWN_PARAMETER: &str = "unknown";

/// Parameter name that carries the subject (e.g. a stock code) of a request.
pub const SUBJECT_PARAMETER: &str = "stockid";

/// Known parameter names, matched case-insensitively.
pub const PARAMETER_DESCRIPTIONS: &[(&str, &str)] = &[
    ("a", "interface method name"),
    ("st", "status or start marker"),
    ("apiv", "API version"),
    ("c", "controller name"),
    ("stockid", "subject identifier"),
    ("phoneosnew", "device OS flag"),
    ("userid", "user identifier"),
    ("deviceid", "device identifier"),
    ("version", "client version"),
    ("token", "auth token"),
    ("index", "page index"),
];

pub fn describe_parameter(name: &str) -> &'static str {
    PARAMETER_DESCRIPTIONS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, description)| *description)
        .unwrap_or(UNKNOWN_PARAMETER)
}

/// Split `url` into its base and annotated query parameters, in order of
/// appearance. An unparseable URL yields itself as the base and no parameters.
pub fn break_down(url: &str) -> UrlBreakdown {
    let Ok(parsed) = Url::parse(url) else {
        return UrlBreakdown {
            base_url: url.to_string(),
            parameters: Vec::new(),
        };
    };

    let parameters: Vec<ParameterNote> = parsed
        .query_pairs()
        .map(|(name, value)| ParameterNote {
            description: describe_parameter(&name).to_string(),
            name: name.into_owned(),
            value: value.into_owned(),
        })
        .collect();

    for note in &parameters {
        info!("{}: {} - {}", note.name, note.value, note.description);
    }

    let mut base = parsed;
    base.set_query(None);
    base.set_fragment(None);

    UrlBreakdown {
        base_url: base.to_string(),
        parameters,
    }
}

impl UrlBreakdown {
    pub fn subject(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(SUBJECT_PARAMETER))
            .map(|p| p.value.as_str())
    }
}
