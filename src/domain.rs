/// Hostname handling for grouping and row display
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Group for tabs whose URL has no usable hostname.
pub const OTHER_GROUP: &str = "Other";

/// Placeholder letter when no hostname can be derived.
pub const DEFAULT_INITIAL: char = 'T';

static SCHEME_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://(www\.)?").expect("valid scheme regex"));

/// Hostname of a URL, lowercased, or `None` if it does not parse or has no host.
pub fn hostname(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .map(|host| host.to_lowercase())
}

/// Domain group key for a tab URL.
///
/// Algorithm:
/// 1. Parse the URL and take its hostname
/// 2. Lowercase it and strip one leading "www."
/// 3. Anything unparseable, or without a hostname, lands in "Other"
///
/// Examples:
/// - https://www.google.com/search → google.com
/// - https://mail.google.com → mail.google.com
/// - about:blank → Other
pub fn group_domain(url: &str) -> String {
    match hostname(url) {
        Some(host) => match host.strip_prefix("www.") {
            Some(rest) if !rest.is_empty() => rest.to_string(),
            _ => host,
        },
        None => {
            log::warn!("Could not parse URL for grouping: {}", url);
            OTHER_GROUP.to_string()
        }
    }
}

/// Letter shown in place of a missing favicon.
pub fn favicon_initial(url: &str) -> char {
    hostname(url)
        .and_then(|host| host.chars().next())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or_else(|| {
            log::debug!("Could not parse URL for favicon placeholder: {}", url);
            DEFAULT_INITIAL
        })
}

/// URL as shown under the title: scheme, "www." and one trailing slash removed.
/// Display only; copies and exports always use the original URL.
pub fn display_url(url: &str) -> String {
    let stripped = SCHEME_PREFIX.replace(url, "");
    stripped
        .strip_suffix('/')
        .unwrap_or(stripped.as_ref())
        .to_string()
}
