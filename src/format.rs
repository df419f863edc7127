/// Text formats for copying and exporting selected tabs.
///
/// All formatters keep the order they are given.

use crate::tab_data::TabRecord;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

pub const TITLE_TOKEN: &str = "{TITLE}";
pub const URL_TOKEN: &str = "{URL}";

pub const CSV_FILE_NAME: &str = "tab-grab-export.csv";
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

// Applied in order when titles are excluded from a custom template.
static TITLE_STRIPPERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\{TITLE\}\s*[-–—:]\s*",
        r"[-–—:]\s*\{TITLE\}",
        r"\{TITLE\}\s*",
        r"\s*\{TITLE\}",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("valid title regex"))
    .collect()
});

#[derive(Serialize)]
struct ExportedTab<'a> {
    title: &'a str,
    url: &'a str,
}

fn title_dash_url(tabs: &[&TabRecord]) -> String {
    tabs.iter()
        .map(|tab| format!("{} - {}", tab.title, tab.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove `{TITLE}` and an adjacent separator from a template.
pub fn strip_title(template: &str) -> String {
    let stripped = TITLE_STRIPPERS
        .iter()
        .fold(template.to_string(), |acc, re| re.replace_all(&acc, "").into_owned());
    stripped.replace(TITLE_TOKEN, "")
}

/// Substitute the placeholders for each tab, one line per tab.
pub fn apply_template(tabs: &[&TabRecord], template: &str) -> String {
    tabs.iter()
        .map(|tab| {
            template
                .replace(TITLE_TOKEN, &tab.title)
                .replace(URL_TOKEN, &tab.url)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Plain text, optionally through a user template.
///
/// An empty template means "no custom template".
pub fn format_plain(tabs: &[&TabRecord], include_title: bool, template: &str) -> String {
    if template.is_empty() {
        return if include_title {
            title_dash_url(tabs)
        } else {
            tabs.iter()
                .map(|tab| tab.url.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };
    }

    if include_title && !template.contains(TITLE_TOKEN) {
        return title_dash_url(tabs);
    }

    if include_title {
        apply_template(tabs, template)
    } else {
        apply_template(tabs, &strip_title(template))
    }
}

pub fn format_markdown(tabs: &[&TabRecord]) -> String {
    tabs.iter()
        .map(|tab| format!("[{}]({})", tab.title, tab.url))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-printed JSON array of `{title, url}` objects.
pub fn format_json(tabs: &[&TabRecord]) -> Result<String, serde_json::Error> {
    let exported: Vec<ExportedTab> = tabs
        .iter()
        .map(|tab| ExportedTab {
            title: &tab.title,
            url: &tab.url,
        })
        .collect();
    serde_json::to_string_pretty(&exported)
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// CSV with a `title,url` header; empty input yields an empty string.
pub fn format_csv(tabs: &[&TabRecord]) -> String {
    if tabs.is_empty() {
        return String::new();
    }

    let mut rows = Vec::with_capacity(tabs.len() + 1);
    rows.push("title,url".to_string());
    for tab in tabs {
        rows.push(format!("{},{}", csv_field(&tab.title), csv_field(&tab.url)));
    }
    rows.join("\n")
}
