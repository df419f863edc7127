/// Data structures for Tab Grab
use serde::{Deserialize, Serialize};

/// Browser tab ids are non-negative and unique among open tabs.
pub type TabId = u32;

/// Title shown for tabs the browser reports without one.
pub const UNTITLED: &str = "Untitled";

/// One browser tab as seen by the popup.
///
/// `selected` is popup-local and is never written to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TabRecord {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
    pub pinned: bool,
    pub active: bool,
    pub window_id: i32,
    pub selected: bool,
}

/// Tab shape returned by `tabs.query`; every field but `pinned` may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTab {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub window_id: Option<i32>,
}

impl TryFrom<RawTab> for TabRecord {
    /// The raw tab is handed back when it has no usable id.
    type Error = RawTab;

    fn try_from(raw: RawTab) -> Result<TabRecord, RawTab> {
        // Missing, or TAB_ID_NONE (-1) for tabs outside the tab strip
        let Some(id) = raw.id.and_then(|id| TabId::try_from(id).ok()) else {
            return Err(raw);
        };

        Ok(TabRecord {
            id,
            title: raw
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            url: raw.url.unwrap_or_default(),
            fav_icon_url: raw.fav_icon_url.filter(|f| !f.is_empty()),
            pinned: raw.pinned,
            active: raw.active,
            window_id: raw.window_id.unwrap_or(0),
            selected: false,
        })
    }
}

/// Normalize a query result into fresh, unselected records.
/// Tabs without a usable id cannot be selected and are left out.
pub fn normalize_tabs(raw: Vec<RawTab>) -> Vec<TabRecord> {
    raw.into_iter()
        .filter_map(|raw| match TabRecord::try_from(raw) {
            Ok(tab) => Some(tab),
            Err(skipped) => {
                log::debug!("Skipping tab without a usable id: {:?}", skipped.url);
                None
            }
        })
        .collect()
}

/// Text format used by the main copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFormat {
    #[default]
    Plain,
    Markdown,
    Json,
    Csv,
}

impl CopyFormat {
    pub const ALL: [CopyFormat; 4] = [
        CopyFormat::Plain,
        CopyFormat::Markdown,
        CopyFormat::Json,
        CopyFormat::Csv,
    ];

    pub fn button_label(self) -> &'static str {
        match self {
            CopyFormat::Plain => "Copy URLs",
            CopyFormat::Markdown => "Copy Markdown",
            CopyFormat::Json => "Copy JSON",
            CopyFormat::Csv => "Export CSV",
        }
    }

    pub fn menu_label(self) -> &'static str {
        match self {
            CopyFormat::Plain => "Plain text",
            CopyFormat::Markdown => "Markdown",
            CopyFormat::Json => "JSON",
            CopyFormat::Csv => "CSV file",
        }
    }

    /// Word used in "Selected ... copied" notices.
    pub fn description(self) -> &'static str {
        match self {
            CopyFormat::Plain => "URLs",
            CopyFormat::Markdown => "Markdown",
            CopyFormat::Json => "JSON",
            CopyFormat::Csv => "CSV",
        }
    }
}
