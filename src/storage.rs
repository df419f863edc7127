/// Preference blobs persisted in chrome.storage.local
///
/// Each blob lives under its own key and is written on its own, so a change to
/// one preference never rewrites another. Loading is defensive: a missing key,
/// a wrong-shaped value or a failed read all fall back to defaults field by field.

use crate::browser;
use crate::tab_data::CopyFormat;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wasm_bindgen_futures::spawn_local;

pub const FILTER_SETTINGS_KEY: &str = "tabgrab_filter_settings";
pub const CLIPBOARD_SETTINGS_KEY: &str = "tabgrab_clipboard_settings";
pub const FORMAT_TEMPLATES_KEY: &str = "tabgrab_format_templates";
pub const FORMAT_PREFERENCE_KEY: &str = "tabgrab_format_preference";
pub const THEME_PREFERENCE_KEY: &str = "tabgrab_theme_preference";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveFilter {
    #[default]
    All,
    Pinned,
}

/// Persisted part of the popup's filter state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub active_filter: ActiveFilter,
    #[serde(rename = "isGroupingEnabled")]
    pub grouping_enabled: bool,
    #[serde(rename = "isHidePinnedEnabled")]
    pub hide_pinned: bool,
    pub current_window_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardSettings {
    pub copy_title_enabled: bool,
}

/// User templates; an empty `plain` template means none is configured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormatTemplates {
    pub plain: String,
}

/// Everything the popup reads from storage at startup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Preferences {
    pub filters: FilterSettings,
    pub clipboard: ClipboardSettings,
    pub templates: FormatTemplates,
    pub copy_format: CopyFormat,
    /// `None` until the user has toggled the theme once.
    pub dark_mode: Option<bool>,
}

fn field<T: DeserializeOwned>(stored: &Value, key: &str) -> Option<T> {
    let value = stored.get(key)?.clone();
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring malformed setting {}: {}", key, e);
            None
        }
    }
}

/// Fill a blob from whatever fields of the stored value are usable.
pub trait StoredBlob: Default {
    fn merge(stored: &Value) -> Self;

    fn from_stored(stored: Option<&Value>) -> Self {
        match stored {
            Some(value) if value.is_object() => Self::merge(value),
            _ => Self::default(),
        }
    }
}

impl StoredBlob for FilterSettings {
    fn merge(stored: &Value) -> Self {
        let defaults = FilterSettings::default();
        FilterSettings {
            active_filter: field(stored, "activeFilter").unwrap_or(defaults.active_filter),
            grouping_enabled: field(stored, "isGroupingEnabled").unwrap_or(defaults.grouping_enabled),
            hide_pinned: field(stored, "isHidePinnedEnabled").unwrap_or(defaults.hide_pinned),
            current_window_only: field(stored, "currentWindowOnly")
                .unwrap_or(defaults.current_window_only),
        }
    }
}

impl StoredBlob for ClipboardSettings {
    fn merge(stored: &Value) -> Self {
        ClipboardSettings {
            copy_title_enabled: field(stored, "copyTitleEnabled").unwrap_or_default(),
        }
    }
}

impl StoredBlob for FormatTemplates {
    fn merge(stored: &Value) -> Self {
        FormatTemplates {
            plain: field(stored, "plain").unwrap_or_default(),
        }
    }
}

pub fn copy_format_from_stored(stored: Option<&Value>) -> CopyFormat {
    stored
        .and_then(|value| serde_json::from_value(value.clone()).ok())
        .unwrap_or_default()
}

pub fn theme_from_stored(stored: Option<&Value>) -> Option<bool> {
    stored.and_then(Value::as_bool)
}

async fn read(key: &'static str) -> Option<Value> {
    match browser::get_storage(key).await {
        Ok(value) => value,
        Err(e) => {
            log::error!("Error loading {}: {}", key, e);
            None
        }
    }
}

/// Read all preference blobs; never fails.
pub async fn load_preferences() -> Preferences {
    let filters = read(FILTER_SETTINGS_KEY).await;
    let clipboard = read(CLIPBOARD_SETTINGS_KEY).await;
    let templates = read(FORMAT_TEMPLATES_KEY).await;
    let copy_format = read(FORMAT_PREFERENCE_KEY).await;
    let theme = read(THEME_PREFERENCE_KEY).await;

    Preferences {
        filters: FilterSettings::from_stored(filters.as_ref()),
        clipboard: ClipboardSettings::from_stored(clipboard.as_ref()),
        templates: FormatTemplates::from_stored(templates.as_ref()),
        copy_format: copy_format_from_stored(copy_format.as_ref()),
        dark_mode: theme_from_stored(theme.as_ref()),
    }
}

/// Write one blob in the background; failures are logged only.
pub fn persist<T: Serialize>(key: &'static str, value: &T) {
    let value = match serde_json::to_value(value) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Error serializing {}: {}", key, e);
            return;
        }
    };

    spawn_local(async move {
        if let Err(e) = browser::set_storage(key, &value).await {
            log::error!("Error saving {}: {}", key, e);
        }
    });
}

pub fn save_filter_settings(settings: &FilterSettings) {
    persist(FILTER_SETTINGS_KEY, settings);
}

pub fn save_copy_format(format: CopyFormat) {
    persist(FORMAT_PREFERENCE_KEY, &format);
}

pub fn save_theme(dark: bool) {
    persist(THEME_PREFERENCE_KEY, &dark);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_settings_missing() {
        assert_eq!(FilterSettings::from_stored(None), FilterSettings::default());
        assert_eq!(
            FilterSettings::from_stored(Some(&Value::Null)),
            FilterSettings::default()
        );
    }

    #[test]
    fn test_filter_settings_partial() {
        let stored = json!({"activeFilter": "pinned", "isGroupingEnabled": true});
        let settings = FilterSettings::from_stored(Some(&stored));

        assert_eq!(settings.active_filter, ActiveFilter::Pinned);
        assert!(settings.grouping_enabled);
        assert!(!settings.hide_pinned);
        assert!(!settings.current_window_only);
    }

    #[test]
    fn test_filter_settings_malformed_field_keeps_others() {
        let stored = json!({
            "activeFilter": "everything",
            "isHidePinnedEnabled": "yes",
            "currentWindowOnly": true
        });
        let settings = FilterSettings::from_stored(Some(&stored));

        assert_eq!(settings.active_filter, ActiveFilter::All);
        assert!(!settings.hide_pinned);
        assert!(settings.current_window_only);
    }

    #[test]
    fn test_filter_settings_serialized_keys() {
        let settings = FilterSettings {
            active_filter: ActiveFilter::Pinned,
            grouping_enabled: true,
            hide_pinned: false,
            current_window_only: true,
        };

        assert_eq!(
            serde_json::to_value(settings).unwrap(),
            json!({
                "activeFilter": "pinned",
                "isGroupingEnabled": true,
                "isHidePinnedEnabled": false,
                "currentWindowOnly": true
            })
        );
    }

    #[test]
    fn test_filter_settings_survive_a_save_and_load() {
        let settings = FilterSettings {
            active_filter: ActiveFilter::All,
            grouping_enabled: false,
            hide_pinned: true,
            current_window_only: false,
        };
        let stored = serde_json::to_value(settings).unwrap();
        assert_eq!(FilterSettings::from_stored(Some(&stored)), settings);
    }

    #[test]
    fn test_clipboard_and_templates() {
        let clipboard = json!({"copyTitleEnabled": true});
        assert!(ClipboardSettings::from_stored(Some(&clipboard)).copy_title_enabled);

        let templates = json!({"plain": "{TITLE}: {URL}", "markdown": "ignored"});
        assert_eq!(FormatTemplates::from_stored(Some(&templates)).plain, "{TITLE}: {URL}");
        assert_eq!(FormatTemplates::from_stored(Some(&json!([]))).plain, "");
    }

    #[test]
    fn test_copy_format_from_stored() {
        assert_eq!(copy_format_from_stored(Some(&json!("json"))), CopyFormat::Json);
        assert_eq!(copy_format_from_stored(Some(&json!("xml"))), CopyFormat::Plain);
        assert_eq!(copy_format_from_stored(None), CopyFormat::Plain);
    }

    #[test]
    fn test_theme_from_stored() {
        assert_eq!(theme_from_stored(Some(&json!(true))), Some(true));
        assert_eq!(theme_from_stored(Some(&json!(false))), Some(false));
        assert_eq!(theme_from_stored(Some(&json!("dark"))), None);
        assert_eq!(theme_from_stored(None), None);
    }
}
