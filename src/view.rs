/// View model for the tab list: what the popup should show, without touching the DOM.

use crate::domain::{display_url, favicon_initial};
use crate::engine::{CheckState, PopupState};
use crate::storage::ActiveFilter;
use crate::tab_data::{TabId, TabRecord};

#[derive(Debug, Clone, PartialEq)]
pub enum Favicon {
    Image(String),
    Initial(char),
}

/// One tab row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub id: TabId,
    pub title: String,
    /// Original URL, used for tooltips and copying.
    pub url: String,
    pub display_url: String,
    pub favicon: Favicon,
    pub pinned: bool,
    pub active: bool,
    pub selected: bool,
}

impl From<&TabRecord> for RowView {
    fn from(tab: &TabRecord) -> RowView {
        let favicon = match &tab.fav_icon_url {
            Some(src) => Favicon::Image(src.clone()),
            None => Favicon::Initial(favicon_initial(&tab.url)),
        };

        RowView {
            id: tab.id,
            title: tab.title.clone(),
            url: tab.url.clone(),
            display_url: display_url(&tab.url),
            favicon,
            pinned: tab.pinned,
            active: tab.active,
            selected: tab.selected,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupView {
    pub domain: String,
    pub state: CheckState,
    pub rows: Vec<RowView>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListView {
    Empty,
    Flat(Vec<RowView>),
    Grouped(Vec<GroupView>),
}

/// Everything outside the list that depends on engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub pinned: usize,
    pub selected: usize,
    pub select_all: CheckState,
    pub hide_pinned_enabled: bool,
    pub hide_pinned_visible_on: bool,
}

pub fn build_list_view(state: &PopupState) -> ListView {
    if state.view_len() == 0 {
        return ListView::Empty;
    }

    if !state.filters().grouping_enabled {
        return ListView::Flat(state.filtered_tabs().map(RowView::from).collect());
    }

    let groups = state
        .grouped_view()
        .into_iter()
        .map(|(domain, tabs)| {
            let selected = tabs.iter().filter(|tab| tab.selected).count();
            GroupView {
                domain: domain.to_string(),
                state: CheckState::from_counts(selected, tabs.len()),
                rows: tabs.into_iter().map(RowView::from).collect(),
            }
        })
        .collect();
    ListView::Grouped(groups)
}

pub fn build_summary(state: &PopupState) -> Summary {
    let filters = state.filters();
    Summary {
        total: state.total_count(),
        pinned: state.pinned_count(),
        selected: state.selected_count(),
        select_all: state.select_all_state(),
        hide_pinned_enabled: filters.active_filter == ActiveFilter::All,
        hide_pinned_visible_on: state.hide_pinned_effective(),
    }
}
