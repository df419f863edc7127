/// Selection and filter engine for the popup
///
/// `PopupState` owns the authoritative tab collection. The filtered view is a
/// list of indices into that collection, so selecting through the view always
/// mutates the one record. The view is recomputed synchronously by every
/// operation that can change it.

use crate::domain::group_domain;
use crate::storage::{ActiveFilter, FilterSettings};
use crate::tab_data::{TabId, TabRecord};
use std::collections::BTreeMap;

pub const RANGE_TIP: &str = "Tip: Use Shift+Click to select a range of tabs quickly.";

// Selections already made before the tip shows.
const TIP_THRESHOLD: usize = 3;

/// Visual state of an aggregate checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckState {
    pub fn from_counts(selected: usize, total: usize) -> CheckState {
        if total == 0 || selected == 0 {
            CheckState::Unchecked
        } else if selected == total {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }

    pub fn is_checked(self) -> bool {
        self == CheckState::Checked
    }

    pub fn is_indeterminate(self) -> bool {
        self == CheckState::Indeterminate
    }
}

/// Result of clicking a tab's checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToggleOutcome {
    pub changed: bool,
    /// More than one row may have changed.
    pub range: bool,
    pub show_tip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    pub domain: String,
    pub total: usize,
    pub selected: usize,
}

impl GroupSummary {
    pub fn state(&self) -> CheckState {
        CheckState::from_counts(self.selected, self.total)
    }
}

#[derive(Debug, Default)]
pub struct PopupState {
    tabs: Vec<TabRecord>,
    // Group key per tab, parallel to `tabs`.
    domains: Vec<String>,
    filters: FilterSettings,
    query: String,
    view: Vec<usize>,
    anchor: Option<TabId>,
    tip_shown: bool,
    loading: bool,
    // Stored filters have been applied; the scope cannot change before that.
    settings_ready: bool,
}

impl PopupState {
    /// Adopt stored filter settings once they arrive.
    ///
    /// The collection, search query and any running load are kept.
    pub fn apply_filters(&mut self, filters: FilterSettings) {
        self.filters = filters;
        self.settings_ready = true;
        self.recompute();
    }

    pub fn filters(&self) -> FilterSettings {
        self.filters
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn anchor(&self) -> Option<TabId> {
        self.anchor
    }

    pub fn tab(&self, id: TabId) -> Option<&TabRecord> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    /// Mark an inventory load as started. Returns `false` if one is already running.
    pub fn begin_load(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    /// A load failed; the previous collection stays in place.
    pub fn abort_load(&mut self) {
        self.loading = false;
    }

    /// Replace the collection with a fresh query result.
    ///
    /// Selection, the range anchor and the one-shot tip all reset.
    pub fn load_inventory(&mut self, mut tabs: Vec<TabRecord>) {
        for tab in &mut tabs {
            tab.selected = false;
        }
        self.domains = tabs.iter().map(|tab| group_domain(&tab.url)).collect();
        self.tabs = tabs;
        self.anchor = None;
        self.tip_shown = false;
        self.loading = false;
        self.recompute();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.query = query.to_string();
        self.recompute();
    }

    /// Returns `true` if the filter changed and should be persisted.
    pub fn set_active_filter(&mut self, filter: ActiveFilter) -> bool {
        if self.filters.active_filter == filter {
            return false;
        }
        self.filters.active_filter = filter;
        self.recompute();
        true
    }

    /// Only effective while the "all" filter is active.
    pub fn toggle_hide_pinned(&mut self) -> bool {
        if self.filters.active_filter != ActiveFilter::All {
            return false;
        }
        self.filters.hide_pinned = !self.filters.hide_pinned;
        self.recompute();
        true
    }

    pub fn toggle_grouping(&mut self) {
        self.filters.grouping_enabled = !self.filters.grouping_enabled;
    }

    /// Whether the inventory scope may change right now.
    pub fn can_change_scope(&self) -> bool {
        self.settings_ready && !self.loading
    }

    /// Flip the scope flag. Returns `false`, changing nothing, while settings
    /// are pending or a load is running; on `true` the caller reloads.
    pub fn toggle_current_window_only(&mut self) -> bool {
        if !self.can_change_scope() {
            return false;
        }
        self.filters.current_window_only = !self.filters.current_window_only;
        true
    }

    /// Hide-pinned as it applies right now; inert under the "pinned" filter.
    pub fn hide_pinned_effective(&self) -> bool {
        self.filters.active_filter == ActiveFilter::All && self.filters.hide_pinned
    }

    fn recompute(&mut self) {
        let query = self.query.to_lowercase();
        let active_filter = self.filters.active_filter;
        let hide_pinned = self.hide_pinned_effective();

        let view = self
            .tabs
            .iter()
            .enumerate()
            .filter(|(_, tab)| match active_filter {
                ActiveFilter::Pinned => tab.pinned,
                ActiveFilter::All => !(hide_pinned && tab.pinned),
            })
            .filter(|(_, tab)| {
                query.is_empty()
                    || tab.title.to_lowercase().contains(&query)
                    || tab.url.to_lowercase().contains(&query)
            })
            .map(|(index, _)| index)
            .collect();
        self.view = view;
    }

    fn view_position(&self, id: TabId) -> Option<usize> {
        self.view.iter().position(|&index| self.tabs[index].id == id)
    }

    fn single_toggle(&mut self, index: usize) -> ToggleOutcome {
        let selecting = !self.tabs[index].selected;
        let show_tip = selecting && !self.tip_shown && self.selected_count() >= TIP_THRESHOLD;
        if show_tip {
            self.tip_shown = true;
        }
        self.tabs[index].selected = selecting;

        ToggleOutcome {
            changed: true,
            range: false,
            show_tip,
        }
    }

    /// Checkbox click on a row, with or without the range modifier.
    ///
    /// A range click selects every tab between the anchor and the clicked tab
    /// in view order and never deselects. Without an anchor in view it acts as
    /// a plain toggle.
    pub fn toggle_tab(&mut self, id: TabId, range_modifier: bool) -> ToggleOutcome {
        let Some(position) = self.view_position(id) else {
            return ToggleOutcome::default();
        };

        let range_start = self
            .anchor
            .filter(|&anchor| range_modifier && anchor != id)
            .and_then(|anchor| self.view_position(anchor));

        if let Some(anchor_position) = range_start {
            let start = anchor_position.min(position);
            let end = anchor_position.max(position);
            for &index in &self.view[start..=end] {
                self.tabs[index].selected = true;
            }
            return ToggleOutcome {
                changed: true,
                range: true,
                show_tip: false,
            };
        }

        let outcome = self.single_toggle(self.view[position]);
        self.anchor = Some(id);
        outcome
    }

    /// Select or deselect a whole domain across the collection.
    ///
    /// A fully selected group is cleared; otherwise every tab of the domain is
    /// selected. Returns `true` if any tab changed.
    pub fn toggle_group_selection(&mut self, domain: &str) -> bool {
        let summary = self
            .group_summaries()
            .into_iter()
            .find(|group| group.domain == domain);
        let Some(summary) = summary else {
            return false;
        };
        let select = !summary.state().is_checked();

        let mut changed = false;
        for (tab, tab_domain) in self.tabs.iter_mut().zip(&self.domains) {
            if tab_domain == domain && tab.selected != select {
                tab.selected = select;
                changed = true;
            }
        }
        changed
    }

    /// Set every tab in the filtered view; tabs outside it are untouched.
    pub fn set_view_selection(&mut self, select: bool) {
        for &index in &self.view {
            self.tabs[index].selected = select;
        }
    }

    /// Select-all click: a fully checked control clears, anything else selects.
    pub fn toggle_select_all(&mut self) {
        let select = !self.select_all_state().is_checked();
        self.set_view_selection(select);
    }

    pub fn total_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn pinned_count(&self) -> usize {
        self.tabs.iter().filter(|tab| tab.pinned).count()
    }

    pub fn selected_count(&self) -> usize {
        self.tabs.iter().filter(|tab| tab.selected).count()
    }

    pub fn has_selection(&self) -> bool {
        self.tabs.iter().any(|tab| tab.selected)
    }

    pub fn view_len(&self) -> usize {
        self.view.len()
    }

    pub fn selected_in_view(&self) -> usize {
        self.filtered_tabs().filter(|tab| tab.selected).count()
    }

    pub fn select_all_state(&self) -> CheckState {
        CheckState::from_counts(self.selected_in_view(), self.view.len())
    }

    pub fn filtered_tabs(&self) -> impl Iterator<Item = &TabRecord> + '_ {
        self.view.iter().map(move |&index| &self.tabs[index])
    }

    /// Selected tabs in collection order, for copying and export.
    pub fn selected_tabs(&self) -> Vec<&TabRecord> {
        self.tabs.iter().filter(|tab| tab.selected).collect()
    }

    /// Filtered view split by domain, groups in ascending domain order.
    pub fn grouped_view(&self) -> Vec<(&str, Vec<&TabRecord>)> {
        let mut groups: BTreeMap<&str, Vec<&TabRecord>> = BTreeMap::new();
        for &index in &self.view {
            groups
                .entry(self.domains[index].as_str())
                .or_default()
                .push(&self.tabs[index]);
        }
        groups.into_iter().collect()
    }

    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        self.grouped_view()
            .into_iter()
            .map(|(domain, tabs)| GroupSummary {
                domain: domain.to_string(),
                total: tabs.len(),
                selected: tabs.iter().filter(|tab| tab.selected).count(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_tab(id: TabId, url: &str, title: &str) -> TabRecord {
        TabRecord {
            id,
            title: title.to_string(),
            url: url.to_string(),
            fav_icon_url: None,
            pinned: false,
            active: false,
            window_id: 1,
            selected: false,
        }
    }

    fn pinned(mut tab: TabRecord) -> TabRecord {
        tab.pinned = true;
        tab
    }

    fn six_tabs() -> PopupState {
        let mut state = PopupState::default();
        state.load_inventory(
            (1..=6)
                .map(|id| create_test_tab(id, &format!("https://site{}.com", id), &format!("Tab {}", id)))
                .collect(),
        );
        state
    }

    fn selected_ids(state: &PopupState) -> Vec<TabId> {
        state.selected_tabs().iter().map(|tab| tab.id).collect()
    }

    fn view_ids(state: &PopupState) -> Vec<TabId> {
        state.filtered_tabs().map(|tab| tab.id).collect()
    }

    #[test]
    fn test_load_resets_selection() {
        let mut tab = create_test_tab(1, "https://a.com", "A");
        tab.selected = true;

        let mut state = PopupState::default();
        state.load_inventory(vec![tab]);

        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.view_len(), 1);
    }

    #[test]
    fn test_load_empty_inventory() {
        let mut state = PopupState::default();
        state.load_inventory(Vec::new());

        assert_eq!(state.total_count(), 0);
        assert_eq!(state.select_all_state(), CheckState::Unchecked);
        assert!(state.grouped_view().is_empty());
        state.toggle_select_all();
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_load_guard() {
        let mut state = PopupState::default();
        assert!(state.begin_load());
        assert!(!state.begin_load());
        state.load_inventory(Vec::new());
        assert!(state.begin_load());
        state.abort_load();
        assert!(!state.is_loading());
    }

    #[test]
    fn test_applied_filters_keep_running_load() {
        let mut state = PopupState::default();
        state.set_search_query("docs");
        assert!(state.begin_load());

        state.apply_filters(FilterSettings {
            current_window_only: true,
            grouping_enabled: true,
            ..FilterSettings::default()
        });

        assert!(state.is_loading());
        assert!(!state.begin_load());
        assert_eq!(state.query(), "docs");
        assert!(state.filters().current_window_only);
        assert!(state.filters().grouping_enabled);
    }

    #[test]
    fn test_scope_locked_until_settings_and_load_finish() {
        let mut state = PopupState::default();
        assert!(!state.toggle_current_window_only());
        assert!(!state.filters().current_window_only);

        state.apply_filters(FilterSettings::default());
        assert!(state.begin_load());
        assert!(!state.toggle_current_window_only());
        assert!(!state.filters().current_window_only);

        state.load_inventory(Vec::new());
        assert!(state.toggle_current_window_only());
        assert!(state.filters().current_window_only);
    }

    #[test]
    fn test_search_matches_title_or_url() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            create_test_tab(1, "https://github.com/rust-lang", "Rust Repo"),
            create_test_tab(2, "https://docs.rs", "Docs"),
            create_test_tab(3, "https://example.com", "GitHub status"),
        ]);

        state.set_search_query("GITHUB");
        assert_eq!(view_ids(&state), vec![1, 3]);

        state.set_search_query("docs");
        assert_eq!(view_ids(&state), vec![2]);

        state.set_search_query("");
        assert_eq!(view_ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn test_pinned_filter_and_hide_pinned() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            pinned(create_test_tab(1, "https://a.com", "A")),
            create_test_tab(2, "https://b.com", "B"),
        ]);

        assert!(state.toggle_hide_pinned());
        assert_eq!(view_ids(&state), vec![2]);

        assert!(state.set_active_filter(ActiveFilter::Pinned));
        assert!(!state.hide_pinned_effective());
        assert_eq!(view_ids(&state), vec![1]);

        // Inert while "pinned" is active, but the stored value is kept.
        assert!(!state.toggle_hide_pinned());
        assert!(state.filters().hide_pinned);

        assert!(state.set_active_filter(ActiveFilter::All));
        assert_eq!(view_ids(&state), vec![2]);
        assert!(!state.set_active_filter(ActiveFilter::All));
    }

    #[test]
    fn test_grouping_does_not_change_selection() {
        let mut state = six_tabs();
        state.toggle_tab(2, false);
        state.toggle_grouping();

        assert!(state.filters().grouping_enabled);
        assert_eq!(selected_ids(&state), vec![2]);
    }

    #[test]
    fn test_single_toggle_sets_anchor() {
        let mut state = six_tabs();

        let outcome = state.toggle_tab(3, false);
        assert!(outcome.changed);
        assert!(!outcome.range);
        assert_eq!(state.anchor(), Some(3));

        state.toggle_tab(3, false);
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.anchor(), Some(3));
    }

    #[test]
    fn test_range_select() {
        let mut state = six_tabs();
        state.toggle_tab(2, false);

        let outcome = state.toggle_tab(5, true);
        assert!(outcome.range);
        assert_eq!(selected_ids(&state), vec![2, 3, 4, 5]);
        assert_eq!(state.anchor(), Some(2));
    }

    #[test]
    fn test_range_select_backwards_never_deselects() {
        let mut state = six_tabs();
        state.toggle_tab(1, false);
        state.toggle_tab(5, false);
        state.toggle_tab(3, false);

        // Anchor 3, range to 5 with 4 unselected and 5 already selected.
        state.toggle_tab(5, true);
        assert_eq!(selected_ids(&state), vec![1, 3, 4, 5]);

        state.toggle_tab(6, false);
        state.toggle_tab(4, true);
        assert_eq!(selected_ids(&state), vec![1, 3, 4, 5, 6]);
    }

    #[test]
    fn test_range_without_anchor_in_view_is_single_toggle() {
        let mut state = six_tabs();
        state.toggle_tab(1, false);
        state.set_search_query("site4");

        let outcome = state.toggle_tab(4, true);
        assert!(!outcome.range);
        assert_eq!(state.anchor(), Some(4));
        assert_eq!(selected_ids(&state), vec![1, 4]);
    }

    #[test]
    fn test_range_on_anchor_itself_toggles() {
        let mut state = six_tabs();
        state.toggle_tab(2, false);
        state.toggle_tab(2, true);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_toggle_unknown_or_hidden_tab_is_noop() {
        let mut state = six_tabs();
        assert_eq!(state.toggle_tab(42, false), ToggleOutcome::default());

        state.set_search_query("site1");
        assert!(!state.toggle_tab(2, false).changed);
        assert_eq!(state.selected_count(), 0);
        assert_eq!(state.anchor(), None);
    }

    #[test]
    fn test_tip_fires_once_on_fourth_selection() {
        let mut state = six_tabs();
        let tips: Vec<bool> = (1..=6).map(|id| state.toggle_tab(id, false).show_tip).collect();
        assert_eq!(tips, vec![false, false, false, true, false, false]);
    }

    #[test]
    fn test_tip_not_shown_on_deselect() {
        let mut state = six_tabs();
        for id in 1..=3 {
            state.toggle_tab(id, false);
        }
        assert!(!state.toggle_tab(3, false).show_tip);
        state.toggle_tab(3, false);
        assert!(state.toggle_tab(4, false).show_tip);
    }

    #[test]
    fn test_reload_resets_anchor_and_tip() {
        let mut state = six_tabs();
        for id in 1..=4 {
            state.toggle_tab(id, false);
        }
        let tabs: Vec<TabRecord> = state.filtered_tabs().cloned().collect();
        state.load_inventory(tabs);

        assert_eq!(state.anchor(), None);
        assert_eq!(state.selected_count(), 0);
        let tips: Vec<bool> = (1..=4).map(|id| state.toggle_tab(id, false).show_tip).collect();
        assert_eq!(tips, vec![false, false, false, true]);
    }

    #[test]
    fn test_select_all_states() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            create_test_tab(1, "https://a.com", "A"),
            create_test_tab(2, "https://b.com", "B"),
            create_test_tab(3, "https://c.com", "C"),
        ]);

        state.toggle_select_all();
        assert_eq!(state.select_all_state(), CheckState::Checked);

        state.toggle_tab(2, false);
        assert_eq!(state.select_all_state(), CheckState::Indeterminate);

        state.toggle_tab(1, false);
        state.toggle_tab(3, false);
        assert_eq!(state.select_all_state(), CheckState::Unchecked);
    }

    #[test]
    fn test_select_all_only_touches_view() {
        let mut state = six_tabs();
        state.toggle_tab(6, false);
        state.set_search_query("site1");

        state.toggle_select_all();
        assert_eq!(selected_ids(&state), vec![1, 6]);

        state.toggle_select_all();
        assert_eq!(selected_ids(&state), vec![6]);
    }

    #[test]
    fn test_select_all_from_indeterminate_selects() {
        let mut state = six_tabs();
        state.toggle_tab(1, false);
        state.toggle_select_all();
        assert_eq!(state.selected_count(), 6);
    }

    #[test]
    fn test_grouped_view_sorted() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            create_test_tab(1, "https://www.zed.dev", "Zed"),
            create_test_tab(2, "https://github.com/a", "A"),
            create_test_tab(3, "about:blank", "Blank"),
            create_test_tab(4, "https://github.com/b", "B"),
        ]);

        let groups: Vec<(&str, Vec<TabId>)> = state
            .grouped_view()
            .into_iter()
            .map(|(domain, tabs)| (domain, tabs.iter().map(|tab| tab.id).collect()))
            .collect();

        assert_eq!(
            groups,
            vec![("Other", vec![3]), ("github.com", vec![2, 4]), ("zed.dev", vec![1])]
        );
    }

    #[test]
    fn test_group_toggle() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            create_test_tab(1, "https://github.com/a", "A"),
            create_test_tab(2, "https://docs.rs", "Docs"),
            create_test_tab(3, "https://github.com/b", "B"),
        ]);

        state.toggle_tab(1, false);
        assert_eq!(state.group_summaries()[1].state(), CheckState::Indeterminate);

        assert!(state.toggle_group_selection("github.com"));
        assert_eq!(selected_ids(&state), vec![1, 3]);

        assert!(state.toggle_group_selection("github.com"));
        assert_eq!(state.selected_count(), 0);

        assert!(!state.toggle_group_selection("missing.org"));
    }

    #[test]
    fn test_group_toggle_reaches_outside_view() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            create_test_tab(1, "https://github.com/a", "Alpha"),
            create_test_tab(2, "https://github.com/b", "Beta"),
        ]);
        state.set_search_query("alpha");

        state.toggle_group_selection("github.com");
        assert_eq!(selected_ids(&state), vec![1, 2]);

        // Group is fully selected as seen in view; clearing covers hidden tabs too.
        state.toggle_group_selection("github.com");
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_counts() {
        let mut state = PopupState::default();
        state.load_inventory(vec![
            pinned(create_test_tab(1, "https://a.com", "A")),
            create_test_tab(2, "https://b.com", "B"),
        ]);

        assert_eq!(state.total_count(), 2);
        assert_eq!(state.pinned_count(), 1);
        assert!(!state.has_selection());
    }

    #[test]
    fn test_view_is_ordered_subset() {
        let mut state = six_tabs();
        state.set_search_query("tab");
        let all = view_ids(&state);
        state.set_search_query("site");
        assert_eq!(view_ids(&state), all);
        state.set_search_query("2");
        assert_eq!(view_ids(&state), vec![2]);
    }
}
