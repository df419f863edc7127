/// Popup UI for Tab Grab

use crate::browser::{self, InventoryScope};
use crate::engine::{PopupState, RANGE_TIP};
use crate::format::{
    format_csv, format_json, format_markdown, format_plain, CSV_FILE_NAME, CSV_MIME_TYPE,
};
use crate::notify::{NoticeKind, Notifier, NOTICE_DURATION};
use crate::storage::{self, ActiveFilter, ClipboardSettings, FormatTemplates};
use crate::tab_data::{CopyFormat, TabId};
use crate::ui::components::{Checkbox, EmptyState, GroupHeader, TabRow, Toast, ToggleSwitch};
use crate::view::{build_list_view, build_summary, ListView, RowView};
use patternfly_yew::prelude::{Button, ButtonVariant, Spinner};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::platform::time::sleep;
use yew::prelude::*;

type Engine = Rc<RefCell<PopupState>>;

/// Shows notices and schedules their dismissal.
#[derive(Clone)]
struct Toaster {
    notifier: Rc<RefCell<Notifier>>,
    redraw: UseForceUpdateHandle,
}

impl Toaster {
    fn show(&self, kind: NoticeKind, message: impl Into<String>) {
        let ticket = self.notifier.borrow_mut().show(kind, message);
        self.redraw.force_update();

        let toaster = self.clone();
        spawn_local(async move {
            sleep(NOTICE_DURATION).await;
            if toaster.notifier.borrow_mut().dismiss(ticket) {
                toaster.redraw.force_update();
            }
        });
    }
}

fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|window| window.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

fn apply_theme(dark: bool) {
    let root = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.document_element());
    if let Some(root) = root {
        if let Err(e) = root.class_list().toggle_with_force("dark", dark) {
            log::warn!("Failed to apply theme: {:?}", e);
        }
    }
}

/// Start an inventory load unless one is already running.
fn reload_tabs(engine: Engine, redraw: UseForceUpdateHandle) {
    let scope = {
        let mut state = engine.borrow_mut();
        if !state.begin_load() {
            log::debug!("Tab load already in progress");
            return;
        }
        InventoryScope::from_current_window_only(state.filters().current_window_only)
    };
    redraw.force_update();

    spawn_local(async move {
        let result = browser::query_tabs(scope).await;
        match result {
            Ok(tabs) => {
                log::info!("Loaded {} tabs ({:?})", tabs.len(), scope);
                engine.borrow_mut().load_inventory(tabs);
            }
            Err(e) => {
                log::error!("Failed to load tabs: {}", e);
                engine.borrow_mut().abort_load();
            }
        }
        redraw.force_update();
    });
}

/// Render the selection in `format` and hand it to the clipboard or a download.
async fn copy_selection(
    engine: Engine,
    format: CopyFormat,
    clipboard: ClipboardSettings,
    templates: FormatTemplates,
    toaster: Toaster,
) {
    let text = {
        let state = engine.borrow();
        let selected = state.selected_tabs();
        if selected.is_empty() {
            return;
        }
        match format {
            CopyFormat::Plain => Ok(format_plain(
                &selected,
                clipboard.copy_title_enabled,
                &templates.plain,
            )),
            CopyFormat::Markdown => Ok(format_markdown(&selected)),
            CopyFormat::Json => format_json(&selected).map_err(|e| e.to_string()),
            CopyFormat::Csv => Ok(format_csv(&selected)),
        }
    };

    let text = match text {
        Ok(text) => text,
        Err(e) => {
            log::error!("Failed to format selection: {}", e);
            toaster.show(NoticeKind::Failure, format!("Failed to copy {}", format.description()));
            return;
        }
    };

    if format == CopyFormat::Csv {
        match browser::download_file(&text, CSV_FILE_NAME, CSV_MIME_TYPE) {
            Ok(()) => toaster.show(NoticeKind::Success, "CSV file exported"),
            Err(e) => {
                log::error!("CSV export failed: {}", e);
                toaster.show(NoticeKind::Failure, "Failed to export CSV");
            }
        }
        return;
    }

    match browser::write_clipboard(&text).await {
        Ok(()) => toaster.show(
            NoticeKind::Success,
            format!("Selected {} copied", format.description()),
        ),
        Err(e) => {
            log::error!("Failed to copy text: {}", e);
            toaster.show(NoticeKind::Failure, format!("Failed to copy {}", format.description()));
        }
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let engine: Engine = use_mut_ref(PopupState::default);
    let notifier = use_mut_ref(Notifier::default);
    let redraw = use_force_update();
    let toaster = Toaster {
        notifier: notifier.clone(),
        redraw: redraw.clone(),
    };

    let dark_mode = use_state(system_prefers_dark);
    let copy_format = use_state(CopyFormat::default);
    let clipboard = use_state(ClipboardSettings::default);
    let templates = use_state(FormatTemplates::default);
    let filter_menu_open = use_state(|| false);
    let format_menu_open = use_state(|| false);

    // Load preferences, then the tabs they scope
    {
        let engine = engine.clone();
        let redraw = redraw.clone();
        let dark_mode = dark_mode.clone();
        let copy_format = copy_format.clone();
        let clipboard = clipboard.clone();
        let templates = templates.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                let prefs = storage::load_preferences().await;
                engine.borrow_mut().apply_filters(prefs.filters);
                if let Some(dark) = prefs.dark_mode {
                    dark_mode.set(dark);
                }
                copy_format.set(prefs.copy_format);
                clipboard.set(prefs.clipboard);
                templates.set(prefs.templates);
                reload_tabs(engine, redraw);
            });
            || ()
        });
    }

    use_effect_with(*dark_mode, |dark| {
        apply_theme(*dark);
        || ()
    });

    let on_theme_toggle = {
        let dark_mode = dark_mode.clone();
        Callback::from(move |_: MouseEvent| {
            let dark = !*dark_mode;
            dark_mode.set(dark);
            storage::save_theme(dark);
        })
    };

    let on_search_input = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                engine.borrow_mut().set_search_query(&input.value());
                redraw.force_update();
            }
        })
    };

    let on_filter = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        move |filter: ActiveFilter| {
            let engine = engine.clone();
            let redraw = redraw.clone();
            Callback::from(move |_: MouseEvent| {
                let mut state = engine.borrow_mut();
                if state.set_active_filter(filter) {
                    storage::save_filter_settings(&state.filters());
                    drop(state);
                    redraw.force_update();
                }
            })
        }
    };

    let on_toggle_hide_pinned = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            let mut state = engine.borrow_mut();
            if state.toggle_hide_pinned() {
                storage::save_filter_settings(&state.filters());
                drop(state);
                redraw.force_update();
            }
        })
    };

    let on_toggle_grouping = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            {
                let mut state = engine.borrow_mut();
                state.toggle_grouping();
                storage::save_filter_settings(&state.filters());
            }
            redraw.force_update();
        })
    };

    let on_toggle_current_window = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            {
                let mut state = engine.borrow_mut();
                if !state.toggle_current_window_only() {
                    log::debug!("Scope change ignored until settings and tabs are loaded");
                    return;
                }
                storage::save_filter_settings(&state.filters());
            }
            reload_tabs(engine.clone(), redraw.clone());
        })
    };

    // Row callbacks are created once so unchanged rows keep equal props.
    let on_toggle_tab = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        let toaster = toaster.clone();
        use_callback((), move |(id, range): (TabId, bool), _| {
            let outcome = engine.borrow_mut().toggle_tab(id, range);
            if outcome.show_tip {
                toaster.show(NoticeKind::Info, RANGE_TIP);
            }
            if outcome.changed {
                redraw.force_update();
            }
        })
    };

    let on_activate = use_callback((), |id: TabId, _| {
        spawn_local(async move {
            if let Err(e) = browser::activate_tab(id).await {
                log::error!("Failed to switch to tab {}: {}", id, e);
            }
        });
    });

    let on_row_copy_failed = {
        let toaster = toaster.clone();
        use_callback((), move |_: (), _| {
            toaster.show(NoticeKind::Failure, "Failed to copy URL");
        })
    };

    let on_group_toggle = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        use_callback((), move |domain: AttrValue, _| {
            if engine.borrow_mut().toggle_group_selection(&domain) {
                redraw.force_update();
            }
        })
    };

    let on_select_all = {
        let engine = engine.clone();
        let redraw = redraw.clone();
        Callback::from(move |_: MouseEvent| {
            engine.borrow_mut().toggle_select_all();
            redraw.force_update();
        })
    };

    let on_copy = {
        let engine = engine.clone();
        let toaster = toaster.clone();
        let copy_format = copy_format.clone();
        let clipboard = clipboard.clone();
        let templates = templates.clone();
        let format_menu_open = format_menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            format_menu_open.set(false);
            spawn_local(copy_selection(
                engine.clone(),
                *copy_format,
                *clipboard,
                (*templates).clone(),
                toaster.clone(),
            ));
        })
    };

    let on_format_menu_toggle = {
        let format_menu_open = format_menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            format_menu_open.set(!*format_menu_open);
        })
    };

    let on_format_select = {
        let copy_format = copy_format.clone();
        let format_menu_open = format_menu_open.clone();
        move |format: CopyFormat| {
            let copy_format = copy_format.clone();
            let format_menu_open = format_menu_open.clone();
            Callback::from(move |e: MouseEvent| {
                e.stop_propagation();
                if *copy_format != format {
                    copy_format.set(format);
                    storage::save_copy_format(format);
                }
                format_menu_open.set(false);
            })
        }
    };

    let on_filter_menu_toggle = {
        let filter_menu_open = filter_menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            filter_menu_open.set(!*filter_menu_open);
        })
    };

    let on_outside_click = {
        let filter_menu_open = filter_menu_open.clone();
        let format_menu_open = format_menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            if *filter_menu_open {
                filter_menu_open.set(false);
            }
            if *format_menu_open {
                format_menu_open.set(false);
            }
        })
    };

    let stop_propagation = Callback::from(|e: MouseEvent| e.stop_propagation());

    let (list, summary, filters, query, loading, scope_locked) = {
        let state = engine.borrow();
        (
            build_list_view(&state),
            build_summary(&state),
            state.filters(),
            state.query().to_string(),
            state.is_loading(),
            !state.can_change_scope(),
        )
    };
    let has_selection = summary.selected > 0;
    let notice = notifier.borrow().current().cloned();

    let render_row = |row: RowView| {
        let key = row.id.to_string();
        html! {
            <TabRow
                key={key}
                row={row}
                on_toggle={on_toggle_tab.clone()}
                on_activate={on_activate.clone()}
                on_copy_failed={on_row_copy_failed.clone()}
            />
        }
    };

    let filter_button = |filter: ActiveFilter, label: &'static str, count: usize| {
        let class = classes!(
            "filter-button",
            (filters.active_filter == filter).then_some("filter-button-active")
        );
        html! {
            <button class={class} onclick={on_filter(filter)}>
                {label}
                <span class="filter-count">{count}</span>
            </button>
        }
    };

    html! {
        <div class="popup" onclick={on_outside_click}>
            <header class="popup-header">
                <h1 class="popup-title">
                    {"Tab Grab"}
                    <span class="tab-count-badge">{summary.total}</span>
                </h1>
                <button class="theme-toggle" title="Toggle theme" onclick={on_theme_toggle}>
                    {if *dark_mode { "☀" } else { "☾" }}
                </button>
            </header>

            <div class="toolbar">
                <input
                    type="text"
                    class="search-input"
                    placeholder="Search tabs..."
                    value={query}
                    oninput={on_search_input}
                />
                <div class="filter-dropdown" onclick={stop_propagation.clone()}>
                    <button
                        class="filter-menu-toggle"
                        aria-expanded={filter_menu_open.to_string()}
                        onclick={on_filter_menu_toggle}
                    >
                        {"Filter"}
                    </button>
                    if *filter_menu_open {
                        <div class="filter-menu">
                            <div class={classes!("hide-pinned-setting", (!summary.hide_pinned_enabled).then_some("setting-inert"))}>
                                <ToggleSwitch
                                    label="Hide pinned tabs"
                                    checked={summary.hide_pinned_visible_on}
                                    disabled={!summary.hide_pinned_enabled}
                                    onclick={on_toggle_hide_pinned}
                                />
                            </div>
                            <ToggleSwitch
                                label="Group by domain"
                                checked={filters.grouping_enabled}
                                onclick={on_toggle_grouping}
                            />
                            <ToggleSwitch
                                label="Current window only"
                                checked={filters.current_window_only}
                                disabled={scope_locked}
                                onclick={on_toggle_current_window}
                            />
                        </div>
                    }
                </div>
            </div>

            <div class="filter-bar">
                {filter_button(ActiveFilter::All, "All", summary.total)}
                {filter_button(ActiveFilter::Pinned, "Pinned", summary.pinned)}
            </div>

            <div class="selection-bar">
                <Checkbox state={summary.select_all} onclick={on_select_all} label="Select all" />
                <span class="selection-count">{format!("{} selected", summary.selected)}</span>
            </div>

            <div id="tabs-container" class="tabs-container">
                if loading && summary.total == 0 {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                } else {
                    {match list {
                        ListView::Empty => html! { <EmptyState /> },
                        ListView::Flat(rows) => rows.into_iter().map(&render_row).collect::<Html>(),
                        ListView::Grouped(groups) => groups.into_iter().map(|group| html! {
                            <div key={group.domain.clone()} class="domain-group">
                                <GroupHeader
                                    domain={group.domain.clone()}
                                    state={group.state}
                                    on_toggle={on_group_toggle.clone()}
                                />
                                {group.rows.into_iter().map(&render_row).collect::<Html>()}
                            </div>
                        }).collect::<Html>(),
                    }}
                }
            </div>

            <footer class="action-bar" onclick={stop_propagation}>
                <Button
                    onclick={on_copy}
                    disabled={!has_selection}
                    variant={ButtonVariant::Primary}
                >
                    {copy_format.button_label()}
                </Button>
                <Button
                    onclick={on_format_menu_toggle}
                    disabled={!has_selection}
                    variant={ButtonVariant::Secondary}
                >
                    {"▾"}
                </Button>
                if *format_menu_open {
                    <div class="copy-format-menu">
                        {for CopyFormat::ALL.iter().map(|&format| {
                            let class = classes!(
                                "copy-format-item",
                                (format == *copy_format).then_some("copy-format-selected")
                            );
                            html! {
                                <button class={class} onclick={on_format_select(format)}>
                                    {format.menu_label()}
                                    if format == *copy_format {
                                        <span class="format-checkmark">{"✓"}</span>
                                    }
                                </button>
                            }
                        })}
                    </div>
                }
            </footer>

            if let Some(notice) = notice {
                <Toast notice={notice} />
            }
        </div>
    }
}
