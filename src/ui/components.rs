/// Reusable UI components

use crate::browser;
use crate::engine::CheckState;
use crate::notify::{Notice, NoticeKind};
use crate::tab_data::TabId;
use crate::view::{Favicon, RowView};
use patternfly_yew::prelude::{Alert, AlertType};
use std::time::Duration;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlElement;
use yew::platform::time::sleep;
use yew::prelude::*;

const COPIED_ICON_DURATION: Duration = Duration::from_millis(1500);

fn is_activation_key(key: &str) -> bool {
    matches!(key, " " | "Enter")
}

/// Space and Enter click a focused checkbox, as they would a native one.
fn click_on_activation_key(e: KeyboardEvent) {
    if !is_activation_key(&e.key()) {
        return;
    }
    e.prevent_default();
    if let Some(target) = e.target_dyn_into::<HtmlElement>() {
        target.click();
    }
}

fn aria_checked(state: CheckState) -> &'static str {
    match state {
        CheckState::Unchecked => "false",
        CheckState::Checked => "true",
        CheckState::Indeterminate => "mixed",
    }
}

#[derive(Properties, PartialEq)]
pub struct CheckboxProps {
    pub state: CheckState,
    pub onclick: Callback<MouseEvent>,
    #[prop_or_default]
    pub small: bool,
    #[prop_or_default]
    pub label: AttrValue,
}

/// Tri-state checkbox drawn from props only, so it can never drift from the engine.
#[function_component(Checkbox)]
pub fn checkbox(props: &CheckboxProps) -> Html {
    let class = classes!(
        "checkbox-visual",
        props.small.then_some("checkbox-small"),
        props.state.is_checked().then_some("checked"),
        props.state.is_indeterminate().then_some("indeterminate"),
    );

    html! {
        <div
            role="checkbox"
            tabindex="0"
            aria-checked={aria_checked(props.state)}
            aria-label={props.label.clone()}
            class={class}
            onclick={props.onclick.clone()}
            onkeydown={Callback::from(click_on_activation_key)}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct SwitchProps {
    pub label: AttrValue,
    pub checked: bool,
    pub onclick: Callback<MouseEvent>,
    #[prop_or(false)]
    pub disabled: bool,
}

#[function_component(ToggleSwitch)]
pub fn toggle_switch(props: &SwitchProps) -> Html {
    let class = classes!(
        "switch",
        props.checked.then_some("switch-on"),
        props.disabled.then_some("switch-disabled"),
    );

    html! {
        <label class="switch-setting">
            <span class="switch-label">{props.label.clone()}</span>
            <button
                type="button"
                role="switch"
                aria-checked={props.checked.to_string()}
                disabled={props.disabled}
                class={class}
                onclick={props.onclick.clone()}
            >
                <span aria-hidden="true" class="switch-knob"></span>
            </button>
        </label>
    }
}

#[derive(Properties, PartialEq)]
pub struct TabRowProps {
    pub row: RowView,
    pub on_toggle: Callback<(TabId, bool)>,
    pub on_activate: Callback<TabId>,
    pub on_copy_failed: Callback<()>,
}

/// One tab. Props only change for the rows a selection touched, so a single
/// toggle re-renders just that row.
#[function_component(TabRow)]
pub fn tab_row(props: &TabRowProps) -> Html {
    let copied = use_state(|| false);
    let row = &props.row;

    let on_check = {
        let id = row.id;
        props
            .on_toggle
            .reform(move |e: MouseEvent| (id, e.shift_key()))
    };

    let on_context = {
        let id = row.id;
        let on_activate = props.on_activate.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            on_activate.emit(id);
        })
    };

    let on_copy = {
        let copied = copied.clone();
        let url = row.url.clone();
        let on_copy_failed = props.on_copy_failed.clone();
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            let copied = copied.clone();
            let url = url.clone();
            let on_copy_failed = on_copy_failed.clone();
            spawn_local(async move {
                match browser::write_clipboard(&url).await {
                    Ok(()) => {
                        copied.set(true);
                        sleep(COPIED_ICON_DURATION).await;
                        copied.set(false);
                    }
                    Err(e) => {
                        log::error!("Failed to copy URL: {}", e);
                        on_copy_failed.emit(());
                    }
                }
            });
        })
    };

    let row_class = classes!("tab-row", row.selected.then_some("tab-row-selected"));
    let check_state = if row.selected {
        CheckState::Checked
    } else {
        CheckState::Unchecked
    };

    html! {
        <div class={row_class} data-tab-id={row.id.to_string()} oncontextmenu={on_context}>
            <Checkbox state={check_state} onclick={on_check} label={row.title.clone()} />
            {match &row.favicon {
                Favicon::Image(src) => html! {
                    <img class="favicon" src={src.clone()} alt="" />
                },
                Favicon::Initial(letter) => html! {
                    <div class="favicon favicon-placeholder">{letter.to_string()}</div>
                },
            }}
            <div class="tab-text">
                <div class="tab-title" title={row.title.clone()}>{&row.title}</div>
                <div class="tab-url" title={row.url.clone()}>{&row.display_url}</div>
            </div>
            if row.active {
                <span class="tab-indicator tab-active" title="You are here">{"👁"}</span>
            }
            if row.pinned {
                <span class="tab-indicator tab-pinned" title="Pinned">{"📌"}</span>
            }
            <button
                class="tab-copy"
                title="Copy URL"
                disabled={*copied}
                onclick={on_copy}
            >
                {if *copied { "✓" } else { "⧉" }}
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct GroupHeaderProps {
    pub domain: AttrValue,
    pub state: CheckState,
    pub on_toggle: Callback<AttrValue>,
}

#[function_component(GroupHeader)]
pub fn group_header(props: &GroupHeaderProps) -> Html {
    let onclick = {
        let domain = props.domain.clone();
        props.on_toggle.reform(move |_: MouseEvent| domain.clone())
    };

    html! {
        <div class="group-header" data-domain={props.domain.clone()}>
            <Checkbox state={props.state} onclick={onclick} small={true} label={props.domain.clone()} />
            <span class="group-domain">{props.domain.clone()}</span>
        </div>
    }
}

#[function_component(EmptyState)]
pub fn empty_state() -> Html {
    html! {
        <div class="empty-state">
            <svg class="empty-state-icon" viewBox="0 0 24 24" fill="none" stroke="currentColor"
                stroke-width="1.5" stroke-linecap="round" stroke-linejoin="round">
                <path d="M10.29 3.86L1.82 18a2 2 0 0 0 1.71 3h16.94a2 2 0 0 0 1.71-3L13.71 3.86a2 2 0 0 0-3.42 0z" />
                <line x1="12" y1="9" x2="12" y2="13" />
                <line x1="12" y1="17" x2="12.01" y2="17" />
            </svg>
            {"No tabs found matching your search"}
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToastProps {
    pub notice: Notice,
}

#[function_component(Toast)]
pub fn toast(props: &ToastProps) -> Html {
    let alert_type = match props.notice.kind {
        NoticeKind::Info => AlertType::Info,
        NoticeKind::Success => AlertType::Success,
        NoticeKind::Failure => AlertType::Danger,
    };

    html! {
        <div class="notification" key={props.notice.ticket.to_string()}>
            <Alert r#type={alert_type} title={props.notice.message.clone()} inline={true}>
            </Alert>
        </div>
    }
}
