use std::cell::RefCell;
use std::rc::Rc;

use eventline::{
    axis_bar_labels, load_events, CategoryRegistry, ChartConfig, EventRow, Selection, Toggle,
};
use leptos::*;
use tracing::{debug, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

mod chart;
mod tooltip;

use chart::{ChartHandle, WRAPPER_ID};
use tooltip::TooltipView;

const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
const APP_COMMIT: &str = env!("GIT_COMMIT_HASH");
const DATA_URL: &str = "data.csv";

async fn fetch_text(url: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let response: Response = JsFuture::from(window.fetch_with_str(url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "HTTP {} while fetching {url}",
            response.status()
        )));
    }
    let body = JsFuture::from(response.text()?).await?;
    body.as_string()
        .ok_or_else(|| JsValue::from_str("response body is not text"))
}

fn wrapper_width() -> Option<f64> {
    let document = web_sys::window()?.document()?;
    let wrapper = document.get_element_by_id(WRAPPER_ID)?;
    Some(f64::from(wrapper.client_width()))
}

#[component]
fn FilterBar(
    registry: CategoryRegistry,
    selection: ReadSignal<Selection>,
    set_selection: WriteSignal<Selection>,
) -> impl IntoView {
    let buttons = registry
        .iter()
        .cloned()
        .map(|category| {
            let key = category.key.clone();
            let active_key = key.clone();
            let on_click = move |_ev: leptos::ev::MouseEvent| {
                let mut next = selection.get_untracked();
                match next.toggle(&key) {
                    Toggle::Rejected => debug!(category = %key, "kept last active category"),
                    outcome => {
                        debug!(category = %key, ?outcome, "category toggled");
                        set_selection.set(next);
                    }
                }
            };
            view! {
                <button
                    class="filter-button"
                    class:active=move || selection.with(|s| s.is_active(&active_key))
                    data-category=category.key.clone()
                    on:click=on_click
                >
                    {format!("{} {}", category.glyph, category.key)}
                </button>
            }
        })
        .collect_view();

    view! { <div id="filter-bar">{buttons}</div> }
}

#[component]
fn AxisBar(width: ReadSignal<Option<f64>>) -> impl IntoView {
    let labels = axis_bar_labels()
        .into_iter()
        .map(|label| {
            let style = format!("flex:1;text-align:{};", label.align.as_css());
            view! { <span style=style>{label.text}</span> }
        })
        .collect_view();

    let style = move || match width.get() {
        Some(w) => format!("display:flex;width:{w}px;margin:0 auto;"),
        None => "display:flex;".to_string(),
    };

    view! { <div id="x-axis-bar" style=style>{labels}</div> }
}

#[component]
pub fn App() -> impl IntoView {
    let registry = CategoryRegistry::default();
    let config = ChartConfig::default();

    let (events, set_events) = create_signal(Option::<Rc<Vec<EventRow>>>::None);
    let (status, set_status) = create_signal(String::from("Loading events…"));
    let (selection, set_selection) = create_signal(
        Selection::all(&registry).with_inactive_opacity(config.inactive_opacity),
    );
    let (axis_width, set_axis_width) = create_signal(Option::<f64>::None);

    let handle = Rc::new(RefCell::new(ChartHandle::default()));
    let tooltip = Rc::new(RefCell::new(TooltipView::new(config.tooltip_offset)));

    spawn_local(async move {
        match fetch_text(DATA_URL).await {
            Ok(text) => match load_events(text.as_bytes()) {
                Ok(loaded) => {
                    let mut msg = format!("{} events loaded.", loaded.events.len());
                    if !loaded.skipped.is_empty() {
                        msg.push_str(&format!(
                            " Skipped {} malformed row(s).",
                            loaded.skipped.len()
                        ));
                    }
                    info!(events = loaded.events.len(), skipped = loaded.skipped.len(), "data loaded");
                    set_status.set(msg);
                    set_events.set(Some(Rc::new(loaded.events)));
                }
                Err(err) => {
                    warn!(%err, "could not parse {DATA_URL}");
                    set_status.set(format!("Could not read {DATA_URL}: {err}"));
                    set_events.set(Some(Rc::new(Vec::new())));
                }
            },
            Err(err) => {
                warn!(?err, "could not fetch {DATA_URL}");
                set_status.set(format!("Could not fetch {DATA_URL}."));
                set_events.set(Some(Rc::new(Vec::new())));
            }
        }
    });

    // Full redraw whenever the event set changes
    create_effect({
        let registry = registry.clone();
        let config = config.clone();
        let handle = handle.clone();
        let tooltip = tooltip.clone();
        move |_| {
            let Some(rows) = events.get() else {
                return;
            };
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Err(err) =
                chart::draw_chart(&document, &rows, &registry, &config, &handle, &tooltip)
            {
                warn!(?err, "chart drawing failed");
                set_status.set("Chart drawing failed.".to_string());
                return;
            }
            let current = selection.get_untracked();
            if let Err(err) = handle.borrow().apply_selection(&current) {
                warn!(?err, "could not apply category opacity");
            }
            debug!(marks = handle.borrow().mark_count(), "chart ready");
            set_axis_width.set(wrapper_width());
        }
    });

    // Selection changes only touch mark opacity
    create_effect({
        let handle = handle.clone();
        move |_| {
            let current = selection.get();
            if let Err(err) = handle.borrow().apply_selection(&current) {
                warn!(?err, "could not apply category opacity");
            }
        }
    });

    let resize = window_event_listener(ev::resize, move |_| {
        set_axis_width.set(wrapper_width());
    });
    on_cleanup(move || resize.remove());

    view! {
        <main class="timeline">
            <header>
                <h1>"What's on, hour by hour"</h1>
                <p class="note">{move || status.get()}</p>
            </header>
            <div class="sticky-bars">
                <FilterBar registry=registry selection=selection set_selection=set_selection/>
                <AxisBar width=axis_width/>
            </div>
            <div id="chart-wrapper" style="position:relative;">
                <svg id="chart"></svg>
            </div>
            <footer>
                <p class="note">{"Version "}{APP_VERSION}{" ("}{APP_COMMIT}{")"}</p>
            </footer>
        </main>
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    leptos::mount_to_body(|| view! { <App/> });
}
