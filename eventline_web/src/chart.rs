//! Imperative SVG drawing of a computed [`ChartLayout`].
//!
//! Every draw starts by clearing the `#chart` SVG and the story boxes in
//! `#chart-wrapper`, so repeated draws never accumulate elements.

use std::cell::RefCell;
use std::rc::Rc;

use eventline::layout::{ChartGeometry, TextAnchor, TextLabel};
use eventline::{
    compute_layout, story_opacity, CategoryRegistry, ChartConfig, ChartLayout, EventRow,
    Selection, TooltipContent,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit, MouseEvent, SvgElement,
};

use crate::tooltip::TooltipView;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub const CHART_ID: &str = "chart";
pub const WRAPPER_ID: &str = "chart-wrapper";

struct MarkNode {
    category: String,
    element: SvgElement,
}

type StoryCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// DOM nodes and JS callbacks owned by the current drawing.
#[derive(Default)]
pub struct ChartHandle {
    marks: Vec<MarkNode>,
    listeners: Vec<Closure<dyn FnMut(MouseEvent)>>,
    stories: Option<(IntersectionObserver, StoryCallback)>,
}

impl ChartHandle {
    fn reset(&mut self) {
        if let Some((observer, _callback)) = self.stories.take() {
            observer.disconnect();
        }
        self.marks.clear();
        self.listeners.clear();
    }

    /// Re-apply selection opacity to every drawn mark without relayout.
    pub fn apply_selection(&self, selection: &Selection) -> Result<(), JsValue> {
        for mark in &self.marks {
            let opacity = selection.opacity_for(&mark.category);
            mark.element
                .style()
                .set_property("opacity", &opacity.to_string())?;
        }
        Ok(())
    }

    pub fn mark_count(&self) -> usize {
        self.marks.len()
    }
}

fn svg(document: &Document, tag: &str, attrs: &[(&str, String)]) -> Result<Element, JsValue> {
    let el = document.create_element_ns(Some(SVG_NS), tag)?;
    for (name, value) in attrs {
        el.set_attribute(name, value)?;
    }
    Ok(el)
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn clear(document: &Document, canvas: &Element) -> Result<(), JsValue> {
    canvas.set_inner_html("");
    if let Some(wrapper) = document.get_element_by_id(WRAPPER_ID) {
        let boxes = wrapper.query_selector_all(".story-box")?;
        for i in 0..boxes.length() {
            if let Some(node) = boxes.item(i) {
                if let Some(parent) = node.parent_node() {
                    parent.remove_child(&node)?;
                }
            }
        }
    }
    Ok(())
}

/// Draw the whole chart for `events`, replacing any previous drawing.
pub fn draw_chart(
    document: &Document,
    events: &[EventRow],
    registry: &CategoryRegistry,
    config: &ChartConfig,
    handle: &Rc<RefCell<ChartHandle>>,
    tooltip: &Rc<RefCell<TooltipView>>,
) -> Result<(), JsValue> {
    let canvas = document
        .get_element_by_id(CHART_ID)
        .ok_or_else(|| JsValue::from_str("missing #chart element"))?;
    clear(document, &canvas)?;
    handle.borrow_mut().reset();

    let layout = compute_layout(events, registry, config);
    size_canvas(&canvas, &layout)?;
    match layout {
        ChartLayout::Placeholder(placeholder) => {
            let text = svg(
                document,
                "text",
                &[
                    ("x", placeholder.x.to_string()),
                    ("y", placeholder.y.to_string()),
                    ("text-anchor", "middle".to_string()),
                ],
            )?;
            text.set_text_content(Some(&placeholder.text));
            canvas.append_child(&text)?;
            debug!("no events; drew placeholder");
        }
        ChartLayout::Chart(geometry) => {
            draw_frame(document, &canvas, &geometry)?;
            draw_marks(document, &canvas, &geometry, events, handle, tooltip)?;
            draw_story_boxes(document, &geometry, config, handle)?;
            debug!(
                days = geometry.days().len(),
                marks = geometry.marks.len(),
                "drew chart"
            );
        }
    }
    Ok(())
}

fn size_canvas(canvas: &Element, layout: &ChartLayout) -> Result<(), JsValue> {
    let (width, height) = layout.canvas_size();
    canvas.set_attribute("width", &width.to_string())?;
    canvas.set_attribute("height", &height.to_string())?;
    Ok(())
}

fn draw_frame(document: &Document, canvas: &Element, g: &ChartGeometry) -> Result<(), JsValue> {
    canvas.append_child(&svg(
        document,
        "rect",
        &[
            ("x", "0".into()),
            ("y", "0".into()),
            ("width", g.width.to_string()),
            ("height", g.height.to_string()),
            ("fill", "white".into()),
        ],
    )?.into())?;

    canvas.append_child(&svg(
        document,
        "line",
        &[
            ("class", "midday-line".into()),
            ("x1", g.noon_line.x.to_string()),
            ("x2", g.noon_line.x.to_string()),
            ("y1", g.noon_line.y1.to_string()),
            ("y2", g.noon_line.y2.to_string()),
            ("stroke-dasharray", "4 4".into()),
        ],
    )?.into())?;

    draw_time_axis(document, canvas, g, "x-axis top", g.top_axis_y, -1.0)?;
    draw_time_axis(document, canvas, g, "x-axis bottom", g.bottom_axis_y, 1.0)?;

    for line in &g.grid_lines {
        canvas.append_child(&svg(
            document,
            "line",
            &[
                ("class", "grid-line".into()),
                ("x1", line.x1.to_string()),
                ("x2", line.x2.to_string()),
                ("y1", line.y.to_string()),
                ("y2", line.y.to_string()),
            ],
        )?.into())?;
    }

    draw_labels(document, canvas, "y-label", &g.day_labels)?;
    draw_labels(document, canvas, "month-label", &g.month_labels)?;
    Ok(())
}

fn draw_time_axis(
    document: &Document,
    canvas: &Element,
    g: &ChartGeometry,
    class: &str,
    axis_y: f64,
    dir: f64,
) -> Result<(), JsValue> {
    let group = svg(
        document,
        "g",
        &[
            ("class", class.to_string()),
            ("transform", format!("translate(0, {axis_y})")),
        ],
    )?;
    let (left, right) = (g.x.range.0, g.x.range.1);
    group.append_child(&svg(
        document,
        "path",
        &[
            ("class", "domain".into()),
            ("d", format!("M{left},{}V0H{right}V{}", 6.0 * dir, 6.0 * dir)),
            ("fill", "none".into()),
            ("stroke", "currentColor".into()),
        ],
    )?.into())?;
    for tick in &g.time_ticks {
        let tick_group = svg(
            document,
            "g",
            &[
                ("class", "tick".into()),
                ("transform", format!("translate({}, 0)", tick.x)),
            ],
        )?;
        tick_group.append_child(&svg(
            document,
            "line",
            &[("y2", (6.0 * dir).to_string()), ("stroke", "currentColor".into())],
        )?.into())?;
        let label = svg(
            document,
            "text",
            &[
                ("y", (9.0 * dir).to_string()),
                ("dy", if dir < 0.0 { "0em" } else { "0.71em" }.into()),
                ("text-anchor", "middle".into()),
                ("fill", "currentColor".into()),
            ],
        )?;
        label.set_text_content(Some(&tick.label));
        tick_group.append_child(&label)?;
        group.append_child(&tick_group)?;
    }
    canvas.append_child(&group)?;
    Ok(())
}

fn draw_labels(
    document: &Document,
    canvas: &Element,
    class: &str,
    labels: &[TextLabel],
) -> Result<(), JsValue> {
    for label in labels {
        let text = svg(
            document,
            "text",
            &[
                ("class", class.to_string()),
                ("x", label.x.to_string()),
                ("y", label.y.to_string()),
                ("text-anchor", anchor_attr(label.anchor).into()),
            ],
        )?;
        text.set_text_content(Some(&label.text));
        canvas.append_child(&text)?;
    }
    Ok(())
}

fn draw_marks(
    document: &Document,
    canvas: &Element,
    g: &ChartGeometry,
    events: &[EventRow],
    handle: &Rc<RefCell<ChartHandle>>,
    tooltip: &Rc<RefCell<TooltipView>>,
) -> Result<(), JsValue> {
    let mut handle = handle.borrow_mut();
    for mark in &g.marks {
        let el = svg(
            document,
            "text",
            &[
                ("class", "event-dot".into()),
                ("x", mark.x.to_string()),
                ("y", mark.y.to_string()),
                ("font-size", g.mark_font_size.to_string()),
                ("text-anchor", "middle".into()),
                ("data-category", mark.category.clone()),
            ],
        )?;
        el.set_text_content(Some(&mark.glyph));

        let content = TooltipContent::for_event(&events[mark.event_index]);
        let over = {
            let tooltip = tooltip.clone();
            let document = document.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                if let Err(err) = tooltip
                    .borrow_mut()
                    .show(&document, &ev, content.clone())
                {
                    warn!(?err, "could not show tooltip");
                }
            })
        };
        let out = {
            let tooltip = tooltip.clone();
            Closure::<dyn FnMut(MouseEvent)>::new(move |_ev: MouseEvent| {
                if let Err(err) = tooltip.borrow_mut().hide() {
                    warn!(?err, "could not hide tooltip");
                }
            })
        };
        el.add_event_listener_with_callback("mouseover", over.as_ref().unchecked_ref())?;
        el.add_event_listener_with_callback("mouseout", out.as_ref().unchecked_ref())?;
        handle.listeners.push(over);
        handle.listeners.push(out);

        canvas.append_child(&el)?;
        handle.marks.push(MarkNode {
            category: mark.category.clone(),
            element: el.dyn_into()?,
        });
    }
    Ok(())
}

fn draw_story_boxes(
    document: &Document,
    g: &ChartGeometry,
    config: &ChartConfig,
    handle: &Rc<RefCell<ChartHandle>>,
) -> Result<(), JsValue> {
    let Some(wrapper) = document.get_element_by_id(WRAPPER_ID) else {
        return Ok(());
    };
    if g.story_boxes.is_empty() {
        return Ok(());
    }

    let threshold = config.story_threshold;
    let callback: StoryCallback = Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
        for entry in entries.iter() {
            let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                continue;
            };
            let opacity = story_opacity(entry.intersection_ratio(), threshold);
            if let Ok(target) = entry.target().dyn_into::<HtmlElement>() {
                if let Err(err) = target.style().set_property("opacity", &opacity.to_string()) {
                    warn!(?err, "could not update story box opacity");
                }
            }
        }
    });
    let options = IntersectionObserverInit::new();
    options.set_root_margin("0px");
    options.set_threshold(&JsValue::from_f64(threshold));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)?;

    for story in &g.story_boxes {
        let el: HtmlElement = document.create_element("div")?.dyn_into()?;
        el.set_class_name("story-box");
        let style = el.style();
        style.set_property("position", "absolute")?;
        style.set_property("left", &format!("{}px", story.left))?;
        style.set_property("top", &format!("{}px", story.top))?;
        style.set_property("width", &format!("{}px", story.width))?;
        style.set_property("opacity", "0")?;
        el.set_text_content(Some(&story.text));
        wrapper.append_child(&el)?;
        observer.observe(&el);
    }

    handle.borrow_mut().stories = Some((observer, callback));
    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use eventline::load_events;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const SAMPLE: &str = "date,time,category,description,location
2024-01-01,09:00,music,Gig,Hall
2024-01-01,09:00,food,Brunch,Cafe
2024-01-03,18:30,arts,Opening,Gallery
";

    fn host() -> Document {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(old) = document.get_element_by_id(WRAPPER_ID) {
            old.remove();
        }
        let wrapper = document.create_element("div").unwrap();
        wrapper.set_id(WRAPPER_ID);
        let canvas = document.create_element_ns(Some(SVG_NS), "svg").unwrap();
        canvas.set_id(CHART_ID);
        wrapper.append_child(&canvas).unwrap();
        document.body().unwrap().append_child(&wrapper).unwrap();
        document
    }

    fn count(document: &Document, selector: &str) -> u32 {
        document.query_selector_all(selector).unwrap().length()
    }

    #[wasm_bindgen_test]
    fn redraw_replaces_marks_and_story_boxes() {
        let document = host();
        let events = load_events(SAMPLE.as_bytes()).unwrap().events;
        let registry = CategoryRegistry::default();
        let config = ChartConfig::default();
        let handle = Rc::new(RefCell::new(ChartHandle::default()));
        let tooltip = Rc::new(RefCell::new(TooltipView::new(config.tooltip_offset)));

        for _ in 0..2 {
            draw_chart(&document, &events, &registry, &config, &handle, &tooltip).unwrap();
        }

        assert_eq!(count(&document, ".event-dot"), 3);
        assert_eq!(count(&document, ".story-box"), config.story_texts.len() as u32);
        assert_eq!(handle.borrow().mark_count(), 3);
    }

    #[wasm_bindgen_test]
    fn empty_data_sizes_canvas_for_placeholder() {
        let document = host();
        let config = ChartConfig::default();
        let handle = Rc::new(RefCell::new(ChartHandle::default()));
        let tooltip = Rc::new(RefCell::new(TooltipView::new(config.tooltip_offset)));

        draw_chart(&document, &[], &CategoryRegistry::default(), &config, &handle, &tooltip)
            .unwrap();

        let canvas = document.get_element_by_id(CHART_ID).unwrap();
        assert_eq!(canvas.get_attribute("width").as_deref(), Some("688"));
        assert_eq!(canvas.get_attribute("height").as_deref(), Some("100"));
        let text = canvas.query_selector("text").unwrap().unwrap();
        assert_eq!(text.get_attribute("x").as_deref(), Some("344"));
        assert_eq!(
            text.text_content().as_deref(),
            Some("No events in selected categories")
        );
    }

    #[wasm_bindgen_test]
    fn tooltip_element_is_created_once() {
        let document = host();
        let events = load_events(SAMPLE.as_bytes()).unwrap().events;
        let mut view = TooltipView::new((10.0, 10.0));
        let before = count(&document, ".tooltip");

        for event in &events {
            let ev = MouseEvent::new("mouseover").unwrap();
            view.show(&document, &ev, TooltipContent::for_event(event)).unwrap();
            view.hide().unwrap();
        }

        assert_eq!(count(&document, ".tooltip"), before + 1);
    }
}
