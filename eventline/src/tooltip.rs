//! Hover tooltip content and state.

use serde::Serialize;

use crate::format::human_date;
use crate::loader::EventRow;

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct TooltipContent {
    pub description: String,
    pub date: String,
    pub location: String,
}

impl TooltipContent {
    pub fn for_event(event: &EventRow) -> Self {
        Self {
            description: event.description.clone(),
            date: human_date(event.day),
            location: event.location.clone(),
        }
    }

    /// Panel markup with every field HTML-escaped.
    pub fn to_html(&self) -> String {
        format!(
            "<b>Event:</b> {}<br/><b>Date:</b> {}<br/><b>Location:</b> {}",
            escape_html(&self.description),
            escape_html(&self.date),
            escape_html(&self.location),
        )
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The single floating tooltip. Hiding keeps the last content so the panel
/// can be reused on the next hover.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tooltip {
    content: Option<TooltipContent>,
    position: (f64, f64),
    visible: bool,
    offset: (f64, f64),
}

impl Tooltip {
    pub fn new(offset: (f64, f64)) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn show(&mut self, content: TooltipContent, pointer: (f64, f64)) {
        self.content = Some(content);
        self.position = (pointer.0 + self.offset.0, pointer.1 + self.offset.1);
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn opacity(&self) -> f64 {
        if self.visible {
            1.0
        } else {
            0.0
        }
    }

    /// Top-left corner of the panel in page coordinates.
    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::parse_day;

    fn event() -> EventRow {
        EventRow {
            day: parse_day("2024-03-12").unwrap(),
            time: "19:00".into(),
            minutes: 1140,
            category: "comedy".into(),
            description: "Stand-up <night>".into(),
            location: "Tom & Jerry's".into(),
        }
    }

    #[test]
    fn content_formats_date_and_escapes_html() {
        let content = TooltipContent::for_event(&event());
        assert_eq!(content.date, "12th March");
        assert_eq!(
            content.to_html(),
            "<b>Event:</b> Stand-up &lt;night&gt;<br/><b>Date:</b> 12th March<br/>\
             <b>Location:</b> Tom &amp; Jerry&#39;s"
        );
    }

    #[test]
    fn show_offsets_from_pointer_and_hide_keeps_content() {
        let mut tooltip = Tooltip::new((10.0, 10.0));
        assert!(!tooltip.is_visible());
        tooltip.show(TooltipContent::for_event(&event()), (200.0, 340.0));
        assert_eq!(tooltip.position(), (210.0, 350.0));
        assert_eq!(tooltip.opacity(), 1.0);
        tooltip.hide();
        assert_eq!(tooltip.opacity(), 0.0);
        assert!(tooltip.content().is_some());
    }
}
