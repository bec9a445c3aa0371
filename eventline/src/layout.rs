//! Pure chart layout.
//!
//! [`compute_layout`] turns the loaded events into everything a drawing
//! backend needs: canvas size, both scales, axis ticks, gridlines, labels,
//! dodge-adjusted mark positions and story box placement. Nothing here
//! touches the DOM, so the browser and the CLI draw the same geometry.

use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::category::CategoryRegistry;
use crate::config::{ChartConfig, Margin};
use crate::format::{hour_label, month_year};
use crate::loader::EventRow;
use crate::scale::{LinearScale, PointScale};
use crate::story::{layout_story_boxes, StoryBox};
use crate::MINUTES_PER_DAY;

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartLayout {
    Placeholder(Placeholder),
    Chart(ChartGeometry),
}

impl ChartLayout {
    pub fn geometry(&self) -> Option<&ChartGeometry> {
        match self {
            ChartLayout::Chart(geometry) => Some(geometry),
            ChartLayout::Placeholder(_) => None,
        }
    }

    pub fn marks(&self) -> &[MarkPlacement] {
        self.geometry().map(|g| g.marks.as_slice()).unwrap_or(&[])
    }

    /// Pixel size of the drawing surface, `(width, height)`.
    pub fn canvas_size(&self) -> (f64, f64) {
        match self {
            ChartLayout::Chart(geometry) => (geometry.width, geometry.height),
            ChartLayout::Placeholder(placeholder) => (placeholder.width, placeholder.height()),
        }
    }
}

/// Centered message drawn instead of a chart when there are no events.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Placeholder {
    pub width: f64,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl Placeholder {
    /// Tall enough to keep the message vertically centered.
    pub fn height(&self) -> f64 {
        self.y * 2.0
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub x: LinearScale,
    pub y: PointScale<NaiveDate>,
    pub noon_line: VerticalRule,
    /// Shared by the top and bottom time axes.
    pub time_ticks: Vec<TimeTick>,
    pub top_axis_y: f64,
    pub bottom_axis_y: f64,
    pub grid_lines: Vec<GridLine>,
    pub day_labels: Vec<TextLabel>,
    pub month_labels: Vec<TextLabel>,
    pub marks: Vec<MarkPlacement>,
    pub mark_font_size: f64,
    pub story_boxes: Vec<StoryBox>,
}

impl ChartGeometry {
    /// Distinct calendar days, ascending; one chart row each.
    pub fn days(&self) -> &[NaiveDate] {
        self.y.domain()
    }
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct VerticalRule {
    pub x: f64,
    pub y1: f64,
    pub y2: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TimeTick {
    pub minutes: f64,
    pub x: f64,
    pub label: String,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct GridLine {
    pub day: NaiveDate,
    pub x1: f64,
    pub x2: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct TextLabel {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub anchor: TextAnchor,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct Dodge {
    /// Encounter order within the (day, minutes) group.
    pub index: usize,
    pub group_size: usize,
    pub dx: f64,
    pub dy: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct MarkPlacement {
    /// Index of the source row in the input sequence.
    pub event_index: usize,
    pub category: String,
    pub glyph: String,
    pub day: NaiveDate,
    pub minutes: u16,
    pub dodge: Dodge,
    pub x: f64,
    pub y: f64,
}

/// Dodge offsets for every event, in input order.
///
/// Events sharing a `(day, minutes)` pair are spread horizontally around
/// their common position and staggered vertically on alternate indices.
/// Only the first `max_dodge` members widen the spread; later members still
/// get their own offset.
pub fn dodge_offsets(events: &[EventRow], config: &ChartConfig) -> Vec<Dodge> {
    let mut group_sizes: HashMap<(NaiveDate, u16), usize> = HashMap::new();
    for event in events {
        *group_sizes.entry((event.day, event.minutes)).or_default() += 1;
    }

    let mut seen: HashMap<(NaiveDate, u16), usize> = HashMap::with_capacity(group_sizes.len());
    events
        .iter()
        .map(|event| {
            let key = (event.day, event.minutes);
            let index = {
                let counter = seen.entry(key).or_default();
                let idx = *counter;
                *counter += 1;
                idx
            };
            let group_size = group_sizes[&key];
            let spread = group_size.min(config.max_dodge) as f64;
            Dodge {
                index,
                group_size,
                dx: (index as f64 - (spread - 1.0) / 2.0) * config.dodge_width,
                dy: (index % 2) as f64 * config.dodge_height,
            }
        })
        .collect()
}

/// Lay out the full chart for `events`.
pub fn compute_layout(
    events: &[EventRow],
    registry: &CategoryRegistry,
    config: &ChartConfig,
) -> ChartLayout {
    if events.is_empty() {
        return ChartLayout::Placeholder(Placeholder {
            width: config.width,
            x: config.width / 2.0,
            y: config.margin.top,
            text: config.placeholder_text.clone(),
        });
    }

    let days: Vec<NaiveDate> = events
        .iter()
        .map(|e| e.day)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let height = config.chart_height(days.len());
    let margin = config.margin;

    let x = LinearScale::new(
        (0.0, f64::from(MINUTES_PER_DAY)),
        (margin.left, config.plot_right()),
    );
    let y = PointScale::new(days, (margin.top, height - margin.bottom), 0.5);

    let noon_line = VerticalRule {
        x: x.apply(f64::from(MINUTES_PER_DAY / 2)),
        y1: margin.top,
        y2: height - margin.bottom,
    };

    let time_ticks = x
        .ticks(config.time_axis_intervals)
        .into_iter()
        .map(|minutes| TimeTick {
            minutes,
            x: x.apply(minutes),
            label: hour_label(minutes),
        })
        .collect();

    let grid_lines = y
        .domain()
        .iter()
        .enumerate()
        .filter(|(i, _)| i % config.grid_every_days == 0)
        .map(|(i, day)| GridLine {
            day: *day,
            x1: margin.left,
            x2: config.plot_right(),
            y: y.position_at(i),
        })
        .collect();

    let day_labels = y
        .domain()
        .iter()
        .enumerate()
        .filter(|(i, _)| i % config.day_label_every == 0)
        .map(|(i, day)| TextLabel {
            x: margin.left - 10.0,
            y: y.position_at(i) + 4.0,
            text: day.day().to_string(),
            anchor: TextAnchor::End,
        })
        .collect();

    let mut month_labels = Vec::new();
    let mut current: Option<(i32, u32)> = None;
    for (i, day) in y.domain().iter().enumerate() {
        let month = (day.year(), day.month());
        if current != Some(month) {
            month_labels.push(TextLabel {
                x: 10.0,
                y: y.position_at(i) + 15.0,
                text: month_year(*day),
                anchor: TextAnchor::Start,
            });
            current = Some(month);
        }
    }

    let marks = events
        .iter()
        .zip(dodge_offsets(events, config))
        .enumerate()
        .filter_map(|(event_index, (event, dodge))| {
            let row = y.position(&event.day)?;
            Some(MarkPlacement {
                event_index,
                category: event.category.clone(),
                glyph: registry.glyph_or_fallback(&event.category).to_string(),
                day: event.day,
                minutes: event.minutes,
                dodge,
                x: x.apply(f64::from(event.minutes)) + dodge.dx,
                y: row + config.mark_baseline + dodge.dy,
            })
        })
        .collect();

    let story_boxes = layout_story_boxes(height, config);

    ChartLayout::Chart(ChartGeometry {
        width: config.width,
        height,
        margin,
        x,
        y,
        noon_line,
        time_ticks,
        top_axis_y: margin.top,
        bottom_axis_y: height - margin.bottom,
        grid_lines,
        day_labels,
        month_labels,
        marks,
        mark_font_size: config.mark_font_size,
        story_boxes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(day: &str, time: &str, category: &str) -> EventRow {
        EventRow {
            day: crate::loader::parse_day(day).unwrap(),
            time: time.to_string(),
            minutes: crate::loader::parse_time_of_day(time).unwrap(),
            category: category.to_string(),
            description: format!("{category} at {time}"),
            location: "Somewhere".to_string(),
        }
    }

    fn layout(events: &[EventRow]) -> ChartGeometry {
        match compute_layout(events, &CategoryRegistry::default(), &ChartConfig::default()) {
            ChartLayout::Chart(geometry) => geometry,
            ChartLayout::Placeholder(_) => panic!("expected a chart"),
        }
    }

    #[test]
    fn empty_input_is_a_placeholder() {
        let config = ChartConfig::default();
        let layout = compute_layout(&[], &CategoryRegistry::default(), &config);
        match &layout {
            ChartLayout::Placeholder(p) => {
                assert_eq!(p.x, config.width / 2.0);
                assert_eq!(p.text, "No events in selected categories");
            }
            ChartLayout::Chart(_) => panic!("expected placeholder"),
        }
        assert!(layout.marks().is_empty());
    }

    #[test]
    fn placeholder_canvas_contains_its_message() {
        let config = ChartConfig::default();
        let layout = compute_layout(&[], &CategoryRegistry::default(), &config);
        let (width, height) = layout.canvas_size();
        assert_eq!((width, height), (688.0, 100.0));
        let ChartLayout::Placeholder(p) = &layout else {
            panic!("expected placeholder");
        };
        assert!(p.x > 0.0 && p.x < width);
        assert!(p.y > 0.0 && p.y < height);
    }

    #[test]
    fn chart_canvas_matches_geometry() {
        let geometry = layout(&[event("2024-01-01", "09:00", "music")]);
        let (width, height) = ChartLayout::Chart(geometry.clone()).canvas_size();
        assert_eq!((width, height), (geometry.width, geometry.height));
    }

    #[test]
    fn same_slot_pair_is_dodged_apart() {
        let geometry = layout(&[
            event("2024-01-01", "09:00", "music"),
            event("2024-01-01", "09:00", "food"),
        ]);
        let [a, b] = [&geometry.marks[0], &geometry.marks[1]];
        let base_x = geometry.x.apply(540.0);
        assert_eq!(a.x, base_x - 6.0);
        assert_eq!(b.x, base_x + 6.0);
        assert_eq!(a.y + 4.0, b.y);
        assert_eq!(a.glyph, "🎵");
        assert_eq!(b.glyph, "🍽️");
    }

    #[test]
    fn dodge_spread_is_capped() {
        let events: Vec<EventRow> = (0..7)
            .map(|_| event("2024-01-01", "12:00", "music"))
            .collect();
        let offsets = dodge_offsets(&events, &ChartConfig::default());
        let dx: Vec<f64> = offsets.iter().map(|d| d.dx).collect();
        assert_eq!(dx, vec![-24.0, -12.0, 0.0, 12.0, 24.0, 36.0, 48.0]);
        assert!(offsets.iter().all(|d| d.group_size == 7));
    }

    #[test]
    fn singletons_are_not_offset() {
        let offsets = dodge_offsets(
            &[
                event("2024-01-01", "12:00", "music"),
                event("2024-01-01", "12:01", "music"),
                event("2024-01-02", "12:00", "music"),
            ],
            &ChartConfig::default(),
        );
        assert!(offsets.iter().all(|d| d.dx == 0.0 && d.dy == 0.0 && d.index == 0));
    }

    #[test]
    fn rows_follow_sorted_distinct_days() {
        let geometry = layout(&[
            event("2024-01-03", "10:00", "music"),
            event("2024-01-01", "10:00", "music"),
            event("2024-01-03", "11:00", "food"),
        ]);
        assert_eq!(geometry.days().len(), 2);
        assert!(geometry.days()[0] < geometry.days()[1]);
        assert_eq!(geometry.height, 2.0 * 40.0 + 100.0);
        assert_eq!(geometry.marks[1].y, 70.0 + 5.0);
        assert_eq!(geometry.marks[0].y, 110.0 + 5.0);
    }

    #[test]
    fn axes_gridlines_and_labels() {
        let events: Vec<EventRow> = (1..=10)
            .map(|d| event(&format!("2024-01-{d:02}"), "08:00", "arts"))
            .chain(std::iter::once(event("2024-02-01", "08:00", "arts")))
            .collect();
        let geometry = layout(&events);

        let labels: Vec<&str> = geometry.time_ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels.len(), 13);
        assert_eq!(labels[0], "0:00");
        assert_eq!(labels[6], "12:00");
        assert_eq!(labels[12], "24:00");
        assert_eq!(geometry.noon_line.x, geometry.x.apply(720.0));
        assert_eq!(geometry.bottom_axis_y, geometry.height - 50.0);

        let grid_days: Vec<u32> = geometry.grid_lines.iter().map(|g| g.day.day()).collect();
        assert_eq!(grid_days, vec![1, 8]);

        let day_texts: Vec<&str> = geometry.day_labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(day_texts, vec!["1", "4", "7", "10"]);
        assert!(geometry.day_labels.iter().all(|l| l.x == 90.0 && l.anchor == TextAnchor::End));

        let months: Vec<&str> = geometry.month_labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(months, vec!["January 2024", "February 2024"]);
        assert_eq!(geometry.month_labels[1].y, geometry.y.position_at(10) + 15.0);
    }

    #[test]
    fn year_change_starts_new_month_label() {
        let geometry = layout(&[
            event("2023-12-31", "23:00", "festival"),
            event("2024-12-01", "00:00", "festival"),
            event("2024-01-01", "00:00", "festival"),
        ]);
        let months: Vec<&str> = geometry.month_labels.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(months, vec!["December 2023", "January 2024", "December 2024"]);
    }

    #[test]
    fn unknown_category_uses_fallback_glyph() {
        let geometry = layout(&[event("2024-01-01", "10:00", "karaoke")]);
        assert_eq!(geometry.marks[0].glyph, crate::FALLBACK_GLYPH);
    }
}
