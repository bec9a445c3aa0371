//! Static chart drawing with `plotters`, mirroring the browser drawing of a
//! [`ChartLayout`].

use std::panic;
use std::path::Path;

use anyhow::Result;
use eventline::layout::{ChartGeometry, Placeholder, TextAnchor, TextLabel};
use eventline::{ChartConfig, ChartLayout, Selection};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;

#[derive(Clone, Debug)]
pub struct PlotOptions {
    pub stories: bool,
}

pub enum ChartKind {
    Png,
    Svg,
}

pub fn render_chart_guard(
    layout: &ChartLayout,
    selection: &Selection,
    config: &ChartConfig,
    path: &Path,
    kind: ChartKind,
    opts: &PlotOptions,
) -> Result<(), String> {
    let render = || -> Result<(), String> {
        render_chart(layout, selection, config, path, kind, opts)
            .map_err(|e| format!("plotting error: {}", e))
    };

    panic::catch_unwind(panic::AssertUnwindSafe(render))
        .map_err(|_| "plotting backend panicked".to_string())?
}

/// Drawn height of a story box.
const STORY_BOX_HEIGHT: f64 = 40.0;

pub fn canvas_size(layout: &ChartLayout, config: &ChartConfig, opts: &PlotOptions) -> (u32, u32) {
    let (mut width, mut height) = layout.canvas_size();
    if let (ChartLayout::Chart(g), true) = (layout, opts.stories) {
        if !g.story_boxes.is_empty() {
            width = width.max(config.story_left + config.story_width + 20.0);
        }
        for story in &g.story_boxes {
            height = height.max(story.top + STORY_BOX_HEIGHT);
        }
    }
    (width.ceil() as u32, height.ceil() as u32)
}

fn render_chart(
    layout: &ChartLayout,
    selection: &Selection,
    config: &ChartConfig,
    path: &Path,
    kind: ChartKind,
    opts: &PlotOptions,
) -> Result<()> {
    let size = canvas_size(layout, config, opts);
    match kind {
        ChartKind::Svg => {
            let root = SVGBackend::new(path, size).into_drawing_area();
            draw_layout(root, layout, selection, opts)
        }
        ChartKind::Png => {
            let root = BitMapBackend::new(path, size).into_drawing_area();
            draw_layout(root, layout, selection, opts)
        }
    }
}

fn draw_layout<DB>(
    root: DrawingArea<DB, plotters::coord::Shift>,
    layout: &ChartLayout,
    selection: &Selection,
    opts: &PlotOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    match layout {
        ChartLayout::Placeholder(placeholder) => draw_placeholder(&root, placeholder)?,
        ChartLayout::Chart(geometry) => draw_geometry(&root, geometry, selection, opts)?,
    }
    root.present()?;
    Ok(())
}

fn px(v: f64) -> i32 {
    v.round() as i32
}

fn anchored(font: TextStyle<'static>, anchor: TextAnchor) -> TextStyle<'static> {
    let h = match anchor {
        TextAnchor::Start => HPos::Left,
        TextAnchor::Middle => HPos::Center,
        TextAnchor::End => HPos::Right,
    };
    font.pos(Pos::new(h, VPos::Bottom))
}

fn draw_placeholder<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    placeholder: &Placeholder,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = anchored(("sans-serif", 16).into_font().color(&BLACK), TextAnchor::Middle);
    root.draw(&Text::new(
        placeholder.text.clone(),
        (px(placeholder.x), px(placeholder.y)),
        style,
    ))?;
    Ok(())
}

fn draw_labels<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    labels: &[TextLabel],
    font: TextStyle<'static>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    for label in labels {
        root.draw(&Text::new(
            label.text.clone(),
            (px(label.x), px(label.y)),
            anchored(font.clone(), label.anchor),
        ))?;
    }
    Ok(())
}

fn draw_geometry<DB>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    g: &ChartGeometry,
    selection: &Selection,
    opts: &PlotOptions,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let (left, right) = (px(g.margin.left), px(g.width - g.margin.right));

    // Noon reference, dashed
    let noon_style = RGBColor(150, 150, 150).stroke_width(1);
    let (mut y, y_end) = (g.noon_line.y1, g.noon_line.y2);
    while y < y_end {
        let seg_end = (y + 4.0).min(y_end);
        root.draw(&PathElement::new(
            vec![(px(g.noon_line.x), px(y)), (px(g.noon_line.x), px(seg_end))],
            noon_style,
        ))?;
        y += 8.0;
    }

    // Time axes, top and bottom
    let axis_style = BLACK.stroke_width(1);
    let tick_font = ("sans-serif", 10).into_font().color(&BLACK);
    for (axis_y, dir) in [(g.top_axis_y, -1), (g.bottom_axis_y, 1)] {
        let axis_y = px(axis_y);
        root.draw(&PathElement::new(vec![(left, axis_y), (right, axis_y)], axis_style))?;
        for tick in &g.time_ticks {
            let x = px(tick.x);
            root.draw(&PathElement::new(
                vec![(x, axis_y), (x, axis_y + 6 * dir)],
                axis_style,
            ))?;
            let (label_y, v) = if dir < 0 {
                (axis_y - 9, VPos::Bottom)
            } else {
                (axis_y + 9, VPos::Top)
            };
            root.draw(&Text::new(
                tick.label.clone(),
                (x, label_y),
                tick_font.clone().pos(Pos::new(HPos::Center, v)),
            ))?;
        }
    }

    // Weekly gridlines
    let grid_style = RGBColor(220, 220, 220).stroke_width(1);
    for line in &g.grid_lines {
        root.draw(&PathElement::new(
            vec![(px(line.x1), px(line.y)), (px(line.x2), px(line.y))],
            grid_style,
        ))?;
    }

    draw_labels(root, &g.day_labels, ("sans-serif", 11).into_font().color(&BLACK))?;
    draw_labels(
        root,
        &g.month_labels,
        ("sans-serif", 12)
            .into_font()
            .style(FontStyle::Bold)
            .color(&BLACK),
    )?;

    let mark_size = g.mark_font_size.round().max(1.0) as u32;
    for mark in &g.marks {
        let opacity = selection.opacity_for(&mark.category);
        let style = ("sans-serif", mark_size)
            .into_font()
            .color(&BLACK.mix(opacity))
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        root.draw(&Text::new(mark.glyph.clone(), (px(mark.x), px(mark.y)), style))?;
    }

    if opts.stories {
        let box_style = RGBColor(200, 200, 200).stroke_width(1);
        let text_style = ("sans-serif", 13).into_font().color(&BLACK);
        for story in &g.story_boxes {
            let (x0, y0) = (px(story.left), px(story.top));
            let x1 = px(story.left + story.width);
            root.draw(&Rectangle::new(
                [(x0, y0), (x1, px(story.top + STORY_BOX_HEIGHT))],
                box_style,
            ))?;
            root.draw(&Text::new(story.text.clone(), (x0 + 15, y0 + 12), text_style.clone()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eventline::{compute_layout, parse_day, CategoryRegistry, EventRow};
    use std::fs;

    fn sample_layout() -> (ChartLayout, Selection, ChartConfig) {
        let registry = CategoryRegistry::default();
        let config = ChartConfig::default();
        let events = vec![EventRow {
            day: parse_day("2024-01-01").unwrap(),
            time: "09:00".into(),
            minutes: 540,
            category: "music".into(),
            description: "Gig".into(),
            location: "Hall".into(),
        }];
        let layout = compute_layout(&events, &registry, &config);
        (layout, Selection::all(&registry), config)
    }

    #[test]
    fn canvas_grows_for_story_boxes() {
        let (layout, _, config) = sample_layout();
        let plain = canvas_size(&layout, &config, &PlotOptions { stories: false });
        assert_eq!(plain, (688, 140));
        let wide = canvas_size(&layout, &config, &PlotOptions { stories: true });
        assert_eq!(wide.0, 1170);
        let last = layout.geometry().unwrap().story_boxes.last().unwrap().clone();
        assert!(f64::from(wide.1) >= last.top + STORY_BOX_HEIGHT);
        // one row: last box starts at 50 + 4 * 240 / 5
        assert_eq!(wide, (1170, 282));
    }

    #[test]
    fn placeholder_canvas_centres_its_text() {
        let registry = CategoryRegistry::default();
        let config = ChartConfig::default();
        let layout = compute_layout(&[], &registry, &config);
        let size = canvas_size(&layout, &config, &PlotOptions { stories: true });
        assert_eq!(size, (688, 100));
    }

    #[test]
    fn renders_svg_with_marks() {
        let (layout, selection, config) = sample_layout();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.svg");
        render_chart_guard(
            &layout,
            &selection,
            &config,
            &path,
            ChartKind::Svg,
            &PlotOptions { stories: false },
        )
        .unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("🎵"));
        assert!(svg.contains("January 2024"));
        assert!(svg.contains("12:00"));
    }

    #[test]
    fn renders_placeholder_svg() {
        let registry = CategoryRegistry::default();
        let config = ChartConfig::default();
        let layout = compute_layout(&[], &registry, &config);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        render_chart_guard(
            &layout,
            &Selection::all(&registry),
            &config,
            &path,
            ChartKind::Svg,
            &PlotOptions { stories: false },
        )
        .unwrap();
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("No events in selected categories"));
    }
}
