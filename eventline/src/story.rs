//! Narrative text boxes overlaid beside the chart.

use serde::Serialize;

use crate::config::ChartConfig;

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct StoryBox {
    pub text: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

/// Spread the configured story texts evenly down the chart wrapper.
pub fn layout_story_boxes(chart_height: f64, config: &ChartConfig) -> Vec<StoryBox> {
    let count = config.story_texts.len();
    if count == 0 {
        return Vec::new();
    }
    let wrapper_height = chart_height + config.margin.top + config.margin.bottom;
    let spacing = wrapper_height / count as f64;
    config
        .story_texts
        .iter()
        .enumerate()
        .map(|(i, text)| StoryBox {
            text: text.clone(),
            left: config.story_left,
            top: config.margin.top + i as f64 * spacing,
            width: config.story_width,
        })
        .collect()
}

/// Opacity of a story box given how much of it is inside the viewport.
pub fn story_opacity(intersection_ratio: f64, threshold: f64) -> f64 {
    if intersection_ratio > 0.0 && intersection_ratio >= threshold {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxes_are_evenly_spaced() {
        let config = ChartConfig::default();
        let boxes = layout_story_boxes(200.0, &config);
        assert_eq!(boxes.len(), 5);
        // wrapper = 200 + 50 + 50, five boxes → 60px apart
        let tops: Vec<f64> = boxes.iter().map(|b| b.top).collect();
        assert_eq!(tops, vec![50.0, 110.0, 170.0, 230.0, 290.0]);
        assert!(boxes.iter().all(|b| b.left == 800.0 && b.width == 350.0));
    }

    #[test]
    fn no_texts_no_boxes() {
        let config = ChartConfig {
            story_texts: Vec::new(),
            ..ChartConfig::default()
        };
        assert!(layout_story_boxes(500.0, &config).is_empty());
    }

    #[test]
    fn opacity_switches_at_threshold() {
        assert_eq!(story_opacity(0.0, 0.2), 0.0);
        assert_eq!(story_opacity(0.19, 0.2), 0.0);
        assert_eq!(story_opacity(0.2, 0.2), 1.0);
        assert_eq!(story_opacity(1.0, 0.2), 1.0);
        assert_eq!(story_opacity(0.0, 0.0), 0.0);
    }
}
