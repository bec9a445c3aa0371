use serde::{Deserialize, Serialize};

use crate::EventlineError;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 50.0,
            bottom: 50.0,
            left: 100.0,
        }
    }
}

/// Fixed chart geometry and interaction constants.
///
/// Every field has a default, so a JSON override only needs the fields it
/// changes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartConfig {
    pub width: f64,
    pub margin: Margin,
    pub row_height: f64,
    /// Number of intervals on the top/bottom time axes.
    pub time_axis_intervals: u16,
    /// Gridline every n-th distinct day, starting from the first.
    pub grid_every_days: usize,
    /// Day-of-month label every n-th distinct day, starting from the first.
    pub day_label_every: usize,
    pub max_dodge: usize,
    pub dodge_width: f64,
    pub dodge_height: f64,
    /// Vertical offset from a day row to the mark baseline.
    pub mark_baseline: f64,
    pub mark_font_size: f64,
    pub inactive_opacity: f64,
    pub tooltip_offset: (f64, f64),
    pub placeholder_text: String,
    pub story_texts: Vec<String>,
    pub story_left: f64,
    pub story_width: f64,
    pub story_threshold: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 688.0,
            margin: Margin::default(),
            row_height: 40.0,
            time_axis_intervals: 12,
            grid_every_days: 7,
            day_label_every: 3,
            max_dodge: 5,
            dodge_width: 12.0,
            dodge_height: 4.0,
            mark_baseline: 5.0,
            mark_font_size: 16.0,
            inactive_opacity: 0.2,
            tooltip_offset: (10.0, 10.0),
            placeholder_text: "No events in selected categories".to_string(),
            story_texts: vec![
                "There's more to do in the evening time!".to_string(),
                "Bangalore's arts scene is vibrant and growing.".to_string(),
                "Meetups and social events keep the community connected.".to_string(),
                "Fitness and wellness events are on the rise.".to_string(),
                "Food and drink festivals spice up the weekends.".to_string(),
            ],
            story_left: 800.0,
            story_width: 350.0,
            story_threshold: 0.2,
        }
    }
}

impl ChartConfig {
    pub fn from_json(input: &str) -> Result<Self, EventlineError> {
        let config: ChartConfig =
            serde_json::from_str(input).map_err(|e| EventlineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EventlineError> {
        if !(self.width > self.margin.left + self.margin.right) {
            return Err(EventlineError::Config(
                "width must exceed left + right margins".into(),
            ));
        }
        if !(self.row_height > 0.0) {
            return Err(EventlineError::Config("row_height must be positive".into()));
        }
        if self.time_axis_intervals == 0 {
            return Err(EventlineError::Config(
                "time_axis_intervals must be at least 1".into(),
            ));
        }
        if self.grid_every_days == 0 || self.day_label_every == 0 || self.max_dodge == 0 {
            return Err(EventlineError::Config(
                "grid_every_days, day_label_every and max_dodge must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.inactive_opacity) {
            return Err(EventlineError::Config(
                "inactive_opacity must be within 0..=1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.story_threshold) {
            return Err(EventlineError::Config(
                "story_threshold must be within 0..=1".into(),
            ));
        }
        Ok(())
    }

    /// Right edge of the plotting area.
    pub fn plot_right(&self) -> f64 {
        self.width - self.margin.right
    }

    /// Total chart height for `day_count` distinct days.
    pub fn chart_height(&self, day_count: usize) -> f64 {
        day_count as f64 * self.row_height + self.margin.top + self.margin.bottom
    }
}
