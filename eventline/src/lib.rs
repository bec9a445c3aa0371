//! Core event timeline library: category registry, CSV loading, category
//! selection and the pure chart layout (scales, axes, dodge placement,
//! story boxes) shared by the CLI renderer and the browser front end.

use thiserror::Error;

pub mod axis_bar;
pub mod category;
pub mod config;
pub mod format;
pub mod layout;
pub mod loader;
pub mod scale;
pub mod selection;
pub mod story;
pub mod tooltip;

pub use axis_bar::{axis_bar_labels, AxisBarLabel, LabelAlign};
pub use category::{Category, CategoryRegistry, FALLBACK_GLYPH};
pub use config::{ChartConfig, Margin};
pub use format::{human_date, month_year, ordinal_suffix};
pub use layout::{compute_layout, ChartGeometry, ChartLayout, MarkPlacement};
pub use loader::{load_events, parse_day, parse_time_of_day, EventRow, LoadedEvents, SkippedRow};
pub use selection::{mark_opacities, Selection, Toggle};
pub use story::{story_opacity, StoryBox};
pub use tooltip::{Tooltip, TooltipContent};

#[derive(Error, Debug)]
pub enum EventlineError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column: {0}")]
    MissingColumn(&'static str),
    #[error("invalid time of day: {0:?}")]
    InvalidTime(String),
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Minutes in a day; the fixed horizontal domain of the chart.
pub const MINUTES_PER_DAY: u16 = 24 * 60;
