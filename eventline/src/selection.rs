//! Active category selection driving mark opacity.

use serde::Serialize;

use crate::category::CategoryRegistry;
use crate::layout::ChartLayout;

/// Outcome of [`Selection::toggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    Activated,
    Deactivated,
    /// The category was the last active one and stays active.
    Rejected,
}

/// Set of active category keys, kept in registry order. Never empty.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Selection {
    order: Vec<String>,
    active: Vec<bool>,
    inactive_opacity: f64,
}

impl Selection {
    /// Every registered category active.
    pub fn all(registry: &CategoryRegistry) -> Self {
        let order: Vec<String> = registry.keys().map(str::to_string).collect();
        let active = vec![true; order.len()];
        Self {
            order,
            active,
            inactive_opacity: 0.2,
        }
    }

    /// Only `keys` active. Unknown keys are ignored; if nothing known
    /// remains, every category is active.
    pub fn only<S: AsRef<str>>(registry: &CategoryRegistry, keys: &[S]) -> Self {
        let mut selection = Self::all(registry);
        for (idx, key) in selection.order.iter().enumerate() {
            selection.active[idx] = keys.iter().any(|k| k.as_ref() == key);
        }
        if !selection.active.iter().any(|a| *a) {
            selection.active.iter_mut().for_each(|a| *a = true);
        }
        selection
    }

    /// Opacity used for marks outside the selection, clamped to `0..=1`.
    pub fn with_inactive_opacity(mut self, opacity: f64) -> Self {
        self.inactive_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn toggle(&mut self, key: &str) -> Toggle {
        let Some(idx) = self.order.iter().position(|k| k == key) else {
            return Toggle::Rejected;
        };
        if !self.active[idx] {
            self.active[idx] = true;
            return Toggle::Activated;
        }
        if self.len() == 1 {
            return Toggle::Rejected;
        }
        self.active[idx] = false;
        Toggle::Deactivated
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.order
            .iter()
            .zip(&self.active)
            .any(|(k, active)| *active && k == key)
    }

    /// Number of active categories; at least one for a non-empty registry.
    pub fn len(&self) -> usize {
        self.active.iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn active_keys(&self) -> impl Iterator<Item = &str> {
        self.order
            .iter()
            .zip(&self.active)
            .filter(|(_, active)| **active)
            .map(|(k, _)| k.as_str())
    }

    pub fn inactive_opacity(&self) -> f64 {
        self.inactive_opacity
    }

    /// Full opacity for active categories, dimmed for everything else
    /// (including categories the registry does not know).
    pub fn opacity_for(&self, category: &str) -> f64 {
        if self.is_active(category) {
            1.0
        } else {
            self.inactive_opacity()
        }
    }
}

/// One opacity per placed mark, in mark order.
pub fn mark_opacities(layout: &ChartLayout, selection: &Selection) -> Vec<f64> {
    layout
        .marks()
        .iter()
        .map(|mark| selection.opacity_for(&mark.category))
        .collect()
}
