use serde::{Deserialize, Serialize};

use crate::EventlineError;

/// Glyph drawn for events whose category is not registered.
pub const FALLBACK_GLYPH: &str = "•";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub key: String,
    pub glyph: String,
}

impl Category {
    pub fn new(key: impl Into<String>, glyph: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            glyph: glyph.into(),
        }
    }
}

/// Ordered category → glyph mapping. Iteration order is the order the
/// filter buttons are rendered in.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::new(vec![
            Category::new("music", "🎵"),
            Category::new("arts", "🎨"),
            Category::new("food", "🍽️"),
            Category::new("meetup", "🤝"),
            Category::new("fitness", "🏃"),
            Category::new("comedy", "😂"),
            Category::new("workshop", "🛠️"),
            Category::new("festival", "🎉"),
        ])
    }
}

impl CategoryRegistry {
    /// Later duplicates of a key are dropped so each key maps to one glyph.
    pub fn new(categories: Vec<Category>) -> Self {
        let mut unique: Vec<Category> = Vec::with_capacity(categories.len());
        for category in categories {
            if !unique.iter().any(|c| c.key == category.key) {
                unique.push(category);
            }
        }
        Self { categories: unique }
    }

    /// Parse a JSON array of `{"key": ..., "glyph": ...}` objects.
    pub fn from_json(input: &str) -> Result<Self, EventlineError> {
        let categories: Vec<Category> =
            serde_json::from_str(input).map_err(|e| EventlineError::Config(e.to_string()))?;
        if categories.is_empty() {
            return Err(EventlineError::Config("category list is empty".into()));
        }
        Ok(Self::new(categories))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.categories.iter().any(|c| c.key == key)
    }

    pub fn glyph(&self, key: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.glyph.as_str())
    }

    /// Glyph for `key`, or [`FALLBACK_GLYPH`] when unregistered.
    pub fn glyph_or_fallback(&self, key: &str) -> &str {
        self.glyph(key).unwrap_or(FALLBACK_GLYPH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_falls_back() {
        let registry = CategoryRegistry::default();
        assert_eq!(registry.glyph_or_fallback("music"), "🎵");
        assert_eq!(registry.glyph_or_fallback("karaoke"), FALLBACK_GLYPH);
    }

    #[test]
    fn json_registry_keeps_order_and_drops_duplicates() {
        let registry = CategoryRegistry::from_json(
            r#"[{"key":"b","glyph":"B"},{"key":"a","glyph":"A"},{"key":"b","glyph":"X"}]"#,
        )
        .unwrap();
        assert_eq!(registry.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(registry.glyph("b"), Some("B"));
    }

    #[test]
    fn empty_json_registry_is_rejected() {
        assert!(matches!(
            CategoryRegistry::from_json("[]"),
            Err(EventlineError::Config(_))
        ));
    }
}
