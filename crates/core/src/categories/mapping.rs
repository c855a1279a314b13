//! Bidirectional mapping between site category tokens and the standard taxonomy.

use serde::Serialize;

use super::StandardCategory;

/// One registered site category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryMap {
    /// The site's own token, e.g. `main_cat[]=1`.
    pub tracker_category: String,
    pub category: StandardCategory,
    /// Human-readable label as the site shows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Static category table for one site adapter.
///
/// Built once when the adapter is constructed and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryMapping {
    entries: Vec<CategoryMap>,
}

impl CategoryMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site token against a standard category.
    pub fn add(
        &mut self,
        tracker_category: impl Into<String>,
        category: StandardCategory,
        description: impl Into<String>,
    ) -> &mut Self {
        let description = description.into();
        self.entries.push(CategoryMap {
            tracker_category: tracker_category.into(),
            category,
            description: (!description.is_empty()).then_some(description),
        });
        self
    }

    pub fn entries(&self) -> &[CategoryMap] {
        &self.entries
    }

    /// Translate requested standard category ids into site tokens.
    ///
    /// Requesting a top-level category also matches every site token mapped
    /// to one of its subcategories. Unknown ids are ignored and duplicates
    /// are removed, keeping first-seen order.
    pub fn map_standard_to_tracker(&self, categories: &[u32]) -> Vec<String> {
        let mut result: Vec<String> = Vec::new();

        for &id in categories {
            let mut wanted = vec![id];
            if let Some(category) = StandardCategory::from_id(id) {
                wanted.extend(category.subcategories().map(|c| c.id));
            }

            for entry in &self.entries {
                if wanted.contains(&entry.category.id)
                    && !result.contains(&entry.tracker_category)
                {
                    result.push(entry.tracker_category.clone());
                }
            }
        }

        result
    }

    /// Translate a site token into standard categories.
    ///
    /// Matching is case-insensitive. An unknown or missing token maps to an
    /// empty list.
    pub fn map_tracker_to_standard(&self, tracker_category: Option<&str>) -> Vec<StandardCategory> {
        let Some(token) = tracker_category else {
            return Vec::new();
        };

        let mut result: Vec<StandardCategory> = Vec::new();
        for entry in &self.entries {
            if entry.tracker_category.eq_ignore_ascii_case(token) && !result.contains(&entry.category)
            {
                result.push(entry.category);
            }
        }
        result
    }
}
