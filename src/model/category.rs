use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed set of spending categories. Variant order is the classification order.
#[derive(
    Default, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Food,
    Travel,
    Shopping,
    Bills,
    Groceries,
    Health,
    Entertainment,
    /// The catch-all. It never has keywords.
    #[default]
    Other,
}

serde_plain::derive_display_from_serialize!(Category);
serde_plain::derive_fromstr_from_deserialize!(Category);

impl Category {
    /// Every category, in classification order.
    pub const ALL: [Category; 8] = [
        Category::Food,
        Category::Travel,
        Category::Shopping,
        Category::Bills,
        Category::Groceries,
        Category::Health,
        Category::Entertainment,
        Category::Other,
    ];

    /// The capitalized name shown to people, e.g. `Groceries`.
    pub fn label(&self) -> String {
        crate::render::capitalize(&self.to_string())
    }

    fn default_keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Food => &["food", "pizza", "restaurant", "snack", "cafe"],
            Category::Travel => &["uber", "ola", "bus", "train", "petrol", "fuel"],
            Category::Shopping => &["shopping", "amazon", "clothes"],
            Category::Bills => &["bill", "electricity", "rent"],
            Category::Groceries => &["grocery", "groceries", "supermarket"],
            Category::Health => &["doctor", "pharmacy", "medicine"],
            Category::Entertainment => &["movie", "game"],
            Category::Other => &[],
        }
    }
}

/// The category to keyword mapping used to classify free text.
///
/// Entries are always held in `Category::ALL` order so that the first match is well defined no
/// matter where the keywords came from.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct KeywordTable {
    entries: Vec<(Category, Vec<String>)>,
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::with_overrides(&BTreeMap::new())
    }
}

impl KeywordTable {
    /// Builds a table from the built-in keywords, replacing the keyword list of any category
    /// present in `overrides`. Keywords are lower-cased and blanks are dropped. Keywords given
    /// for `Other` are ignored.
    pub fn with_overrides(overrides: &BTreeMap<Category, Vec<String>>) -> Self {
        let entries = Category::ALL
            .iter()
            .map(|&category| {
                let keywords = match (category, overrides.get(&category)) {
                    (Category::Other, _) => Vec::new(),
                    (_, Some(custom)) => custom
                        .iter()
                        .map(|k| k.trim().to_lowercase())
                        .filter(|k| !k.is_empty())
                        .collect(),
                    (_, None) => category
                        .default_keywords()
                        .iter()
                        .map(|k| k.to_string())
                        .collect(),
                };
                (category, keywords)
            })
            .collect();
        Self { entries }
    }

    /// The `(category, keywords)` pairs in classification order.
    pub fn entries(&self) -> &[(Category, Vec<String>)] {
        &self.entries
    }

    /// Returns the first category, in classification order, that has a keyword contained in
    /// `text`. Matching is plain substring containment so "busy" matches "bus". The caller is
    /// expected to pass lower-cased text.
    pub fn classify(&self, text: &str) -> Category {
        self.entries
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_str())))
            .map(|(category, _)| *category)
            .unwrap_or(Category::Other)
    }
}
