// Keyword category matcher.
//
// Categories are checked in declaration order and the first one with a
// substring hit wins. "sewage" sits in both water and sanitation; water is
// declared first, so sewage reports land in water.

use serde::{Deserialize, Serialize};

/// The fixed set of issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Road,
    Water,
    Electricity,
    Sanitation,
    Nature,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Road => "road",
            Category::Water => "water",
            Category::Electricity => "electricity",
            Category::Sanitation => "sanitation",
            Category::Nature => "nature",
            Category::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category keyword table, in lookup order. All phrases are lowercase.
pub const CATEGORY_KEYWORDS: [(Category, &[&str]); 6] = [
    (
        Category::Road,
        &["pothole", "road damage", "crack", "traffic jam", "accident", "blocked road"],
    ),
    (
        Category::Water,
        &["water leakage", "flood", "water pipe", "water shortage", "sewage"],
    ),
    (
        Category::Electricity,
        &[
            "streetlight",
            "power outage",
            "electric short-circuit",
            "traffic signal",
            "electricity failure",
        ],
    ),
    (
        Category::Sanitation,
        &["garbage", "trash", "waste", "dirty street", "blocked drain", "sewage"],
    ),
    (
        Category::Nature,
        &["fallen tree", "park maintenance", "plant", "green area", "forest damage"],
    ),
    (
        Category::Other,
        &["noise", "construction", "vandalism", "graffiti", "other"],
    ),
];

/// Map free text (or an image label) to a category.
pub fn match_category(text: &str) -> Category {
    let lower = text.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| contains_any(&lower, keywords))
        .map(|(category, _)| *category)
        .unwrap_or_default()
}

/// True if any phrase is a substring of `haystack`. Expects `haystack`
/// already lowercased.
pub(crate) fn contains_any(haystack: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| haystack.contains(phrase))
}
