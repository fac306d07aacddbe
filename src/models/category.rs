// News category resolution (portal label → upstream category)
// Author: kelexine (https://github.com/kelexine)

use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories understood by the upstream headlines endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    General,
    World,
    Nation,
    Business,
    Technology,
    Entertainment,
    Sports,
    Science,
    Health,
}

/// Portal slugs and upstream names, lowercase.
static CATEGORY_LABELS: phf::Map<&'static str, Category> = phf_map! {
    "geral" => Category::General,
    "general" => Category::General,
    "internacional" => Category::World,
    "world" => Category::World,
    "politica" => Category::Nation,
    "política" => Category::Nation,
    "nation" => Category::Nation,
    "economia" => Category::Business,
    "business" => Category::Business,
    "tecnologia" => Category::Technology,
    "technology" => Category::Technology,
    "entretenimento" => Category::Entertainment,
    "entertainment" => Category::Entertainment,
    "esportes" => Category::Sports,
    "sports" => Category::Sports,
    "ciencia" => Category::Science,
    "ciência" => Category::Science,
    "science" => Category::Science,
    "saude" => Category::Health,
    "saúde" => Category::Health,
    "health" => Category::Health,
};

impl Category {
    pub const ALL: [Category; 9] = [
        Category::General,
        Category::World,
        Category::Nation,
        Category::Business,
        Category::Technology,
        Category::Entertainment,
        Category::Sports,
        Category::Science,
        Category::Health,
    ];

    /// Resolve a portal label or upstream name. Unknown labels fall back
    /// to [`Category::General`].
    pub fn from_label(label: &str) -> Self {
        let key = label.trim().to_lowercase();
        CATEGORY_LABELS
            .get(key.as_str())
            .copied()
            .unwrap_or(Category::General)
    }

    /// Name sent to the upstream API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::World => "world",
            Category::Nation => "nation",
            Category::Business => "business",
            Category::Technology => "technology",
            Category::Entertainment => "entertainment",
            Category::Sports => "sports",
            Category::Science => "science",
            Category::Health => "health",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
