//! Item classification
//!
//! Regions and item types are derived from an item's URL slug and title by
//! ordered keyword tables: the first matching row wins, so the order of the
//! built-in tables below encodes real precedence and must not be re-sorted.

mod matcher;

pub use matcher::{KeywordMatcher, KeywordTable};

use crate::config::Config;
use crate::item::ItemType;
use std::sync::LazyLock;

/// Region assigned when no keyword matches
pub const DEFAULT_REGION: &str = "Internacional";

/// Built-in region table, in priority order
const REGION_KEYWORDS: &[(&str, &str)] = &[
    ("cancun", "Caribe"),
    ("cancún", "Caribe"),
    ("punta-cana", "Caribe"),
    ("punta cana", "Caribe"),
    ("caribe", "Caribe"),
    ("miami", "Norteamérica"),
    ("nueva-york", "Norteamérica"),
    ("nueva york", "Norteamérica"),
    ("new york", "Norteamérica"),
    ("orlando", "Norteamérica"),
    ("washington", "Norteamérica"),
    ("estados-unidos", "Norteamérica"),
    ("estados unidos", "Norteamérica"),
    ("madrid", "Europa"),
    ("barcelona", "Europa"),
    ("paris", "Europa"),
    ("europa", "Europa"),
    ("buenos-aires", "Sudamérica"),
    ("buenos aires", "Sudamérica"),
    ("sao-paulo", "Sudamérica"),
    ("são paulo", "Sudamérica"),
    ("rio-de-janeiro", "Sudamérica"),
    ("santiago", "Sudamérica"),
    ("lima", "Sudamérica"),
    ("bogota", "Sudamérica"),
    ("bogotá", "Sudamérica"),
    ("cartagena", "Sudamérica"),
    ("asuncion", "Sudamérica"),
    ("asunción", "Sudamérica"),
    ("tailandia", "Asia"),
    ("bangkok", "Asia"),
    ("vietnam", "Asia"),
    ("laos", "Asia"),
    ("japon", "Asia"),
    ("japón", "Asia"),
    ("tokio", "Asia"),
    ("tokyo", "Asia"),
    ("dubai", "Asia"),
    ("corea", "Asia"),
    ("panama", "Centroamérica"),
    ("méxico", "Centroamérica"),
    ("mexico", "Centroamérica"),
];

const FLIGHT_WORDS: &[&str] = &["boleto", "vuelo", "ticket", "flight", "airfare"];

const HOTEL_WORDS: &[&str] = &[
    "hotel",
    "resort",
    "inn",
    "lodge",
    "palace",
    "suites",
    "apartment",
];

static ITEM_TYPE_TABLE: LazyLock<KeywordTable<ItemType>> = LazyLock::new(|| {
    let mut table = KeywordTable::new();
    table.push(
        KeywordMatcher::words(FLIGHT_WORDS).expect("valid regex"),
        ItemType::Flight,
    );
    table.push(
        KeywordMatcher::words(HOTEL_WORDS).expect("valid regex"),
        ItemType::Hotel,
    );
    table
});

/// Derived classification of one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub region: String,
    pub item_type: ItemType,
}

/// Classifies items by region and type
#[derive(Debug, Clone)]
pub struct Classifier {
    regions: KeywordTable<String>,
    item_types: KeywordTable<ItemType>,
}

impl Classifier {
    /// Creates a classifier with the given region table and the built-in type table
    pub fn new(regions: KeywordTable<String>) -> Self {
        Self {
            regions,
            item_types: ITEM_TYPE_TABLE.clone(),
        }
    }

    /// Uses the configured region table, or the built-in one when none is configured
    pub fn from_config(config: &Config) -> Self {
        if config.region.is_empty() {
            return Self::default();
        }

        let regions = KeywordTable::from_keywords(
            config
                .region
                .iter()
                .map(|entry| (entry.keyword.as_str(), entry.region.clone())),
        );
        Self::new(regions)
    }

    /// Classifies an item from its URL slug and title
    pub fn classify(&self, slug: &str, title: &str) -> Classification {
        let text = format!("{} {}", slug, title);
        Classification {
            region: self.region_of(&text),
            item_type: self.item_type_of(&text),
        }
    }

    pub fn region_of(&self, text: &str) -> String {
        self.regions
            .first_match(text)
            .cloned()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn item_type_of(&self, text: &str) -> ItemType {
        self.item_types
            .first_match(text)
            .copied()
            .unwrap_or(ItemType::Package)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        let regions = KeywordTable::from_keywords(
            REGION_KEYWORDS
                .iter()
                .map(|(keyword, region)| (*keyword, region.to_string())),
        );
        Self::new(regions)
    }
}
